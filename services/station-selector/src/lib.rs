//! Target weather station selection service.
//!
//! Reads country boundaries, a climate-zone layer, a crop planted-area layer
//! and a weather station layer, and writes the stations whose zone-clipped
//! catchments cover the country's main planted area.

pub mod config;
pub mod geojson;
pub mod output;
pub mod run;

pub use config::{load_config, Overrides, SelectorConfig};
pub use run::{error_code, run, OutputNames, RunSummary};
