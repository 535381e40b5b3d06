//! Shared test utilities for the target weather station workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Geometry fixtures (rectangular countries, zone strips, station grids)
//! - Planted-area record generators
//! - A scratch directory for service input/output files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, generators};
//! ```

pub mod fixtures;
pub mod generators;
pub mod workspace;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use workspace::TestWorkspace;

/// Assert that a coverage result holds exactly the given station identities.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_stations;
///
/// assert_stations!(output.coverage, ["ws-1", "ws-4"]);
/// ```
#[macro_export]
macro_rules! assert_stations {
    ($coverage:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<String> = $coverage
            .stations
            .iter()
            .map(|s| s.station.0.clone())
            .collect();
        let mut expected: Vec<String> = vec![$($id.to_string()),*];
        expected.sort();
        assert_eq!(actual, expected, "unexpected target stations");
    }};
    ($coverage:expr, $expected:expr) => {{
        let actual: Vec<String> = $coverage
            .stations
            .iter()
            .map(|s| s.station.0.clone())
            .collect();
        let mut expected: Vec<String> = $expected.iter().map(|id| id.to_string()).collect();
        expected.sort();
        assert_eq!(actual, expected, "unexpected target stations");
    }};
}
