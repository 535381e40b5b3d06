//! Configuration loader for the station selector.
//!
//! Loads and validates a YAML run configuration naming the input layers, the
//! attribute fields to read, the target country and the engine settings.
//!
//! Supports environment variable substitution using ${VAR} syntax, and `~`
//! in paths.

use anyhow::{Context, Result};
use coverage_engine::CoverageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Run Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Value of `fields.country` identifying the target country, e.g. "Kenya".
    pub country: String,
    pub inputs: InputPaths,
    pub fields: FieldNames,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub engine: CoverageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    /// Country boundaries (GeoJSON polygons).
    pub countries: PathBuf,
    /// Climate-zone layer (GeoJSON polygons).
    pub climate_zones: PathBuf,
    /// Planted area: GeoJSON features or a JSON row table with `x`/`y` columns.
    pub planted_area: PathBuf,
    /// Weather stations (GeoJSON points).
    pub stations: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNames {
    /// Crop column holding the planted quantity, e.g. "maize".
    pub crop: String,
    #[serde(default = "default_country_field")]
    pub country: String,
    #[serde(default = "default_zone_field")]
    pub zone: String,
    /// Record identity column; the row or feature index when absent.
    #[serde(default)]
    pub record_id: Option<String>,
    /// Station identity column; the feature index when absent.
    #[serde(default)]
    pub station_id: Option<String>,
}

fn default_country_field() -> String {
    "admin".to_string()
}

fn default_zone_field() -> String {
    "GYGA_CZ".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub country: Option<String>,
    pub crop_field: Option<String>,
    pub percentage: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl SelectorConfig {
    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(country) = overrides.country {
            self.country = country;
        }
        if let Some(crop) = overrides.crop_field {
            self.fields.crop = crop;
        }
        if let Some(percentage) = overrides.percentage {
            self.engine.percentage = percentage;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format.to_lowercase();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.country.trim().is_empty(), "Country cannot be empty");
        anyhow::ensure!(!self.fields.crop.trim().is_empty(), "Crop field cannot be empty");
        anyhow::ensure!(!self.fields.country.trim().is_empty(), "Country field cannot be empty");
        anyhow::ensure!(!self.fields.zone.trim().is_empty(), "Zone field cannot be empty");

        self.engine.validate().context("Invalid engine configuration")?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        anyhow::ensure!(
            valid_levels.contains(&self.logging.level.as_str()),
            "Invalid log level: {}. Must be one of: {:?}",
            self.logging.level,
            valid_levels
        );

        let valid_formats = ["json", "pretty"];
        anyhow::ensure!(
            valid_formats.contains(&self.logging.format.as_str()),
            "Invalid log format: {}. Must be one of: {:?}",
            self.logging.format,
            valid_formats
        );

        Ok(())
    }

    /// Expand `~` in every path and resolve relative paths against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.inputs.countries,
            &mut self.inputs.climate_zones,
            &mut self.inputs.planted_area,
            &mut self.inputs.stations,
            &mut self.output_dir,
        ] {
            *path = resolve_path(path, base);
        }
    }
}

fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse a run configuration with environment variable substitution.
///
/// Relative paths in the file are resolved against the file's directory.
/// The result is not validated, so command-line overrides can still be
/// applied; call [`SelectorConfig::validate`] afterwards.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SelectorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read selector config from {:?}", path))?;

    let expanded = expand_env_vars(&content)?;

    let mut config: SelectorConfig = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse selector config from {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
