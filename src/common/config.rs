//! Compilation configuration
//!
//! The driver hands the pipeline a string-keyed configuration map. `Config`
//! is the typed view of that map; [`Config::to_map`] gives the map back so
//! later stages can pass it through unchanged.

use super::consts::{CONFIG_DEBUG, CONFIG_INPUT_FILE, CONFIG_OPTIMIZE, CONFIG_REGISTER_ALLOCATION};
use super::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Identifier of the input source (usually a path)
    pub input: Option<String>,
    /// Run constant folding/propagation before IR generation
    pub optimize: bool,
    /// Local slot budget for `.limit locals`; `None` keeps the fixed default
    pub register_allocation: Option<u32>,
    /// Verbose tracing
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_register_allocation(mut self, budget: Option<u32>) -> Self {
        self.register_allocation = budget;
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Build a config from the driver's key/value map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Config::default();
        for (key, value) in map {
            match key.as_str() {
                CONFIG_INPUT_FILE => config.input = Some(value.clone()),
                CONFIG_OPTIMIZE => config.optimize = parse_bool(key, value)?,
                CONFIG_DEBUG => config.debug = parse_bool(key, value)?,
                CONFIG_REGISTER_ALLOCATION => {
                    let n: i64 = value.trim().parse().map_err(|_| {
                        Error::config(format!("'{}' expects an integer, found '{}'", key, value))
                    })?;
                    // Negative values mean "no allocation requested"
                    config.register_allocation = u32::try_from(n).ok();
                }
                other => log::debug!("ignoring unrecognized config key '{}'", other),
            }
        }
        Ok(config)
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(ref input) = self.input {
            map.insert(CONFIG_INPUT_FILE.to_string(), input.clone());
        }
        map.insert(CONFIG_OPTIMIZE.to_string(), self.optimize.to_string());
        map.insert(CONFIG_DEBUG.to_string(), self.debug.to_string());
        let reg = self.register_allocation.map(i64::from).unwrap_or(-1);
        map.insert(CONFIG_REGISTER_ALLOCATION.to_string(), reg.to_string());
        map
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::config(format!("'{}' expects a boolean, found '{}'", key, value))),
    }
}
