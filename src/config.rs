use std::{path::PathBuf, sync::OnceLock};

use config::{Config, Environment, File};
use log::warn;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The configuration has already been initialized")]
    ConfigAlreadyInitialized,

    #[error("Unable to read the configuration: {0}")]
    UnableToReadConfig(#[from] config::ConfigError),
}

/// Configuration of the command line tool
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CobaltConfig {
    /// Print the node count below each root move during perft
    pub perft_verbose: bool,

    /// Number of random plies played by the random command
    pub random_plies: u32,

    /// Draw boards with Unicode chess glyphs
    pub unicode_board: bool,
}

static CONFIG: OnceLock<CobaltConfig> = OnceLock::new();

const ENVIRONMENT_PREFIX: &str = "COBALT";

impl Default for CobaltConfig {
    fn default() -> Self {
        Self { perft_verbose: false, random_plies: 40, unicode_board: false }
    }
}

/// Get the configuration of the tool.
///
/// When `initialize` was never called, the configuration is read from the defaults and the environment. If the
/// environment can not be read, a warning is logged and the defaults are used.
pub fn get_config() -> &'static CobaltConfig {
    CONFIG.get_or_init(|| load_or_default(None))
}

/// Reads the configuration like `load`, falling back to the defaults on error.
pub fn load_or_default(path: Option<PathBuf>) -> CobaltConfig {
    load(path).unwrap_or_else(|error| {
        warn!("Using the default configuration: {}", error);
        CobaltConfig::default()
    })
}

/// Reads the configuration from the defaults, the optional file and the `COBALT_*` environment variables, in
/// increasing order of priority.
pub fn load(path: Option<PathBuf>) -> Result<CobaltConfig, ConfigError> {
    let defaults = CobaltConfig::default();
    let mut builder = Config::builder()
        .set_default("perft_verbose", defaults.perft_verbose)?
        .set_default("random_plies", i64::from(defaults.random_plies))?
        .set_default("unicode_board", defaults.unicode_board)?;

    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    let settings = builder.add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true)).build()?;
    Ok(settings.try_deserialize()?)
}

/// Initialize the configuration of the tool
pub fn initialize(path: Option<PathBuf>) -> Result<(), ConfigError> {
    let config = load(path)?;
    CONFIG.set(config).map_err(|_| ConfigError::ConfigAlreadyInitialized)
}
