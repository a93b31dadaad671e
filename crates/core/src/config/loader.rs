//! Configuration file loader.
//!
//! The pipeline reads a single TOML file. By default it is
//! `.pinline/config.toml` under the project root; a missing file (or a
//! missing `.pinline/` directory) means "use the defaults".

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::ConfigOverrides;
use pl_protocol::config_models::PipelineConfig;
use std::path::Path;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".pinline";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Builds the run configuration: defaults, then the TOML file, then
/// `overrides`. Validation runs once, on the merged result.
///
/// The file is `explicit` if given, otherwise `<root>/.pinline/config.toml`
/// when it exists. With no file the defaults are used.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or is not valid TOML,
/// or if the merged configuration fails validation. A validation failure is
/// reported as `InvalidConfig` with the file path when a file was loaded.
///
/// # Example
///
/// ```rust,no_run
/// use pl_core::config::loader::resolve_config;
/// use pl_core::config::models::ConfigOverrides;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = resolve_config(Path::new("."), None, ConfigOverrides::default())?;
/// println!("{} pins to inspect", config.initial_inventory);
/// # Ok(())
/// # }
/// ```
pub fn resolve_config(
    root: &Path,
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> ConfigResult<PipelineConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_DIR).join(CONFIG_FILE)).filter(|path| path.exists()),
    };

    let base = match &source {
        Some(path) => load_config_file(path)?,
        None => PipelineConfig::default(),
    };
    let config = overrides.apply(base);

    validate(&config).map_err(|e| match (e, source) {
        (ConfigError::Validation { reason }, Some(path)) => {
            ConfigError::InvalidConfig { path, reason }
        }
        (other, _) => other,
    })?;

    Ok(config)
}

/// Parses a configuration file. Values are not validated here; see
/// [`validate`].
pub fn load_config_file(path: &Path) -> ConfigResult<PipelineConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks that a configuration can be run.
///
/// Zero workers at a stage is allowed; that stage simply never drains.
pub fn validate(config: &PipelineConfig) -> ConfigResult<()> {
    if config.workers.checked_total().is_none() {
        return Err(ConfigError::Validation {
            reason: "total worker count is too large".to_string(),
        });
    }

    if !config.delay.is_valid() {
        return Err(ConfigError::Validation {
            reason: format!(
                "delay min-ms ({}) must not exceed max-ms ({})",
                config.delay.min_ms, config.delay.max_ms
            ),
        });
    }

    Ok(())
}
