//! Configuration loading from files.
//!
//! The site config is read from a YAML file and may be overridden through
//! `QUIRE__`-prefixed environment variables, e.g. `QUIRE__BLOG__POSTS_PER_PAGE=10`.

use std::path::{Path, PathBuf};

use super::{ConfigError, SiteConfig};

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "quire.yaml";

const ENV_PREFIX: &str = "QUIRE";

impl SiteConfig {
    /// Load the config from the command line argument, defaulting to `quire.yaml`.
    ///
    /// Relative paths inside the config are resolved against the config file's
    /// directory.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = absolute_config_path(config_file)?;
        let mut config = Self::load_from_file(&config_path)?;
        config.resolve_paths(&base_path_from_config(&config_path));
        Ok(config)
    }

    /// Load the config from a file path, without resolving relative paths.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config: SiteConfig = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.blog.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "invalid config: 'blog.posts_per_page' must be at least 1".to_string(),
            ));
        }
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.name' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Turn the optional CLI path into an absolute config file path.
pub fn absolute_config_path(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    if config_file.is_relative() {
        Ok(std::env::current_dir()
            .map_err(ConfigError::CwdFailure)?
            .join(config_file))
    } else {
        Ok(config_file.to_path_buf())
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
