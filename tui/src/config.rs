use std::io;
use std::path::Path;
use std::path::PathBuf;

use huddle_composer::DEFAULT_PLACEHOLDER;
use huddle_utils_home_dir::find_huddle_home;
use serde::Deserialize;

pub const CONFIG_TOML_FILE: &str = "config.toml";

const DEFAULT_DISPLAY_NAME: &str = "me";

/// On-disk shape of `<huddle_home>/config.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigToml {
    /// Placeholder shown in the main composer while it is empty.
    pub placeholder: Option<String>,

    /// Name attached to messages sent from this terminal.
    pub display_name: Option<String>,

    /// Ask before deleting a message. Defaults to true.
    pub confirm_delete: Option<bool>,
}

/// Values supplied on the command line; they win over `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub placeholder: Option<String>,
    pub display_name: Option<String>,
    pub read_only: bool,
    pub confirm_delete: Option<bool>,
}

/// Resolved settings the app runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub huddle_home: PathBuf,
    pub placeholder: String,
    pub display_name: String,
    /// Renders the main composer disabled.
    pub read_only: bool,
    pub confirm_delete: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to locate huddle home: {0}")]
    Home(#[source] io::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Reads `config.toml` from `huddle_home`. A missing file yields defaults.
pub fn load_config_as_toml(huddle_home: &Path) -> Result<ConfigToml, ConfigError> {
    let path = huddle_home.join(CONFIG_TOML_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!("{} not found, using defaults", path.display());
            return Ok(ConfigToml::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

impl Config {
    /// Locates huddle home, reads its `config.toml` and applies `overrides`.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let huddle_home = find_huddle_home().map_err(ConfigError::Home)?;
        let cfg = load_config_as_toml(&huddle_home)?;
        Ok(Self::load_from_base_config_with_overrides(
            cfg,
            overrides,
            huddle_home,
        ))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        huddle_home: PathBuf,
    ) -> Self {
        let ConfigOverrides {
            placeholder,
            display_name,
            read_only,
            confirm_delete,
        } = overrides;

        Self {
            huddle_home,
            placeholder: placeholder
                .or(cfg.placeholder)
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            display_name: display_name
                .or(cfg.display_name)
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            read_only,
            confirm_delete: confirm_delete.or(cfg.confirm_delete).unwrap_or(true),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.huddle_home.join("log")
    }
}
