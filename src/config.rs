use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_CURRENCY_SUFFIX: &str = "FCFA";
/// Narrow no-break space, the French grouping separator.
pub const DEFAULT_GROUP_SEPARATOR: char = '\u{202F}';

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CurrencyConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_group_separator")]
    pub group_separator: char,
}

fn default_suffix() -> String {
    DEFAULT_CURRENCY_SUFFIX.to_string()
}

fn default_group_separator() -> char {
    DEFAULT_GROUP_SEPARATOR
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            group_separator: default_group_separator(),
        }
    }
}

impl Config {
    /// Layers `config/parking` (optional) and `PARKING__*` environment variables
    /// over the built-in defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/parking")
    }

    /// Same layering as [`Config::load`] with the file looked up at `file`
    /// (extension inferred, e.g. `parking.toml`).
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("PARKING").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("storage.directory", "parking-data")?
            .set_default("currency.suffix", DEFAULT_CURRENCY_SUFFIX)?
            .set_default("currency.group_separator", DEFAULT_GROUP_SEPARATOR.to_string())
    }
}
