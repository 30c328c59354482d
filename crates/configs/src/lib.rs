//! # configs
//!
//! Runtime settings for the PixHub binaries.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. `config/pixhub.toml` (optional; path overridable via `PIXHUB_CONFIG`)
//! 3. `PIXHUB__<SECTION>__<KEY>` environment variables, e.g.
//!    `PIXHUB__SERVER__PORT=8080` or `PIXHUB__BILLING__TRC20=T...`
//!
//! A `.env` file in the working directory is loaded first, so its entries
//! behave like real environment variables.

use config::{Config, Environment, File};
use domains::{PlanCatalog, UsdAmount};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/pixhub.toml";
pub const ENV_PREFIX: &str = "PIXHUB";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { key, reason: reason.into() }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub billing: BillingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection URL; may embed credentials, so it stays wrapped.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Base `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// `pretty`, `compact` or `json`.
    pub format: String,
}

/// Plan prices (decimal USD strings) and the receiving wallet per network.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingSettings {
    pub monthly: String,
    pub yearly: String,
    pub lifetime: String,
    pub trc20: String,
    pub bep20: String,
    pub erc20: String,
}

impl BillingSettings {
    pub fn plan_catalog(&self) -> Result<PlanCatalog, ConfigError> {
        Ok(PlanCatalog {
            monthly: price("billing.monthly", &self.monthly)?,
            yearly: price("billing.yearly", &self.yearly)?,
            lifetime: price("billing.lifetime", &self.lifetime)?,
            trc20_wallet: wallet("billing.trc20", &self.trc20)?,
            bep20_wallet: wallet("billing.bep20", &self.bep20)?,
            erc20_wallet: wallet("billing.erc20", &self.erc20)?,
        })
    }
}

fn price(key: &'static str, raw: &str) -> Result<UsdAmount, ConfigError> {
    let amount: UsdAmount = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(key, format!("{e}")))?;
    if amount <= UsdAmount::ZERO {
        return Err(ConfigError::invalid(key, "price must be positive"));
    }
    Ok(amount)
}

fn wallet(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let address = raw.trim();
    if address.is_empty() {
        return Err(ConfigError::invalid(key, "wallet address is empty"));
    }
    Ok(address.to_string())
}

impl Settings {
    /// Loads `.env`, then layers defaults, the config file and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal; real environment variables still apply.
        dotenvy::dotenv().ok();
        let path =
            std::env::var("PIXHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name(&path).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// Built-in defaults, ready for further sources.
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let catalog = PlanCatalog::default();
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://pixhub.db")?
            .set_default("database.max_connections", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("billing.monthly", catalog.monthly.to_string())?
            .set_default("billing.yearly", catalog.yearly.to_string())?
            .set_default("billing.lifetime", catalog.lifetime.to_string())?
            .set_default("billing.trc20", catalog.trc20_wallet)?
            .set_default("billing.bep20", catalog.bep20_wallet)?
            .set_default("billing.erc20", catalog.erc20_wallet)?)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid("database.max_connections", "must be at least 1"));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "compact" | "json") {
            return Err(ConfigError::invalid(
                "logging.format",
                format!("expected pretty, compact or json, got {:?}", self.logging.format),
            ));
        }
        self.billing.plan_catalog()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use domains::Plan;
    use secrecy::ExposeSecret;

    fn with_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_builder(
            Settings::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let settings = with_toml("").unwrap();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.database.url.expose_secret(), "sqlite://pixhub.db");
        assert_eq!(settings.billing.plan_catalog().unwrap(), PlanCatalog::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let settings = with_toml(
            r#"
            [server]
            port = 8080
            [billing]
            monthly = "5.49"
            erc20 = "0xabc"
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        let catalog = settings.billing.plan_catalog().unwrap();
        assert_eq!(catalog.price(Plan::Monthly), UsdAmount::from_cents(549));
        assert_eq!(catalog.erc20_wallet, "0xabc");
        assert_eq!(catalog.price(Plan::Yearly), UsdAmount::from_cents(2899));
    }

    #[test]
    fn rejects_bad_prices_and_wallets() {
        let err = with_toml("[billing]\nyearly = \"0\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "billing.yearly", .. }));

        let err = with_toml("[billing]\nlifetime = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "billing.lifetime", .. }));

        let err = with_toml("[billing]\ntrc20 = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "billing.trc20", .. }));
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = with_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "logging.format", .. }));
    }
}
