use crate::services::renewal_service::MAX_RENEWAL_MONTHS;
use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub renewal: RenewalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    /// Unsigned upload preset configured in the Cloudinary console.
    pub upload_preset: String,
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,
    #[serde(default = "default_cloudinary_base_url")]
    pub base_url: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            folder: default_cloudinary_folder(),
            base_url: default_cloudinary_base_url(),
        }
    }
}

fn default_cloudinary_folder() -> String {
    "fitdesk".to_string()
}

fn default_cloudinary_base_url() -> String {
    "https://api.cloudinary.com".to_string()
}

/// Tuning for the expiration scanner and the automatic renewal pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewalConfig {
    /// Interval of the background expiration/renewal task.
    pub scan_interval_secs: u64,
    /// Memberships ending within this many days count as "expiring soon".
    pub expiring_soon_days: i64,
    /// Pending payment due date = renewal start + this many days.
    pub payment_due_days: i64,
    /// Months added by the automatic monthly pass.
    pub automatic_months: u32,
    /// Day of month used when a tenant has no stored automation config.
    pub default_run_day: i32,
    /// Number of days, starting at the configured day, in which the monthly
    /// pass may still run if the service was down on the day itself.
    pub run_window_days: i32,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 3600,
            expiring_soon_days: 7,
            payment_due_days: 7,
            automatic_months: 1,
            default_run_day: 1,
            run_window_days: 3,
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow!("DATABASE_URL is not set and no config file was found at {config_path}")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    cloudinary: CloudinaryConfig::default(),
                    renewal: RenewalConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow!("Failed to read config file {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.cloudinary.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_UPLOAD_PRESET") {
            self.cloudinary.upload_preset = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_FOLDER") {
            self.cloudinary.folder = v;
        }
        if let Ok(v) = env::var("RENEWAL_SCAN_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.renewal.scan_interval_secs = n;
        }
        if let Ok(v) = env::var("RENEWAL_PAYMENT_DUE_DAYS")
            && let Ok(n) = v.parse()
        {
            self.renewal.payment_due_days = n;
        }
        if let Ok(v) = env::var("RENEWAL_DEFAULT_RUN_DAY")
            && let Ok(n) = v.parse()
        {
            self.renewal.default_run_day = n;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let r = &self.renewal;
        if !(1..=28).contains(&r.default_run_day) {
            return Err(anyhow!("renewal.default_run_day must be between 1 and 28"));
        }
        if r.run_window_days < 1 {
            return Err(anyhow!("renewal.run_window_days must be at least 1"));
        }
        if !(1..=MAX_RENEWAL_MONTHS).contains(&r.automatic_months) {
            return Err(anyhow!(
                "renewal.automatic_months must be between 1 and {MAX_RENEWAL_MONTHS}"
            ));
        }
        if r.expiring_soon_days < 0 {
            return Err(anyhow!("renewal.expiring_soon_days must not be negative"));
        }
        if r.payment_due_days < 0 {
            return Err(anyhow!("renewal.payment_due_days must not be negative"));
        }
        if r.scan_interval_secs == 0 {
            return Err(anyhow!("renewal.scan_interval_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/fitdesk"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.renewal.default_run_day, 1);
        assert_eq!(config.renewal.run_window_days, 3);
        assert_eq!(config.cloudinary.base_url, "https://api.cloudinary.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_run_day() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/fitdesk"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600

            [renewal]
            default_run_day = 31
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_renewal_settings() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/fitdesk"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600
        "#;
        let base: Config = toml::from_str(raw).unwrap();

        let mut config = base.clone();
        config.renewal.automatic_months = MAX_RENEWAL_MONTHS;
        assert!(config.validate().is_ok());
        config.renewal.automatic_months = MAX_RENEWAL_MONTHS + 1;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.renewal.expiring_soon_days = -1;
        assert!(config.validate().is_err());

        let mut config = base;
        config.renewal.payment_due_days = -3;
        assert!(config.validate().is_err());
    }
}
