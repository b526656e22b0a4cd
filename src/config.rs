use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;

use crate::error::{AppError, AppResult};
use crate::utils::CardPolicy;

const DEV_SESSION_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    /// Public "anon" key used by the intake API.
    #[serde(default)]
    pub anon_key: String,
    /// Key used by the checkout UI; may carry more privileges than the anon key.
    #[serde(default)]
    pub service_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub cases_table: String,
    pub allowed_origins: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            cases_table: "cases".to_string(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "https://fundhunt.net".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub payments_table: String,
    #[serde(default)]
    pub card_policy: CardPolicy,
    /// Store card number and CVV exactly as submitted instead of masking them.
    #[serde(default)]
    pub persist_raw_card_data: bool,
    pub session_secret: String,
    pub session_ttl_secs: i64, // seconds
    /// Mark the session cookie `Secure`. Turn off only for plain-HTTP development.
    pub secure_cookie: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payments_table: "payment_page".to_string(),
            card_policy: CardPolicy::default(),
            persist_raw_card_data: false,
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_ttl_secs: 3600,
            secure_cookie: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    #[serde(default)]
    pub download_password: Option<String>,
    pub max_failed_attempts: u32,
    pub lockout_secs: i64, // seconds
    /// Upper bound on how long a signed-in admin cookie stays valid.
    pub session_ttl_secs: i64, // seconds
    /// Reverse proxies allowed to report the client address in forwarded headers.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            download_password: None,
            max_failed_attempts: 5,
            lockout_secs: 300,
            session_ttl_secs: 900,
            trusted_proxies: Vec::new(),
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn comma_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl Config {
    /// Loads `CONFIG_PATH` (default `config.toml`), falling back to environment
    /// variables only when the file does not exist. Environment variables always
    /// override file values.
    pub fn from_toml() -> AppResult<Self> {
        use std::io::ErrorKind;

        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let config_str = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Some(config_str),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        Self::load(config_str.as_deref(), &config_path, get_env)
    }

    /// Builds the config from an optional file body and a variable lookup.
    fn load<F>(config_str: Option<&str>, config_path: &str, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut config = match config_str {
            Some(config_str) => Self::from_toml_str(config_str)?,
            None => {
                let url = lookup("SUPABASE_URL").ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "SUPABASE_URL is not set and {config_path} was not found"
                    ))
                })?;
                Config {
                    server: ServerConfig::default(),
                    supabase: SupabaseConfig {
                        url,
                        anon_key: String::new(),
                        service_key: String::new(),
                    },
                    intake: IntakeConfig::default(),
                    checkout: CheckoutConfig::default(),
                    admin: AdminConfig::default(),
                }
            }
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("failed to parse config file: {e}")))
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        macro_rules! parse_var {
            ($name:expr) => {
                lookup($name).and_then(|v| match v.trim().parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid value for {}: {v}", $name);
                        None
                    }
                })
            };
        }

        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = parse_var!("SERVER_PORT") {
            self.server.port = p;
        }
        if let Some(v) = lookup("SUPABASE_URL") {
            self.supabase.url = v;
        }
        if let Some(v) = lookup("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = v;
        }
        if let Some(v) = lookup("SUPABASE_KEY") {
            self.supabase.service_key = v;
        }
        if let Some(v) = lookup("CASES_TABLE") {
            self.intake.cases_table = v;
        }
        if let Some(v) = lookup("CORS_ALLOWED_ORIGINS") {
            self.intake.allowed_origins = comma_list(&v).map(String::from).collect();
        }
        if let Some(v) = lookup("PAYMENTS_TABLE") {
            self.checkout.payments_table = v;
        }
        if let Some(policy) = parse_var!("CARD_POLICY") {
            self.checkout.card_policy = policy;
        }
        if let Some(flag) = parse_var!("PERSIST_RAW_CARD_DATA") {
            self.checkout.persist_raw_card_data = flag;
        }
        if let Some(v) = lookup("SESSION_SECRET") {
            self.checkout.session_secret = v;
        }
        if let Some(n) = parse_var!("SESSION_TTL_SECS") {
            self.checkout.session_ttl_secs = n;
        }
        if let Some(flag) = parse_var!("SESSION_COOKIE_SECURE") {
            self.checkout.secure_cookie = flag;
        }
        if let Some(v) = lookup("CRM_DOWNLOAD_PASSWORD") {
            self.admin.download_password = Some(v);
        }
        if let Some(n) = parse_var!("ADMIN_MAX_FAILED_ATTEMPTS") {
            self.admin.max_failed_attempts = n;
        }
        if let Some(n) = parse_var!("ADMIN_LOCKOUT_SECS") {
            self.admin.lockout_secs = n;
        }
        if let Some(n) = parse_var!("ADMIN_SESSION_TTL_SECS") {
            self.admin.session_ttl_secs = n;
        }
        if let Some(v) = lookup("ADMIN_TRUSTED_PROXIES") {
            self.admin.trusted_proxies = comma_list(&v)
                .filter_map(|ip| match ip.parse::<IpAddr>() {
                    Ok(ip) => Some(ip),
                    Err(_) => {
                        log::warn!("Ignoring invalid proxy address in ADMIN_TRUSTED_PROXIES: {ip}");
                        None
                    }
                })
                .collect();
        }
    }

    /// The intake API cannot run without the database URL and the anon key.
    pub fn require_intake(&self) -> AppResult<()> {
        if self.supabase.url.is_empty() || self.supabase.anon_key.is_empty() {
            return Err(AppError::ConfigError(
                "Supabase URL and anonymous key must be set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_checkout(&self) -> AppResult<()> {
        if self.supabase.url.is_empty() || self.supabase.service_key.is_empty() {
            return Err(AppError::ConfigError(
                "Supabase URL and key must be set".to_string(),
            ));
        }
        if self.checkout.session_secret == DEV_SESSION_SECRET {
            log::warn!("SESSION_SECRET is not set, session cookies use the development secret");
        }
        if self.admin.download_password.is_none() {
            log::warn!("CRM_DOWNLOAD_PASSWORD is not set, admin export is disabled");
        }
        Ok(())
    }
}
