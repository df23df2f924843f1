use {
    std::{env, net::SocketAddr, time::Duration},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub stripe_webhook_secret: String,
    /// `None` disables delivery; confirmations are only logged.
    pub resend_api_key: Option<String>,
    pub admin_email: String,
    pub bind_addr: SocketAddr,
    pub webhook_tolerance: Duration,
    pub notify_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let secs = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(name) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => raw
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                        name,
                        reason: e.to_string(),
                    }),
            }
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let notify_timeout = secs("NOTIFY_TIMEOUT_SECS", 10)?;
        if notify_timeout >= crate::REQUEST_TIMEOUT {
            return Err(ConfigError::Invalid {
                name: "NOTIFY_TIMEOUT_SECS",
                reason: format!(
                    "must be below the {}s request timeout",
                    crate::REQUEST_TIMEOUT.as_secs()
                ),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            resend_api_key: lookup("RESEND_API_KEY").filter(|v| !v.is_empty()),
            admin_email: required("ADMIN_EMAIL")?,
            bind_addr,
            webhook_tolerance: secs("WEBHOOK_TOLERANCE_SECS", 300)?,
            notify_timeout,
        })
    }

    /// `From` header for customer emails.
    pub fn sender(&self) -> String {
        format!("CaseCobra <{}>", self.admin_email)
    }
}
