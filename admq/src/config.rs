use std::env;

const URL_VAR: &str = "ADMQ_REDIS_URL";
const HOST_VAR: &str = "ADMQ_REDIS_HOST";
const PORT_VAR: &str = "ADMQ_REDIS_PORT";
const PASSWORD_VAR: &str = "ADMQ_REDIS_PASSWORD";
const DEFAULT_PORT: u16 = 6379;

/// Redis broker location read from the environment.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    pub url: String,
}

impl BrokerConfig {
    /// `None` means no broker is configured - a valid state in which the
    /// system runs degraded, on in-process serialization alone.
    pub fn from_env() -> Option<Self> {
        if let Ok(url) = env::var(URL_VAR) {
            return Some(Self { url });
        }

        let host = env::var(HOST_VAR).ok()?;
        let port = env::var(PORT_VAR)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let password = env::var(PASSWORD_VAR).ok();

        Some(Self::from_parts(&host, port, password.as_deref()))
    }

    pub fn from_parts(host: &str, port: u16, password: Option<&str>) -> Self {
        let url = match password {
            Some(password) => format!("redis://:{password}@{host}:{port}/"),
            None => format!("redis://{host}:{port}/"),
        };
        Self { url }
    }
}
