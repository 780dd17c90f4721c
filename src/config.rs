use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout; `None` lets a hung request wait forever
    pub request_timeout: Option<Duration>,
    /// Bearer token used by the command-line tool
    pub api_token: Option<String>,
    /// Admin flag paired with `api_token`
    pub is_admin: bool,
    pub notice_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: None,
            api_token: None,
            is_admin: false,
            notice_channel_capacity: DEFAULT_NOTICE_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(format!(
                "API_BASE_URL must start with http:// or https://, got '{}'",
                api_base_url
            ));
        }

        let request_timeout = match env::var("API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| "Invalid API_TIMEOUT_SECS")?;
                if secs == 0 {
                    return Err("API_TIMEOUT_SECS must be greater than 0".to_string());
                }
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let is_admin: bool = env::var("API_IS_ADMIN")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| "Invalid API_IS_ADMIN (use true or false)")?;

        let notice_channel_capacity: usize = env::var("NOTICE_CHANNEL_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_NOTICE_CHANNEL_CAPACITY.to_string())
            .parse()
            .map_err(|_| "Invalid NOTICE_CHANNEL_CAPACITY")?;

        if notice_channel_capacity == 0 {
            return Err("NOTICE_CHANNEL_CAPACITY must be greater than 0".to_string());
        }

        Ok(ClientConfig {
            api_base_url,
            request_timeout,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            is_admin,
            notice_channel_capacity,
        })
    }
}
