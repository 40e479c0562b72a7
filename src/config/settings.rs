use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sse: SseConfig,
    #[serde(default)]
    pub vapid: VapidConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Shared key required in `X-API-Key` for `/send` and `/push`; open when unset
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SseConfig {
    /// Keep-alive comment interval in seconds
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval: u64,
    #[serde(default = "default_keep_alive_text")]
    pub keep_alive_text: String,
    /// Buffered messages per connection before `/send` waits
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VapidConfig {
    /// Base64url PKCS#8 document holding a P-256 private key
    pub private_key: Option<String>,
    /// Contact URI placed in the `sub` claim
    #[serde(default = "default_vapid_subject")]
    pub subject: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Default `TTL` header in seconds
    #[serde(default = "default_push_ttl")]
    pub ttl: u32,
    /// Timeout for one request to a push service, in seconds
    #[serde(default = "default_push_timeout")]
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    13700
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_keep_alive_interval() -> u64 {
    10
}

fn default_keep_alive_text() -> String {
    "keep-alive-text".to_string()
}

fn default_channel_capacity() -> usize {
    100
}

fn default_vapid_subject() -> String {
    "mailto:admin@example.com".to_string()
}

fn default_push_ttl() -> u32 {
    86_400 // 1 day
}

fn default_push_timeout() -> u64 {
    10
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("sse.keep_alive_interval", default_keep_alive_interval() as i64)?
            .set_default("sse.channel_capacity", default_channel_capacity() as i64)?
            .set_default("push.ttl", default_push_ttl() as i64)?
            .set_default("push.request_timeout", default_push_timeout() as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment())
            .set_override_option("vapid.private_key", env::var("VAPID_PRIVATE_KEY").ok())?
            .set_override_option(
                "server.cors_origins",
                parse_origin_list(env::var("CORS_ORIGINS").ok()),
            )?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// SERVER_PORT, API_KEY, VAPID_SUBJECT, LOG_FORMAT, ...
/// Multi-word keys (keep_alive_interval) go through the config files.
/// Values are never split into lists, so a comma in API_KEY stays put.
fn environment() -> Environment {
    Environment::default().separator("_").try_parsing(true)
}

/// `CORS_ORIGINS=https://a.example,https://b.example`
fn parse_origin_list(raw: Option<String>) -> Option<Vec<String>> {
    let origins: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();
    Some(origins)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit: default_body_limit(),
        }
    }
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            keep_alive_interval: default_keep_alive_interval(),
            keep_alive_text: default_keep_alive_text(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for VapidConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            subject: default_vapid_subject(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            ttl: default_push_ttl(),
            request_timeout: default_push_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 13700);
        assert_eq!(settings.sse.keep_alive_interval, 10);
        assert_eq!(settings.sse.keep_alive_text, "keep-alive-text");
        assert_eq!(settings.sse.channel_capacity, 100);
        assert_eq!(settings.push.ttl, 86_400);
        assert!(settings.vapid.private_key.is_none());
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:13700");
    }

    fn from_env(vars: &[(&str, &str)]) -> Settings {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::builder()
            .add_source(environment().source(Some(source)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_env_value_with_comma_stays_a_string() {
        let settings = from_env(&[("API_KEY", "alpha,beta"), ("SERVER_PORT", "8080")]);
        assert_eq!(settings.api.key.as_deref(), Some("alpha,beta"));
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list(Some("https://a.example, https://b.example,".to_string())),
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
        assert_eq!(parse_origin_list(None), None);
    }

    #[test]
    fn test_log_format_deserializes_lowercase() {
        let log: LogConfig = serde_json::from_str(r#"{"format":"json"}"#).unwrap();
        assert_eq!(log.format, LogFormat::Json);
    }
}
