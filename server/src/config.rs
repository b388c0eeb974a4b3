use anyhow::{bail, Context};
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://apextsgroup.com",
    "https://www.apextsgroup.com",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub ollama_url: String,
    pub allowed_origins: Vec<String>,
    /// Mirror any request origin instead of checking the allow-list.
    pub cors_permissive: bool,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let ollama_url = lookup("OLLAMA_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let cors_permissive = lookup("CORS_PERMISSIVE")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let timeout_secs: u64 = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("UPSTREAM_TIMEOUT_SECS must be a number, got {raw:?}"))?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            bind_addr,
            port,
            ollama_url,
            allowed_origins,
            cors_permissive,
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.allowed_origins.len(), 4);
        assert!(config
            .allowed_origins
            .contains(&"https://apextsgroup.com".to_string()));
        assert!(!config.cors_permissive);
        assert_eq!(config.upstream_timeout, Duration::from_secs(60));
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = config_with(&[
            ("PORT", "8080"),
            ("OLLAMA_URL", "http://gpu-box:11434/"),
            ("ALLOWED_ORIGINS", " https://a.example , ,https://b.example"),
            ("CORS_PERMISSIVE", "TRUE"),
            ("UPSTREAM_TIMEOUT_SECS", "15"),
            ("BIND_ADDR", "127.0.0.1"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.cors_permissive);
        assert_eq!(config.upstream_timeout, Duration::from_secs(15));
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn empty_ollama_url_falls_back_to_default() {
        let config = config_with(&[("OLLAMA_URL", "  ")]).unwrap();
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_with(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(config_with(&[("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_with(&[("UPSTREAM_TIMEOUT_SECS", "soon")]).is_err());
    }
}
