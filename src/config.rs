use std::{env, net::SocketAddr, time::Duration};

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://xn--pevapakkumised-5hb.ee/";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub base_url: Url,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Reads `HOST`, `PORT`, `LUNCH_BASE_URL` and `FETCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = get("PORT").map_or(DEFAULT_PORT, |port| {
            port.parse().unwrap_or_else(|_| {
                log::warn!("PORT={port} is not a port number, using {DEFAULT_PORT}");
                DEFAULT_PORT
            })
        });
        let addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("bad listen address {host}:{port}: {e}")))?;

        let base_url = get("LUNCH_BASE_URL").unwrap_or_else(|| {
            log::warn!("env var LUNCH_BASE_URL not set, using {DEFAULT_BASE_URL}");
            DEFAULT_BASE_URL.to_owned()
        });
        let base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url} cannot be a base url")));
        }

        let secs = get("FETCH_TIMEOUT_SECS").map_or(DEFAULT_FETCH_TIMEOUT_SECS, |secs| {
            match secs.parse() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    log::warn!(
                        "FETCH_TIMEOUT_SECS={secs} is not a positive number, using {DEFAULT_FETCH_TIMEOUT_SECS}"
                    );
                    DEFAULT_FETCH_TIMEOUT_SECS
                }
            }
        });

        Ok(Self {
            addr,
            base_url,
            fetch_timeout: Duration::from_secs(secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("LUNCH_BASE_URL", "http://localhost:9000/"),
            ("FETCH_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config(&[("PORT", "http"), ("FETCH_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.addr.port(), DEFAULT_PORT);
        assert_eq!(config.fetch_timeout, Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));
    }

    #[test]
    fn test_bad_base_url_is_an_error() {
        assert!(matches!(
            config(&[("LUNCH_BASE_URL", "not a url")]),
            Err(Error::Url(_))
        ));
        assert!(matches!(
            config(&[("LUNCH_BASE_URL", "mailto:lunch@example.com")]),
            Err(Error::Config(_))
        ));
    }
}
