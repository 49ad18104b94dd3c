use crate::error::ConfigError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const DEFAULT_API_URL: &str = "https://api.igdb.com/v4";

/// Which key the detail lookup query filters on. The inbound route carries
/// both a slug and an id; only one of them drives the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLookup {
    Id,
    Slug,
}

impl FromStr for DetailLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(DetailLookup::Id),
            "slug" => Ok(DetailLookup::Slug),
            other => Err(format!("expected 'id' or 'slug', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
    pub token_ttl: Duration,
    pub default_min_rating: u8,
    pub default_page_size: u32,
    pub request_timeout: Duration,
    pub detail_lookup: DetailLookup,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Tests inject a map here
    /// instead of mutating the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_ttl_secs: u64 = try_load(&get, "GAMEDEX_TOKEN_TTL_SECS", "604800")?;
        let timeout_secs: u64 = try_load(&get, "GAMEDEX_TIMEOUT_SECS", "30")?;

        let default_min_rating: u8 = try_load(&get, "GAMEDEX_MIN_RATING", "85")?;
        if default_min_rating > 100 {
            return Err(ConfigError::InvalidVar {
                name: "GAMEDEX_MIN_RATING".to_string(),
                value: default_min_rating.to_string(),
                reason: "rating is a 0-100 scale".to_string(),
            });
        }

        let default_page_size: u32 = try_load(&get, "GAMEDEX_PAGE_SIZE", "20")?;
        if default_page_size == 0 {
            return Err(ConfigError::InvalidVar {
                name: "GAMEDEX_PAGE_SIZE".to_string(),
                value: "0".to_string(),
                reason: "page size must be at least 1".to_string(),
            });
        }

        Ok(Self {
            client_id: require(&get, "GAMEDEX_CLIENT_ID")?,
            client_secret: require(&get, "GAMEDEX_CLIENT_SECRET")?,
            token_url: get("GAMEDEX_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            api_url: get("GAMEDEX_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_ttl: Duration::from_secs(token_ttl_secs),
            default_min_rating,
            default_page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            detail_lookup: try_load(&get, "GAMEDEX_DETAIL_LOOKUP", "id")?,
            port: try_load(&get, "GAMEDEX_PORT", "3000")?,
        })
    }
}

fn require<F>(get: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).filter(|v| !v.is_empty()).ok_or(ConfigError::MissingVar {
        name: key.to_string(),
    })
}

fn try_load<F, T: FromStr>(get: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T::Err: Display,
{
    let raw = get(key).unwrap_or_else(|| {
        tracing::debug!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| ConfigError::InvalidVar {
        name: key.to_string(),
        value: raw.clone(),
        reason: format!("{}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GAMEDEX_CLIENT_ID", "client-id"),
            ("GAMEDEX_CLIENT_SECRET", "client-secret"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&minimal())).expect("config should load");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_ttl, Duration::from_secs(604_800));
        assert_eq!(config.default_min_rating, 85);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.detail_lookup, DetailLookup::Id);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = Config::from_lookup(lookup(&[("GAMEDEX_CLIENT_ID", "client-id")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingVar { ref name }) if name == "GAMEDEX_CLIENT_SECRET"
        ));

        // Empty counts as missing
        let mut pairs = minimal();
        pairs[1] = ("GAMEDEX_CLIENT_SECRET", "");
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let mut pairs = minimal();
        pairs.push(("GAMEDEX_TOKEN_TTL_SECS", "3600"));
        pairs.push(("GAMEDEX_MIN_RATING", "93"));
        pairs.push(("GAMEDEX_DETAIL_LOOKUP", "slug"));

        let config = Config::from_lookup(lookup(&pairs)).expect("config should load");
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.default_min_rating, 93);
        assert_eq!(config.detail_lookup, DetailLookup::Slug);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = minimal();
        pairs.push(("GAMEDEX_PAGE_SIZE", "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidVar { ref name, .. }) if name == "GAMEDEX_PAGE_SIZE"
        ));

        let mut pairs = minimal();
        pairs.push(("GAMEDEX_MIN_RATING", "150"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = minimal();
        pairs.push(("GAMEDEX_DETAIL_LOOKUP", "name"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = minimal();
        pairs.push(("GAMEDEX_TOKEN_TTL_SECS", "eternal"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
