//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase service role key (bypasses RLS - server only!)
    pub supabase_service_role_key: String,
    /// Supabase JWT secret for token verification
    pub supabase_jwt_secret: String,

    /// Allowed client origin for CORS
    pub client_origin: String,

    /// Storage bucket holding profile avatars
    pub avatar_bucket: String,
    /// Capacity given to newly created guilds
    pub guild_max_members: u32,
    /// Number of chat messages returned by a history fetch
    pub chat_history_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            supabase_jwt_secret: required("SUPABASE_JWT_SECRET")?,

            client_origin: required("CLIENT_ORIGIN")?,

            avatar_bucket: lookup("AVATAR_BUCKET").unwrap_or_else(|| "user-avatars".to_string()),
            guild_max_members: parse_or(&lookup, "GUILD_MAX_MEMBERS", 30)?,
            chat_history_limit: parse_or(&lookup, "CHAT_HISTORY_LIMIT", 50)?,
        })
    }
}

fn parse_or<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::Invalid(key)),
        },
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("SUPABASE_URL", "https://demo.supabase.co/".to_string()),
            ("SUPABASE_SERVICE_ROLE_KEY", "service".to_string()),
            ("SUPABASE_JWT_SECRET", "secret".to_string()),
            ("CLIENT_ORIGIN", "http://localhost:5173".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.server_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.supabase_url, "https://demo.supabase.co");
        assert_eq!(config.avatar_bucket, "user-avatars");
        assert_eq!(config.guild_max_members, 30);
        assert_eq!(config.chat_history_limit, 50);
    }

    #[test]
    fn port_takes_precedence_over_server_addr() {
        let mut vars = base_vars();
        vars.insert("PORT", "9000".to_string());
        vars.insert("SERVER_ADDR", "127.0.0.1:3000".to_string());

        let config = load(&vars).unwrap();
        assert_eq!(config.server_addr.port(), 9000);
    }

    #[test]
    fn missing_required_var_is_named() {
        let mut vars = base_vars();
        vars.remove("SUPABASE_JWT_SECRET");

        match load(&vars) {
            Err(ConfigError::Missing(key)) => assert_eq!(key, "SUPABASE_JWT_SECRET"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn zero_or_garbage_numbers_are_rejected() {
        let mut vars = base_vars();
        vars.insert("GUILD_MAX_MEMBERS", "0".to_string());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid("GUILD_MAX_MEMBERS"))));

        vars.insert("GUILD_MAX_MEMBERS", "12".to_string());
        vars.insert("CHAT_HISTORY_LIMIT", "lots".to_string());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid("CHAT_HISTORY_LIMIT"))));
    }

    #[test]
    fn bad_address_is_reported() {
        let mut vars = base_vars();
        vars.insert("SERVER_ADDR", "not-an-address".to_string());
        assert!(matches!(load(&vars), Err(ConfigError::InvalidAddress)));
    }
}
