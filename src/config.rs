pub const DEFAULT_PORT: u16 = 39100;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:personas.db?mode=rwc";
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Lifetime of bearer tokens issued by register/login.
    pub token_ttl_days: i64,
    /// Single allowed CORS origin. `None` means permissive CORS.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let token_ttl_days = std::env::var("PERSONA_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_DAYS);

        let cors_origin = std::env::var("PERSONA_CORS_ORIGIN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            token_ttl_days,
            cors_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("PORT");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PERSONA_TOKEN_TTL_DAYS");
        std::env::remove_var("PERSONA_CORS_ORIGIN");
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, "sqlite:personas.db?mode=rwc");
        assert_eq!(config.token_ttl_days, 30);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    #[serial]
    fn test_port_from_env() {
        clear_env();
        std::env::set_var("PORT", "8080");
        let config = Config::from_env();
        assert_eq!(config.port, 8080);
    }

    #[test]
    #[serial]
    fn test_database_url_from_env() {
        clear_env();
        std::env::set_var("DATABASE_URL", "sqlite:test.db");
        let config = Config::from_env();
        assert_eq!(config.database_url, "sqlite:test.db");
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back_to_default() {
        clear_env();
        std::env::set_var("PORT", "not_a_number");
        let config = Config::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    #[serial]
    fn test_token_ttl_from_env() {
        clear_env();
        std::env::set_var("PERSONA_TOKEN_TTL_DAYS", "7");
        let config = Config::from_env();
        assert_eq!(config.token_ttl_days, 7);
    }

    #[test]
    #[serial]
    fn test_non_positive_token_ttl_falls_back_to_default() {
        clear_env();
        std::env::set_var("PERSONA_TOKEN_TTL_DAYS", "0");
        let config = Config::from_env();
        assert_eq!(config.token_ttl_days, DEFAULT_TOKEN_TTL_DAYS);
    }

    #[test]
    #[serial]
    fn test_blank_cors_origin_is_ignored() {
        clear_env();
        std::env::set_var("PERSONA_CORS_ORIGIN", "   ");
        let config = Config::from_env();
        assert!(config.cors_origin.is_none());

        std::env::set_var("PERSONA_CORS_ORIGIN", "https://app.example.com");
        let config = Config::from_env();
        assert_eq!(config.cors_origin.as_deref(), Some("https://app.example.com"));
    }
}
