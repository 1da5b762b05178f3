use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Adds the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = database_url_from_env();
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);
        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            cookie_secure,
            cors_origin,
        })
    }
}

/// `DATABASE_URL`, falling back to a `florecer.db` file in the working directory.
pub fn database_url_from_env() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://florecer.db".to_string())
}
