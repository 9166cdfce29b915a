use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage_root: String,
    pub temp_upload_ttl_secs: i64,
    pub signed_url_ttl_secs: i64,
    pub cron_secret: Option<String>,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let storage_root = env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());
        let cron_secret = env::var("CRON_SECRET").ok().filter(|s| !s.is_empty());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            storage_root,
            temp_upload_ttl_secs: parse_or("TEMP_UPLOAD_TTL_SECS", 300),
            signed_url_ttl_secs: parse_or("SIGNED_URL_TTL_SECS", 3600),
            cron_secret,
            max_body_bytes: parse_or("MAX_BODY_BYTES", 1024 * 1024),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
