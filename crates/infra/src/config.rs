use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub data_backend: String,
    pub rest_endpoint: String,
    pub session_ttl_minutes: i64,
    pub auth_dev_bypass_enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("data_backend", "memory")?
            .set_default("rest_endpoint", "http://127.0.0.1:54321")?
            .set_default("session_ttl_minutes", 14 * 24 * 60)?
            .set_default("auth_dev_bypass_enabled", false)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl_minutes.saturating_mul(60_000)
    }
}
