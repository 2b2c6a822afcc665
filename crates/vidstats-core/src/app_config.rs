/// Process-wide configuration, built once at startup and passed to the
/// components that need it.
///
/// `openai_api_key` and `telegram_bot_token` are optional here; the binary
/// that actually needs one of them checks for it at startup (the CLI can
/// run `migrate`/`load` with neither).
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub openai_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    pub telegram_poll_timeout_secs: u64,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_timeout_secs", &self.openai_timeout_secs)
            .field(
                "telegram_poll_timeout_secs",
                &self.telegram_poll_timeout_secs,
            )
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
