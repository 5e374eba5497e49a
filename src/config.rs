use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_api_url: String,
    pub mail_api_key: String,
    // Sender identity is optional at boot; presence is validated when a
    // dispatch run starts, not when the process comes up.
    pub mail_from: Option<String>,
    pub mail_from_name: Option<String>,
    pub default_event_name: Option<String>,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_api_url: env::var("RESEND_API_URL").unwrap_or_else(|_| "https://api.resend.com".to_string()),
            mail_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").ok().filter(|s| !s.trim().is_empty()),
            mail_from_name: env::var("MAIL_FROM_NAME").ok().filter(|s| !s.trim().is_empty()),
            default_event_name: env::var("DEFAULT_EVENT_NAME").ok().filter(|s| !s.trim().is_empty()),
            cors_origin: env::var("CORS_ORIGIN").ok(),
        }
    }
}
