use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// HS256 signing secret for session tokens. Required.
  pub jwt_secret: String,
  /// Name of the HTTP-only session cookie.
  pub session_cookie_name: String,
  /// Session token lifetime in days.
  pub session_ttl_days: i64,
  /// Password-reset token lifetime in minutes.
  pub reset_token_ttl_minutes: i64,

  pub mail_sender: String,

  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let jwt_secret = get_env("JWT_SECRET")?;
    let session_cookie_name = get_env("SESSION_COOKIE_NAME").unwrap_or_else(|_| "session".to_string());
    let session_ttl_days = get_env("SESSION_TTL_DAYS")
      .unwrap_or_else(|_| "7".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_DAYS: {}", e)))?;
    let reset_token_ttl_minutes = get_env("RESET_TOKEN_TTL_MINUTES")
      .unwrap_or_else(|_| "15".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid RESET_TOKEN_TTL_MINUTES: {}", e)))?;

    let mail_sender = get_env("MAIL_SENDER").unwrap_or_else(|_| "noreply@shopnest.example".to_string());

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      session_cookie_name,
      session_ttl_days,
      reset_token_ttl_minutes,
      mail_sender,
      seed_db,
    })
  }
}
