use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub elevation_minutes: i64,
    pub server_host: String,
    pub server_port: u16,
    pub admin_username: String,
    pub admin_password: String,
    pub upload_dir: PathBuf,
    pub upload_public_url: String,
    pub geocoder_url: String,
    pub location_timeout: Duration,
    pub report_offset: FixedOffset,
    pub sse_retry: Duration,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24)?,
            elevation_minutes: parsed("ELEVATION_MINUTES", 5)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parsed("SERVER_PORT", 3000)?,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: required("ADMIN_PASSWORD")?,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".to_string())
                .into(),
            upload_public_url: env::var("UPLOAD_PUBLIC_URL")
                .unwrap_or_else(|_| "/uploads".to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/reverse".to_string()),
            location_timeout: Duration::from_secs(parsed("LOCATION_TIMEOUT_SECS", 5)?),
            report_offset: parse_offset(
                &env::var("REPORT_UTC_OFFSET").unwrap_or_else(|_| "+00:00".to_string()),
            )?,
            sse_retry: Duration::from_secs(parsed("SSE_RETRY_SECS", 3)?),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> AppResult<String> {
    env::var(key).map_err(|_| AppError::Internal(format!("{} must be set", key)))
}

fn parsed<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a number", key))),
        Err(_) => Ok(default),
    }
}

/// Parses `+HH:MM` / `-HH:MM` into a fixed offset.
pub fn parse_offset(raw: &str) -> AppResult<FixedOffset> {
    raw.trim()
        .parse::<FixedOffset>()
        .map_err(|e| AppError::Internal(format!("Invalid UTC offset {}: {}", raw, e)))
}
