use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dotenvy::dotenv;

/// Placeholder identity written for every upload.
pub const DEFAULT_RECOGNIZED_NAME: &str = "Person 1";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    /// CSV file rows are appended to
    pub attendance_csv: PathBuf,
    pub log_dir: PathBuf,

    pub max_upload_bytes: usize,
    pub recognized_name: String,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_read_per_min: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            api_prefix: "/api".to_string(),
            attendance_csv: PathBuf::from("attendance.csv"),
            log_dir: PathBuf::from("logs"),
            max_upload_bytes: 10 * 1024 * 1024,
            recognized_name: DEFAULT_RECOGNIZED_NAME.to_string(),
            rate_upload_per_min: 60,
            rate_read_per_min: 600,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),
            attendance_csv: env::var("ATTENDANCE_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.attendance_csv),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            recognized_name: env::var("RECOGNIZED_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.recognized_name),
            rate_upload_per_min: env_parse("RATE_UPLOAD_PER_MIN", defaults.rate_upload_per_min),
            rate_read_per_min: env_parse("RATE_READ_PER_MIN", defaults.rate_read_per_min),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
