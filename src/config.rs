use crate::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub no_color: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("MMR_TRACKER_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => Self::default_data_dir()?,
        };

        let no_color = env::var("MMR_TRACKER_NO_COLOR")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config { data_dir, no_color })
    }

    fn default_data_dir() -> Result<PathBuf, AppError> {
        dirs::home_dir()
            .map(|home| home.join(".mmr_tracker"))
            .ok_or_else(|| {
                AppError::Config(
                    "Could not determine home directory, set MMR_TRACKER_DIR".to_string(),
                )
            })
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }
}
