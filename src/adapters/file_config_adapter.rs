//! INI file configuration adapter.

use crate::domain::error::TrackerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| TrackerError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TrackerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TrackerError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_or<T>(&self, section: &str, key: &str, default: T) -> Result<T, TrackerError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_string(section, key) {
            Some(raw) => raw.parse().map_err(|e| {
                TrackerError::config_invalid(section, key, format!("'{raw}' is not a number: {e}"))
            }),
            None => Ok(default),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TrackerError> {
        self.parse_or(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TrackerError> {
        self.parse_or(section, key, default)
    }
}
