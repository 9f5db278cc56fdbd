//! INI file configuration adapter.

use crate::domain::error::LagtraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LagtraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| LagtraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, LagtraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| LagtraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, LagtraderError> {
        if self.get_string(section, key).is_none() {
            return Ok(default);
        }
        self.config
            .getint(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|reason| LagtraderError::invalid(section, key, reason))
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, LagtraderError> {
        if self.get_string(section, key).is_none() {
            return Ok(default);
        }
        self.config
            .getfloat(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|reason| LagtraderError::invalid(section, key, reason))
    }
}
