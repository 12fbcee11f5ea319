//! INI file configuration adapter.
//!
//! Recognised sections: `[data]`, `[classifier]`, `[screener]`, `[server]`.

use crate::domain::error::TrendError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrendError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| TrendError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TrendError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TrendError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const FULL: &str = r#"
[data]
source = csv
csv_dir = /var/data/prices

[classifier]
mode = simple
window = 10
gap_threshold_pct = 2.5

[screener]
base_url = http://screener.local:7070
timeout_secs = 15

[server]
listen = 0.0.0.0:8000
default_days = 120
"#;

    #[test]
    fn from_string_reads_all_sections() {
        let adapter = FileConfigAdapter::from_string(FULL).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("/var/data/prices".to_string())
        );
        assert_eq!(adapter.get_int("classifier", "window", 5), 10);
        assert_eq!(adapter.get_double("classifier", "gap_threshold_pct", 3.0), 2.5);
        assert_eq!(adapter.get_int("screener", "timeout_secs", 20), 15);
        assert_eq!(
            adapter.get_string("server", "listen"),
            Some("0.0.0.0:8000".to_string())
        );
        assert_eq!(adapter.get_int("server", "default_days", 90), 120);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[classifier]\nwindow = 7\n").unwrap();
        assert_eq!(adapter.get_string("classifier", "mode"), None);
        assert_eq!(adapter.get_string("server", "listen"), None);
        assert_eq!(adapter.get_int("server", "default_days", 90), 90);
        assert_eq!(adapter.get_double("classifier", "high_vol_std_pct", 3.0), 3.0);
    }

    #[test]
    fn non_numeric_values_fall_back() {
        let adapter =
            FileConfigAdapter::from_string("[classifier]\nwindow = five\ngap_threshold_pct = x\n")
                .unwrap();
        assert_eq!(adapter.get_int("classifier", "window", 5), 5);
        assert_eq!(adapter.get_double("classifier", "gap_threshold_pct", 3.0), 3.0);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[screener]\na = yes\nb = OFF\nc = maybe\n").unwrap();
        assert!(adapter.get_bool("screener", "a", false));
        assert!(!adapter.get_bool("screener", "b", true));
        assert!(adapter.get_bool("screener", "c", true));
        assert!(!adapter.get_bool("screener", "missing", false));
    }

    #[test]
    fn get_non_empty_skips_blank_values() {
        let adapter = FileConfigAdapter::from_string("[data]\ncsv_dir =\n").unwrap();
        assert_eq!(adapter.get_non_empty("data", "csv_dir"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\nsource = yahoo\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("yahoo".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/trendlens.ini").unwrap_err();
        assert!(matches!(err, TrendError::ConfigParse { file, .. } if file.contains("trendlens.ini")));
    }
}
