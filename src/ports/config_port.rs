//! Configuration access port.
//!
//! Values are addressed by INI section and key. Numeric getters fall back
//! to the supplied default when a key is missing or unparseable; callers
//! run `domain::config_validation` first when bad values must be reported.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Non-empty trimmed string value, if any.
    fn get_non_empty(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Config with every key missing; each getter returns its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyConfig;

impl ConfigPort for EmptyConfig {
    fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
        None
    }

    fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
        default
    }

    fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
        default
    }

    fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
        default
    }
}
