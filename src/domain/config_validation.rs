//! Configuration validation and typed settings.
//!
//! Validates each INI section before the values are turned into typed
//! settings. Missing keys are fine wherever a default exists.

use crate::domain::classifier::{ClassifierConfig, ClassifierMode};
use crate::domain::error::TrendError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataSourceKind;

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_API_DAYS: u32 = 90;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendError> {
    let source = match config.get_string("data", "source") {
        Some(s) => s
            .parse::<DataSourceKind>()
            .map_err(|e| invalid("data", "source", e.to_string()))?,
        None => DataSourceKind::Yahoo,
    };
    if source == DataSourceKind::Csv {
        match config.get_string("data", "csv_dir") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(TrendError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_classifier_config(config: &dyn ConfigPort) -> Result<(), TrendError> {
    if let Some(mode) = config.get_string("classifier", "mode") {
        mode.parse::<ClassifierMode>()
            .map_err(|e| invalid("classifier", "mode", e.to_string()))?;
    }

    let window = parsed_int(config, "classifier", "window")?.unwrap_or(DEFAULT_WINDOW as i64);
    if window < 2 {
        return Err(invalid(
            "classifier",
            "window",
            "window must be at least 2".to_string(),
        ));
    }

    for key in ["gap_threshold_pct", "high_vol_std_pct"] {
        let value = parsed_double(config, "classifier", key)?.unwrap_or(1.0);
        if value <= 0.0 {
            return Err(invalid("classifier", key, format!("{key} must be positive")));
        }
    }

    for key in [
        "consolidation_efficiency_max",
        "trend_efficiency_min",
        "high_fit_r_squared",
    ] {
        let value = parsed_double(config, "classifier", key)?.unwrap_or(0.5);
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(
                "classifier",
                key,
                format!("{key} must be between 0 and 1"),
            ));
        }
    }
    Ok(())
}

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), TrendError> {
    if let Some(url) = config.get_string("screener", "base_url") {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                "screener",
                "base_url",
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    if parsed_int(config, "screener", "timeout_secs")?.unwrap_or(20) <= 0 {
        return Err(invalid(
            "screener",
            "timeout_secs",
            "timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_server_config(config: &dyn ConfigPort) -> Result<(), TrendError> {
    if let Some(listen) = config.get_string("server", "listen") {
        listen
            .trim()
            .parse::<std::net::SocketAddr>()
            .map_err(|_| {
                invalid(
                    "server",
                    "listen",
                    "listen must be an address like 127.0.0.1:8000".to_string(),
                )
            })?;
    }
    if parsed_int(config, "server", "default_days")?.unwrap_or(i64::from(DEFAULT_API_DAYS)) < 1 {
        return Err(invalid(
            "server",
            "default_days",
            "default_days must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Classifier thresholds from `[classifier]`.
///
/// Starts from the preset for `mode_override`, else the configured `mode`,
/// else refined; any threshold key present in the file replaces the preset
/// value.
pub fn build_classifier_config(
    config: &dyn ConfigPort,
    mode_override: Option<ClassifierMode>,
) -> Result<ClassifierConfig, TrendError> {
    validate_classifier_config(config)?;
    let mode = match mode_override {
        Some(m) => m,
        None => config
            .get_non_empty("classifier", "mode")
            .map(|s| s.parse::<ClassifierMode>())
            .transpose()?
            .unwrap_or(ClassifierMode::Refined),
    };
    let preset = ClassifierConfig::for_mode(mode);
    Ok(ClassifierConfig {
        gap_threshold_pct: config.get_double(
            "classifier",
            "gap_threshold_pct",
            preset.gap_threshold_pct,
        ),
        consolidation_efficiency_max: config.get_double(
            "classifier",
            "consolidation_efficiency_max",
            preset.consolidation_efficiency_max,
        ),
        trend_efficiency_min: config.get_double(
            "classifier",
            "trend_efficiency_min",
            preset.trend_efficiency_min,
        ),
        high_fit_r_squared: config.get_double(
            "classifier",
            "high_fit_r_squared",
            preset.high_fit_r_squared,
        ),
        high_vol_std_pct: config.get_double(
            "classifier",
            "high_vol_std_pct",
            preset.high_vol_std_pct,
        ),
        ..preset
    })
}

/// Window length from `[classifier] window`.
pub fn configured_window(config: &dyn ConfigPort) -> usize {
    usize::try_from(config.get_int("classifier", "window", DEFAULT_WINDOW as i64))
        .unwrap_or(DEFAULT_WINDOW)
}

/// Default lookback for `/api/daily` from `[server] default_days`.
pub fn configured_api_days(config: &dyn ConfigPort) -> u32 {
    u32::try_from(config.get_int("server", "default_days", i64::from(DEFAULT_API_DAYS)))
        .ok()
        .filter(|d| *d >= 1)
        .unwrap_or(DEFAULT_API_DAYS)
}

/// Integer at `[section] key`; a value that does not parse is an error
/// rather than a silent default.
fn parsed_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, TrendError> {
    config
        .get_non_empty(section, key)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| invalid(section, key, format!("'{raw}' is not an integer")))
        })
        .transpose()
}

fn parsed_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, TrendError> {
    config
        .get_non_empty(section, key)
        .map(|raw| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(section, key, format!("'{raw}' is not a number")))
        })
        .transpose()
}

fn invalid(section: &str, key: &str, reason: String) -> TrendError {
    TrendError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
