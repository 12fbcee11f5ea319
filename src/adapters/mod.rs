//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report;
pub mod screener_client;
#[cfg(feature = "web")]
pub mod web;
pub mod yahoo_adapter;
