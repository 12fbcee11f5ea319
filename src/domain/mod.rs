//! Core domain types and logic.

pub mod bar;
pub mod series;
pub mod stats;
pub mod classifier;
pub mod quote;
pub mod momentum;
pub mod resample;
pub mod screen;
pub mod report;
pub mod ticker;
pub mod config_validation;
pub mod error;
