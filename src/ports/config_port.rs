//! Configuration access port trait.

use crate::domain::error::TrackerError;

/// Typed lookups over `[section] key = value` settings.
///
/// Numeric getters return `default` only when the key is absent or blank; a
/// present value that does not parse is `TrackerError::ConfigInvalid`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TrackerError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TrackerError>;
}
