//! Configuration access port trait.

use crate::domain::error::LagtraderError;

/// Typed reads over a sectioned key/value source.
///
/// Absent keys yield the default; present keys that do not parse are
/// `ConfigInvalid`, never silently defaulted.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, LagtraderError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, LagtraderError>;
}
