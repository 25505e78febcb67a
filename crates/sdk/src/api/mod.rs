//! Typed API surfaces over the shared client.

mod background_checks;
mod people;

pub use background_checks::{BackgroundChecksApi, CheckQuery};
pub use people::PeopleApi;

use flock_core::query::ValidationError;

/// Resource ids are opaque but must be path-safe; anything else is a
/// caller mistake caught before the URL is built.
pub(crate) fn validate_id(key: &'static str, id: &str) -> Result<(), ValidationError> {
    let acceptable = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if acceptable {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            key: key.to_string(),
            value: id.to_string(),
        })
    }
}
