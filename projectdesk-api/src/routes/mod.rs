/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, current profile
/// - `projects`: Project CRUD
/// - `members`: Project membership management
/// - `tasks`: Project task CRUD, by id or by title

pub mod auth;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field from an explicit `null` in PATCH bodies
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>`: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
