//! JSON snapshot helpers.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::kv::KeyValueStore;

/// Loads and decodes the JSON snapshot stored under `key`.
///
/// Returns `Ok(None)` when the key is absent.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the snapshot is not
/// valid JSON for `T`.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let value =
        serde_json::from_str(&raw).with_context(|| format!("failed to decode snapshot {key}"))?;
    Ok(Some(value))
}

/// Encodes `value` as JSON and stores it under `key` (full rewrite).
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw =
        serde_json::to_string(value).with_context(|| format!("failed to encode snapshot {key}"))?;
    store.set(key, &raw)
}
