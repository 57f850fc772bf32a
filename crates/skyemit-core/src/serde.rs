//! JSON and YAML helpers for configuration and map documents.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, SkyError};

fn serde_error(code: &str, err: impl ToString) -> SkyError {
    SkyError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>()
                .into_iter()
                .collect::<Map<_, _>>(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into JSON bytes with sorted object keys.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SkyError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_vec(&canonicalize(value)).map_err(|err| serde_error("json_write", err))
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SkyError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, SkyError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SkyError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}

/// Serializes a document in the format chosen by the extension of `path`.
/// JSON output has sorted keys.
pub fn to_document_bytes<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, SkyError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => to_canonical_json_bytes(value),
        Some("yaml") | Some("yml") => to_yaml_string(value).map(String::into_bytes),
        _ => Err(SkyError::Serde(
            ErrorInfo::new("unknown-format", "document extension is not json or yaml")
                .with_context("path", path.display()),
        )),
    }
}

/// Deserializes a document whose format is chosen by the extension of `path`:
/// `.json` is JSON, `.yaml`/`.yml` is YAML.
pub fn from_document_slice<T: DeserializeOwned>(path: &Path, data: &[u8]) -> Result<T, SkyError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_slice(data),
        Some("yaml") | Some("yml") => from_yaml_slice(data),
        _ => Err(SkyError::Serde(
            ErrorInfo::new("unknown-format", "document extension is not json or yaml")
                .with_context("path", path.display()),
        )),
    }
}
