use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// Read a JSON document, treating a missing file as `None`.
pub(crate) fn read_json_optional<T: DeserializeOwned>(
    path: &Path,
    code: &str,
    what: &str,
) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| {
        AppError::new(code, format!("Failed to read {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        AppError::new(code, format!("Failed to decode {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

/// Rewrite a JSON document wholesale (tmp -> rename), so readers never observe a partial file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    code: &str,
    what: &str,
) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(code, format!("Failed to create directory for {what}"))
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new(code, format!("Failed to encode {what}")).with_details(e.to_string())
    })?;
    fs::write(&tmp, json.as_bytes()).map_err(|e| {
        AppError::new(code, format!("Failed to write {what}"))
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new(code, format!("Failed to finalize {what} write"))
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })?;
    Ok(())
}
