//! Output artifact: the accumulated records as one pretty-printed JSON array

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default artifact file name for an advertiser
pub fn default_file_name(advertiser: &str) -> PathBuf {
    PathBuf::from(format!("{advertiser}_all_ads.json"))
}

/// Serialize records to the artifact format
///
/// Four-space indentation, UTF-8 text written verbatim, no trailing newline.
/// The output depends only on the input, so serializing the same records
/// twice yields identical bytes.
pub fn to_json_bytes(records: &[Value]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write records to `path`, replacing any existing file
pub async fn write_artifact(path: &Path, records: &[Value]) -> Result<()> {
    let bytes = to_json_bytes(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    tracing::debug!(path = %path.display(), records = records.len(), "artifact written");
    Ok(())
}

/// Read an artifact back; the top level must be an array
pub async fn read_artifact(path: &Path) -> Result<Vec<Value>> {
    let raw = tokio::fs::read(path).await?;
    match serde_json::from_slice::<Value>(&raw)? {
        Value::Array(records) => Ok(records),
        _ => Err(Error::InvalidResponse(format!(
            "{} does not contain a JSON array",
            path.display()
        ))),
    }
}
