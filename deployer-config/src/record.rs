use std::path::Path;

use alloy::primitives::Address;
use toml_edit::{DocumentMut, TomlError, table, value};

use crate::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Toml(#[from] TomlError),

    #[error("`deployments` is not a table")]
    NotATable,
}

/// Set `[deployments].<contract>` to `addr` in the TOML file at `path`,
/// leaving the rest of the file (comments, ordering) untouched.
pub async fn record_deployment<P: AsRef<Path>>(
    path: P,
    contract: &str,
    addr: Address,
) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let s = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError(path.into(), Box::new(e)))?;
    let s =
        with_deployment(&s, contract, addr).map_err(|e| ConfigError(path.into(), Box::new(e)))?;
    tokio::fs::write(path, s)
        .await
        .map_err(|e| ConfigError(path.into(), Box::new(e)))
}

/// Like [`record_deployment`] but on an in-memory document.
pub fn with_deployment(doc: &str, contract: &str, addr: Address) -> Result<String, RecordError> {
    let mut doc = doc.parse::<DocumentMut>()?;
    let deployments = doc
        .entry("deployments")
        .or_insert(table())
        .as_table_like_mut()
        .ok_or(RecordError::NotATable)?;
    deployments.insert(contract, value(format!("{addr:#x}")));
    Ok(doc.to_string())
}
