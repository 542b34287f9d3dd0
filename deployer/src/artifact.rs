//! Compiled contract artifacts
//!
//! Artifacts are the JSON files emitted by Hardhat (`artifacts/<source>.sol/<Name>.json`)
//! or Foundry (`out/<source>.sol/<Name>.json`). Both carry the ABI and the creation
//! bytecode, which is all a deployment needs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    json_abi::{ContractObject, JsonAbi},
    primitives::Bytes,
};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("invalid contract name {0:?}")]
    InvalidName(String),

    #[error("artifacts directory {0:?} does not exist, compile the contracts first")]
    MissingDir(PathBuf),

    #[error("no artifact for contract {name} under {dir:?}")]
    NotFound { name: String, dir: PathBuf },

    #[error("contract name {name} is ambiguous, use one of: {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("failed to read {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed artifact {0:?}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("contract {0} has no creation bytecode, is it abstract or an interface?")]
    NoBytecode(String),

    #[error("contract {name} needs to be linked against: {}", .libraries.join(", "))]
    Unlinked {
        name: String,
        libraries: Vec<String>,
    },
}

/// A contract name, either bare (`Token`) or qualified by its source (`contracts/Token.sol:Token`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractName<'a> {
    pub source: Option<&'a str>,
    pub contract: &'a str,
}

impl<'a> ContractName<'a> {
    pub fn parse(s: &'a str) -> Result<Self, ArtifactError> {
        let invalid = || ArtifactError::InvalidName(s.to_string());
        let (source, contract) = match s.rsplit_once(':') {
            Some((source, contract)) if !source.is_empty() => (Some(source), contract),
            Some(_) => return Err(invalid()),
            None => (None, s),
        };
        if contract.is_empty() || contract.contains(['/', '\\', '.']) {
            return Err(invalid());
        }
        Ok(Self { source, contract })
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.contract)
    }

    fn matches(&self, file: &Path) -> bool {
        file.file_name().and_then(|n| n.to_str()) == Some(self.file_name().as_str())
    }

    /// Keep the files whose source directory matches the qualifier, if any.
    ///
    /// Hardhat mirrors the source tree (`artifacts/contracts/A.sol/`), Foundry only
    /// keeps the file name (`out/A.sol/`). The full source path is tried first and
    /// the file name of the source second.
    fn select(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
        let Some(src) = self.source else {
            return files;
        };
        let (exact, rest): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|f| f.parent().is_some_and(|d| d.ends_with(src)));
        if !exact.is_empty() {
            return exact;
        }
        let base = Path::new(src).file_name();
        rest.into_iter()
            .filter(|f| f.parent().and_then(Path::file_name) == base)
            .collect()
    }
}

/// ABI and creation bytecode of a single contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Look up `name` under `dir` and load it.
    pub fn resolve<P: AsRef<Path>>(dir: P, name: &str) -> Result<Self, ArtifactError> {
        let path = find(dir, name)?;
        let contract = ContractName::parse(name)?.contract;
        Self::load(path, contract)
    }

    /// Load the artifact file at `path` for contract `name`.
    pub fn load<P: AsRef<Path>>(path: P, name: &str) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ArtifactError::Io(path.into(), e))?;
        let value: Value =
            serde_json::from_str(&json).map_err(|e| ArtifactError::Json(path.into(), e))?;

        // Placeholders in unlinked bytecode are not valid hex, check before decoding.
        let libraries = link_references(&value);
        if !libraries.is_empty() {
            return Err(ArtifactError::Unlinked {
                name: name.to_string(),
                libraries,
            });
        }

        let object: ContractObject =
            serde_json::from_str(&json).map_err(|e| ArtifactError::Json(path.into(), e))?;
        let bytecode = object
            .bytecode
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ArtifactError::NoBytecode(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            abi: object.abi.unwrap_or_default(),
            bytecode,
        })
    }
}

/// Find the artifact file of contract `name` under `dir`.
///
/// Bare names must be unique across all sources. Qualified names match files
/// whose parent directories end with the given source path or, failing that,
/// with the source file name.
pub fn find<P: AsRef<Path>>(dir: P, name: &str) -> Result<PathBuf, ArtifactError> {
    let dir = dir.as_ref();
    let cname = ContractName::parse(name)?;
    if !dir.is_dir() {
        return Err(ArtifactError::MissingDir(dir.to_path_buf()));
    }

    let mut found = Vec::new();
    walk(dir, &cname, &mut found)?;
    let mut found = cname.select(found);
    found.sort();

    match found.len() {
        0 => Err(ArtifactError::NotFound {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(ArtifactError::Ambiguous {
            name: name.to_string(),
            candidates: found
                .iter()
                .map(|p| qualified_name(dir, p, cname.contract))
                .collect(),
        }),
    }
}

fn walk(
    dir: &Path,
    name: &ContractName<'_>,
    found: &mut Vec<PathBuf>,
) -> Result<(), ArtifactError> {
    let entries = fs::read_dir(dir).map_err(|e| ArtifactError::Io(dir.into(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ArtifactError::Io(dir.into(), e))?;
        let path = entry.path();
        let kind = entry
            .file_type()
            .map_err(|e| ArtifactError::Io(path.clone(), e))?;
        if kind.is_dir() {
            walk(&path, name, found)?;
        } else if name.matches(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn qualified_name(root: &Path, file: &Path, contract: &str) -> String {
    let source = file
        .parent()
        .and_then(|p| p.strip_prefix(root).ok())
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    format!("{source}:{contract}")
}

/// Libraries referenced but not linked, as `source:Library`.
///
/// Hardhat stores these at the top level, Foundry inside the bytecode object.
fn link_references(artifact: &Value) -> Vec<String> {
    let refs = artifact
        .get("linkReferences")
        .or_else(|| artifact.get("bytecode").and_then(|b| b.get("linkReferences")))
        .and_then(Value::as_object);
    let Some(refs) = refs else {
        return Vec::new();
    };
    let mut libs: Vec<String> = refs
        .iter()
        .flat_map(|(source, libs)| {
            libs.as_object()
                .into_iter()
                .flat_map(|m| m.keys())
                .map(move |lib| format!("{source}:{lib}"))
        })
        .collect();
    libs.sort();
    libs
}
