use core::fmt;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::{Address, B256};
use bon::Builder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, read_toml, write_toml};

/// Contract deployed when none is named.
pub const DEFAULT_CONTRACT: &str = "ERC1155BUILDER";

/// Contents of a `deploy.toml` file.
///
/// See `deploy.example.toml` at the repository root for a commented example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct DeployConfig {
    /// Account used to sign the deployment. May be supplied out of band instead.
    pub wallet: Option<WalletConfig>,
    pub network: NetworkConfig,
    #[serde(default)]
    #[builder(default)]
    pub contract: ContractConfig,
    /// Addresses of past deployments, keyed by contract name.
    #[serde(default)]
    #[builder(default)]
    pub deployments: BTreeMap<String, Address>,
}

/// Signing account. Exactly one of `mnemonic` or `private-key` must be given.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWallet", into = "RawWallet")]
pub enum WalletConfig {
    Mnemonic { mnemonic: String, account_index: u32 },
    PrivateKey { private_key: B256 },
}

/// On-disk shape of `[wallet]`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawWallet {
    #[serde(skip_serializing_if = "Option::is_none")]
    mnemonic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<B256>,
}

impl TryFrom<RawWallet> for WalletConfig {
    type Error = &'static str;

    fn try_from(w: RawWallet) -> Result<Self, Self::Error> {
        match (w.mnemonic, w.account_index, w.private_key) {
            (Some(mnemonic), idx, None) => Ok(Self::Mnemonic {
                mnemonic,
                account_index: idx.unwrap_or_default(),
            }),
            (None, None, Some(private_key)) => Ok(Self::PrivateKey { private_key }),
            (None, Some(_), Some(_)) => Err("`account-index` requires `mnemonic`"),
            (Some(_), _, Some(_)) => Err("`mnemonic` and `private-key` are mutually exclusive"),
            (None, _, None) => Err("wallet needs either `mnemonic` or `private-key`"),
        }
    }
}

impl From<WalletConfig> for RawWallet {
    fn from(w: WalletConfig) -> Self {
        match w {
            WalletConfig::Mnemonic {
                mnemonic,
                account_index,
            } => Self {
                mnemonic: Some(mnemonic),
                account_index: Some(account_index),
                private_key: None,
            },
            WalletConfig::PrivateKey { private_key } => Self {
                mnemonic: None,
                account_index: None,
                private_key: Some(private_key),
            },
        }
    }
}

// Keep secrets out of logs and error messages.
impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic { account_index, .. } => f
                .debug_struct("Mnemonic")
                .field("mnemonic", &"<redacted>")
                .field("account_index", account_index)
                .finish(),
            Self::PrivateKey { .. } => f
                .debug_struct("PrivateKey")
                .field("private_key", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of the target chain.
    pub rpc_url: Url,
    /// Expected chain id. Deployment is refused if the node reports another one.
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case", default)]
pub struct ContractConfig {
    /// Contract name, either bare (`Token`) or fully qualified (`contracts/Token.sol:Token`).
    #[builder(default = DEFAULT_CONTRACT.to_string(), into)]
    pub name: String,
    /// Directory holding compiled artifacts, relative to the config file.
    #[builder(default = PathBuf::from("artifacts"), into)]
    pub artifacts: PathBuf,
    /// Constructor arguments, parsed against the constructor's ABI.
    #[builder(default)]
    pub args: Vec<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DeployConfig {
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_toml(path).await
    }

    /// Overwrite `path` with this config. Comments in an existing file are lost,
    /// use [`crate::record_deployment`] to only update the deployments table.
    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        write_toml(self, path).await
    }

    /// Resolve the artifacts directory against the directory of the config file.
    pub fn artifacts_dir<P: AsRef<Path>>(&self, config_path: P) -> PathBuf {
        let dir = &self.contract.artifacts;
        if dir.is_absolute() {
            return dir.clone();
        }
        match config_path.as_ref().parent() {
            Some(base) => base.join(dir),
            None => dir.clone(),
        }
    }

    pub fn deployment(&self, contract: &str) -> Option<Address> {
        self.deployments.get(contract).copied()
    }
}

impl FromStr for DeployConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| ConfigError(PathBuf::new(), Box::new(e)))
    }
}

impl fmt::Display for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = toml::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}
