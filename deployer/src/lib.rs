//! Contract artifact resolution, deployment and provider helpers.
//!
//! This crate backs the `deploy` binary: it resolves a compiled contract by
//! name, deploys it with a configured signer and reports the outcome.

use alloy::providers::ProviderBuilder;
use anyhow::Result;
use deployer_config::WalletConfig;
use url::Url;

pub mod artifact;
pub mod deployer;
pub mod factory;
pub mod logging;
pub mod provider;

pub use artifact::{Artifact, ArtifactError};
pub use deployer::{DeployError, Deployment};
pub use factory::ContractFactory;
use provider::{HttpProviderWithWallet, TestProviderWithWallet, build_provider, wallet_signer};

/// Connect to a real blockchain with the signer described by `wallet`.
pub fn connect(wallet: &WalletConfig, chain: Url) -> Result<HttpProviderWithWallet> {
    let signer = wallet_signer(wallet)?;
    Ok(build_provider(signer, chain))
}

/// Spawn a local test chain with funded dev accounts, signing with the first one.
pub fn init_test_chain() -> TestProviderWithWallet {
    // this provider wraps both the test chain instance (exit on drop), and the wallet provider
    ProviderBuilder::new().connect_anvil_with_wallet()
}
