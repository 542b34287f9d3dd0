//! CLI for contract deployment
//!
//! Deploys a compiled contract by name with the first configured signer and
//! prints the deployer account, its balance and the new contract address.
//!
//! # Local test
//! Start `anvil`, compile the contracts (`npx hardhat compile` or `forge build`)
//! and run `cargo run --bin deploy -- --config deploy.toml`.
use std::path::PathBuf;

use alloy::{
    primitives::{B256, utils::format_ether},
    providers::{Provider, WalletProvider},
};
use anyhow::{Context, Result};
use clap::Parser;
use deployer::{Artifact, ContractFactory, deployer::check_chain_id, logging};
use deployer_config::{DeployConfig, WalletConfig, record_deployment};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Clone, Debug, Parser)]
struct Args {
    /// Config file storing `DeployConfig`
    #[clap(short, long, default_value = "./deploy.toml")]
    config: PathBuf,

    /// Contract to deploy, bare or fully qualified (`contracts/Foo.sol:Foo`)
    #[clap(long)]
    contract: Option<String>,

    /// Artifacts directory, relative to the working directory
    #[clap(long)]
    artifacts: Option<PathBuf>,

    /// RPC endpoint of the target chain
    #[clap(long, env = "DEPLOYER_RPC_URL")]
    rpc_url: Option<Url>,

    #[clap(long, env = "DEPLOYER_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    #[clap(long, env = "DEPLOYER_ACCOUNT_INDEX", conflicts_with = "private_key")]
    account_index: Option<u32>,

    #[clap(
        long,
        env = "DEPLOYER_PRIVATE_KEY",
        hide_env_values = true,
        conflicts_with = "mnemonic"
    )]
    private_key: Option<B256>,

    /// Constructor argument, repeat once per parameter
    #[clap(long = "arg")]
    args: Vec<String>,

    /// Do not record the deployed address in the config file
    #[clap(long)]
    no_save: bool,
}

impl Args {
    /// Command line and environment take precedence over the config file.
    fn apply(&self, config: &mut DeployConfig) {
        if let Some(name) = &self.contract {
            config.contract.name = name.clone();
        }
        if let Some(url) = &self.rpc_url {
            config.network.rpc_url = url.clone();
        }
        if !self.args.is_empty() {
            config.contract.args = self.args.clone();
        }

        if let Some(mnemonic) = &self.mnemonic {
            config.wallet = Some(WalletConfig::Mnemonic {
                mnemonic: mnemonic.clone(),
                account_index: self.account_index.unwrap_or_default(),
            });
        } else if let Some(private_key) = self.private_key {
            config.wallet = Some(WalletConfig::PrivateKey { private_key });
        } else if let (Some(idx), Some(WalletConfig::Mnemonic { account_index, .. })) =
            (self.account_index, config.wallet.as_mut())
        {
            *account_index = idx;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    if let Ok(path) = dotenvy::dotenv() {
        debug!(?path, "loaded environment file");
    }
    let args = Args::parse();
    let config_path = &args.config;

    info!("Starting contract deployment with config: {:?}", config_path);

    let mut config = DeployConfig::read(config_path)
        .await
        .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
    args.apply(&mut config);
    let artifacts = match &args.artifacts {
        Some(dir) => dir.clone(),
        None => config.artifacts_dir(config_path),
    };
    info!("Config loaded successfully");

    let wallet = config
        .wallet
        .as_ref()
        .context("No signer configured, set [wallet] or pass --mnemonic/--private-key")?;
    let provider = deployer::connect(wallet, config.network.rpc_url.clone())
        .context("Failed to build signer")?;

    let chain_id = check_chain_id(&provider, config.network.chain_id)
        .await
        .with_context(|| format!("Failed to verify chain at {}", config.network.rpc_url))?;
    info!(%chain_id, url = %config.network.rpc_url, "connected");

    let account = provider.default_signer_address();
    println!("Deploying contracts with the account: {account}");

    let balance = provider
        .get_balance(account)
        .await
        .context("Failed to query account balance")?;
    info!("Account balance: {} ETH", format_ether(balance));
    println!("Account balance: {balance}");

    let name = config.contract.name.as_str();
    let artifact = Artifact::resolve(&artifacts, name)
        .with_context(|| format!("Failed to load contract {name}"))?;
    info!(path = ?artifact.path, "resolved {name}");

    let factory = ContractFactory::new(artifact, &provider);
    let deployment = factory
        .deploy(config.contract.args.as_slice())
        .await
        .with_context(|| format!("Failed to deploy {name}"))?;
    println!("Contract address: {}", deployment.address);

    if args.no_save {
        return Ok(());
    }
    // The contract is on chain at this point, failing now would invite a redeploy.
    match record_deployment(config_path, name, deployment.address).await {
        Ok(()) => info!("Config file updated with {name} address: {:#x}", deployment.address),
        Err(err) => warn!(%err, "Failed to write updated config file: {config_path:?}"),
    }

    Ok(())
}
