//! Helper logic for contract deployment

use alloy::{
    contract::RawCallBuilder,
    network::ReceiptResponse,
    primitives::{Address, TxHash},
    providers::{PendingTransactionError, Provider},
    transports::TransportError,
};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("contract error: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),

    #[error("failed waiting for tx: {0}")]
    Pending(#[from] PendingTransactionError),

    #[error("constructor takes {expected} arguments, got {got}")]
    ArgCount { expected: usize, got: usize },

    #[error("invalid constructor argument {name} ({ty}): {source}")]
    InvalidArg {
        name: String,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },

    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error("deployment tx {0} reverted")]
    Reverted(TxHash),

    #[error("no code at deployed address {0:#x}")]
    NoCode(Address),

    #[error("connected to chain {actual} but expected chain {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Outcome of a mined contract creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

/// Deploy a contract (with logging)
pub async fn deploy<P: Provider>(
    name: &str,
    tx: RawCallBuilder<P>,
) -> Result<Deployment, DeployError> {
    info!("deploying {name}");
    let pending_tx = tx.send().await?;
    let tx_hash = *pending_tx.tx_hash();
    info!(%tx_hash, "waiting for tx to be mined");

    let receipt = pending_tx.get_receipt().await?;
    info!(gas_used = %receipt.gas_used, block = ?receipt.block_number, %tx_hash, "tx mined");
    if !receipt.status() {
        return Err(DeployError::Reverted(tx_hash));
    }
    let addr = receipt
        .contract_address
        .ok_or(alloy::contract::Error::ContractNotDeployed)?;

    info!("deployed {name} at {addr:#x}");
    Ok(Deployment {
        address: addr,
        tx_hash,
        gas_used: receipt.gas_used,
        block_number: receipt.block_number,
    })
}

/// Fail unless there is contract code at `addr`.
pub async fn ensure_code<P: Provider>(provider: &P, addr: Address) -> Result<(), DeployError> {
    if provider.get_code_at(addr).await?.is_empty() {
        return Err(DeployError::NoCode(addr));
    }
    Ok(())
}

/// Query the chain id and compare it against `expected`, if any.
pub async fn check_chain_id<P: Provider>(
    provider: &P,
    expected: Option<u64>,
) -> Result<u64, DeployError> {
    let actual = provider.get_chain_id().await?;
    match expected {
        Some(expected) if expected != actual => {
            Err(DeployError::ChainMismatch { expected, actual })
        }
        _ => Ok(actual),
    }
}
