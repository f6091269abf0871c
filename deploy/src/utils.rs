use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{TransactionReceipt, H256, U64},
};

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Awaits `fut`, failing with an error naming `step` once `limit` elapses.
pub async fn with_timeout<T, E, F>(limit: Duration, step: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(anyhow!("{} timed out after {:?}", step, limit)),
    }
}

pub async fn wait_transaction(
    client: Arc<Client>,
    transaction_hash: H256,
    poll_interval: Duration,
) -> Result<TransactionReceipt> {
    loop {
        if let Some(receipt) = client.get_transaction_receipt(transaction_hash).await? {
            return Ok(receipt);
        }
        log::debug!("waiting for receipt of {:?}", transaction_hash);
        tokio::time::sleep(poll_interval).await;
    }
}

pub fn ensure_success(receipt: &TransactionReceipt) -> Result<()> {
    if receipt.status == Some(U64::zero()) {
        bail!("transaction {:?} reverted", receipt.transaction_hash);
    }
    Ok(())
}
