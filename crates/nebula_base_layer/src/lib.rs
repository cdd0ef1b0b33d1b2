use alloy::primitives::{Address, B256};
use async_trait::async_trait;
#[cfg(any(feature = "testing", test))]
use mockall::automock;
use nebula_market_types::{MarketCall, OfferId, OnChainOffer};

pub mod ethereum_market_contract;

pub use ethereum_market_contract::{EthereumMarketConfig, EthereumMarketContract};

pub type MarketClientResult<T> = Result<T, MarketClientError>;

/// Interface to the market contract, as seen by the reconciliation engine.
///
/// Read methods observe current offer state; `sign_batch` signs and
/// broadcasts a list of unsigned calls as one atomic unit.
#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait MarketContract: Send + Sync {
    /// Fetches the observed state of an offer. `None` means the id is not
    /// registered in the market contract.
    async fn get_offer(&self, offer_id: OfferId) -> MarketClientResult<Option<OnChainOffer>>;

    /// The canonical stable-coin address, resolved live from the contract.
    async fn usdc_address(&self) -> MarketClientResult<Address>;

    async fn is_provider_registered(&self) -> MarketClientResult<bool>;

    /// The provider identity used for registration checks and peer ownership.
    fn provider_address(&self) -> Address;

    /// Signs and broadcasts `calls` as one atomic batch. Either the whole
    /// batch lands on-chain or the error surfaces to the caller; no partial
    /// application is possible.
    async fn sign_batch(&self, title: &str, calls: Vec<MarketCall>) -> MarketClientResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum MarketClientError {
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("batch transaction {tx_hash} reverted on-chain")]
    BatchReverted { tx_hash: B256 },
}
