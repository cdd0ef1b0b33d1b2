use alloy_primitives::Address;
use async_trait::async_trait;
#[cfg(any(feature = "testing", test))]
use mockall::automock;
use nebula_base_layer::MarketClientError;
use thiserror::Error;

pub mod diff;
pub mod executor;
pub mod populate;
pub mod report;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;

pub use executor::{OfferReconciler, UpdateOptions, UpdateOutcome};

pub type OfferUpdateResult<T> = Result<T, OfferUpdateError>;

/// Interactive yes/no confirmation shown before a batch is submitted.
///
/// Threaded in explicitly so the executor stays testable without a terminal.
/// Implementations degrade to the default answer when no interactive session
/// is attached.
#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, message: &str, default_yes: bool) -> bool;
}

#[derive(Debug, Error)]
pub enum OfferUpdateError {
    #[error(transparent)]
    Chain(#[from] MarketClientError),
    #[error(
        "provider {0} is not registered in the market contract; register it before updating offers"
    )]
    ProviderNotRegistered(Address),
}
