use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

pub mod calls;
pub mod peer_id;
pub mod price;

pub use calls::{MarketCall, PopulatedCall};
pub use peer_id::PeerId;

/// On-chain offer identifier, as stored by the market contract.
pub type OfferId = B256;

/// On-chain compute unit identifier.
pub type UnitId = B256;

/// Content digest identifying an effector module a compute unit may use.
pub type EffectorId = B256;

/// A provider's desired offer, resolved from local configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OfferSpec {
    pub name: String,
    /// Absent when the offer was never registered on-chain.
    pub offer_id: Option<OfferId>,
    pub compute_peers: Vec<PeerSpec>,
    /// `None` means "no restriction": effectors already registered on-chain
    /// are left untouched.
    pub effectors: Option<Vec<EffectorId>>,
    pub min_price_per_epoch: U256,
}

/// A desired compute peer together with the compute units it contributes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeerSpec {
    pub peer_id: PeerId,
    pub unit_ids: Vec<UnitId>,
}

/// An offer as currently registered in the market contract.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OnChainOffer {
    pub payment_token: Address,
    pub price_per_epoch: U256,
    pub effectors: Vec<EffectorId>,
    pub peers: Vec<OnChainPeer>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OnChainPeer {
    pub peer_id: PeerId,
    pub unit_ids: Vec<UnitId>,
}
