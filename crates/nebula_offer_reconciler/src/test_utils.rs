use alloy_primitives::{Address, B256, U256};
use nebula_market_types::{
    EffectorId,
    OfferId,
    OfferSpec,
    OnChainOffer,
    OnChainPeer,
    PeerId,
    PeerSpec,
    UnitId,
};

pub const OFFER_NAME: &str = "testnet-offer";

pub fn offer_id() -> OfferId {
    B256::repeat_byte(0xf0)
}

pub fn usdc() -> Address {
    Address::repeat_byte(0xcc)
}

pub fn peer_id(tag: u8) -> PeerId {
    PeerId::new(B256::repeat_byte(tag))
}

pub fn unit_id(tag: u8) -> UnitId {
    B256::repeat_byte(tag)
}

pub fn effector(tag: u8) -> EffectorId {
    B256::repeat_byte(tag)
}

pub fn peer_spec(tag: u8, unit_tags: &[u8]) -> PeerSpec {
    PeerSpec { peer_id: peer_id(tag), unit_ids: unit_tags.iter().copied().map(unit_id).collect() }
}

pub fn on_chain_peer(tag: u8, unit_tags: &[u8]) -> OnChainPeer {
    OnChainPeer {
        peer_id: peer_id(tag),
        unit_ids: unit_tags.iter().copied().map(unit_id).collect(),
    }
}

/// A desired offer whose scalar fields match [`observed_offer`], so tests
/// only see the deltas they construct explicitly.
pub fn offer_spec(peers: Vec<PeerSpec>) -> OfferSpec {
    OfferSpec {
        name: OFFER_NAME.to_string(),
        offer_id: Some(offer_id()),
        compute_peers: peers,
        effectors: None,
        min_price_per_epoch: U256::from(500_000_u64),
    }
}

pub fn observed_offer(peers: Vec<OnChainPeer>) -> OnChainOffer {
    OnChainOffer {
        payment_token: usdc(),
        price_per_epoch: U256::from(500_000_u64),
        effectors: Vec::new(),
        peers,
    }
}
