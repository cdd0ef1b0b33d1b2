use itertools::Itertools;
use nebula_market_types::price::format_price;
use nebula_market_types::{MarketCall, OfferId, PopulatedCall};

use crate::diff::OfferDiff;

#[cfg(test)]
#[path = "populate_tests.rs"]
mod populate_tests;

/// The populated calls for one offer, split into the two submission groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfferCalls {
    pub offer_name: String,
    pub offer_id: OfferId,
    /// Peer and compute unit removals. Submitted before every other call
    /// across all offers in the batch.
    pub remove_peer_calls: Vec<PopulatedCall>,
    /// Everything else, in plan order.
    pub calls: Vec<PopulatedCall>,
}

impl OfferCalls {
    pub fn is_empty(&self) -> bool {
        self.remove_peer_calls.is_empty() && self.calls.is_empty()
    }
}

/// Turns a diff into ordered unsigned calls plus their plan narration.
pub fn populate_offer_calls(offer_name: &str, offer_id: OfferId, diff: &OfferDiff) -> OfferCalls {
    let mut remove_peer_calls = Vec::new();
    for peer in &diff.peers_to_remove {
        for (position, unit_id) in peer.unit_ids.iter().enumerate() {
            let description = if position == 0 {
                format!(
                    "Remove {} compute unit(s) [{}] from peer {}",
                    peer.unit_ids.len(),
                    peer.unit_ids.iter().join(", "),
                    peer.peer_id,
                )
            } else {
                unit_id.to_string()
            };
            remove_peer_calls.push(PopulatedCall::described(
                description,
                MarketCall::RemoveComputeUnit { unit_id: *unit_id },
            ));
        }
        // Units first: the contract refuses to drop a peer that still has
        // registered compute units.
        remove_peer_calls.push(PopulatedCall::described(
            format!("Remove compute peer {}", peer.peer_id),
            MarketCall::RemoveComputePeer { offer_id, peer_id: peer.peer_id },
        ));
    }

    let mut calls = Vec::new();
    if !diff.peers_to_add.is_empty() {
        let summary = diff
            .peers_to_add
            .iter()
            .map(|peer| format!("{} ({} unit(s))", peer.peer_id, peer.unit_ids.len()))
            .join(", ");
        calls.push(PopulatedCall::described(
            format!("Add compute peers: {summary}"),
            MarketCall::AddComputePeers { offer_id, peers: diff.peers_to_add.clone() },
        ));
    }
    if !diff.effectors_to_remove.is_empty() {
        calls.push(PopulatedCall::described(
            format!("Remove effectors: {}", diff.effectors_to_remove.iter().join(", ")),
            MarketCall::RemoveEffectors {
                offer_id,
                effectors: diff.effectors_to_remove.clone(),
            },
        ));
    }
    if !diff.effectors_to_add.is_empty() {
        calls.push(PopulatedCall::described(
            format!("Add effectors: {}", diff.effectors_to_add.iter().join(", ")),
            MarketCall::AddEffectors { offer_id, effectors: diff.effectors_to_add.clone() },
        ));
    }
    for delta in &diff.units_to_remove {
        for (position, unit_id) in delta.unit_ids.iter().enumerate() {
            let description = if position == 0 {
                format!(
                    "Remove {} compute unit(s) [{}] from peer {}",
                    delta.unit_ids.len(),
                    delta.unit_ids.iter().join(", "),
                    delta.peer_id,
                )
            } else {
                unit_id.to_string()
            };
            calls.push(PopulatedCall::described(
                description,
                MarketCall::RemoveComputeUnit { unit_id: *unit_id },
            ));
        }
    }
    for delta in &diff.units_to_add {
        calls.push(PopulatedCall::described(
            format!(
                "Add {} compute unit(s) [{}] to peer {}",
                delta.unit_ids.len(),
                delta.unit_ids.iter().join(", "),
                delta.peer_id,
            ),
            MarketCall::AddComputeUnits {
                offer_id,
                peer_id: delta.peer_id,
                unit_ids: delta.unit_ids.clone(),
            },
        ));
    }
    if let Some(new_token) = diff.new_payment_token {
        calls.push(PopulatedCall::described(
            format!("Change payment token to {new_token}"),
            MarketCall::ChangePaymentToken { offer_id, new_token },
        ));
    }
    if let Some(new_price) = diff.new_price {
        calls.push(PopulatedCall::described(
            format!("Change minimum price per epoch to {}", format_price(new_price)),
            MarketCall::ChangeMinPricePerEpoch { offer_id, new_price },
        ));
    }

    OfferCalls { offer_name: offer_name.to_string(), offer_id, remove_peer_calls, calls }
}
