use std::collections::HashSet;

use alloy_primitives::{Address, U256};
use futures::future::join_all;
use nebula_base_layer::{MarketClientResult, MarketContract};
use nebula_market_types::price::format_price;
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
use tracing::warn;

#[cfg(test)]
#[path = "diff_tests.rs"]
mod diff_tests;

/// A desired offer paired with its observed on-chain state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfferSnapshot {
    pub spec: OfferSpec,
    pub offer_id: OfferId,
    pub observed: OnChainOffer,
}

/// Every category of difference between an offer's desired and observed
/// state. An empty category means "already converged" for that category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfferDiff {
    pub peers_to_add: Vec<PeerSpec>,
    pub peers_to_remove: Vec<OnChainPeer>,
    pub effectors_to_add: Vec<EffectorId>,
    pub effectors_to_remove: Vec<EffectorId>,
    /// Kept peers whose desired unit count shrank, with the observed unit
    /// ids to drop.
    pub units_to_remove: Vec<PeerUnitsDelta>,
    /// Kept peers whose desired unit count grew, with the desired unit ids
    /// to register.
    pub units_to_add: Vec<PeerUnitsDelta>,
    pub new_payment_token: Option<Address>,
    pub new_price: Option<U256>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerUnitsDelta {
    pub peer_id: PeerId,
    pub unit_ids: Vec<UnitId>,
}

impl OfferDiff {
    pub fn is_empty(&self) -> bool {
        self.peers_to_add.is_empty()
            && self.peers_to_remove.is_empty()
            && self.effectors_to_add.is_empty()
            && self.effectors_to_remove.is_empty()
            && self.units_to_remove.is_empty()
            && self.units_to_add.is_empty()
            && self.new_payment_token.is_none()
            && self.new_price.is_none()
    }
}

/// Pairs desired offers with their on-chain state, dropping the ones that
/// cannot be reconciled yet: offers with no id and ids unknown to the market
/// contract are skipped with a warning, the rest of the run proceeds.
///
/// Lookups for distinct offers are independent reads and are issued
/// concurrently. RPC failures are fatal and abort the whole run; only ids the
/// contract does not know count as missing.
pub async fn filter_offers_found_on_chain<C: MarketContract>(
    chain: &C,
    desired: Vec<OfferSpec>,
) -> MarketClientResult<Vec<OfferSnapshot>> {
    let mut with_ids = Vec::new();
    for spec in desired {
        match spec.offer_id {
            Some(offer_id) => with_ids.push((spec, offer_id)),
            None => warn!(
                "Offer \"{}\" has no on-chain id; it must be created before it can be updated. \
                 Skipping",
                spec.name
            ),
        }
    }

    let lookups = join_all(with_ids.into_iter().map(|(spec, offer_id)| async move {
        let observed = chain.get_offer(offer_id).await;
        (spec, offer_id, observed)
    }))
    .await;

    let mut outcomes = Vec::with_capacity(lookups.len());
    for (spec, offer_id, observed) in lookups {
        outcomes.push(match observed? {
            Some(observed) => Ok(OfferSnapshot { spec, offer_id, observed }),
            None => Err((spec.name, offer_id)),
        });
    }

    let (snapshots, missing) = partition_results(outcomes);
    for (name, offer_id) in missing {
        warn!("Offer \"{name}\" ({offer_id}) was not found on-chain; skipping");
    }
    Ok(snapshots)
}

/// Computes every difference category for one offer. Pure: the same inputs
/// always produce the same diff, and equal desired/observed state produces an
/// empty one.
pub fn diff_offer(spec: &OfferSpec, observed: &OnChainOffer, usdc: Address) -> OfferDiff {
    let desired_ids: HashSet<PeerId> = spec.compute_peers.iter().map(|peer| peer.peer_id).collect();
    let observed_ids: HashSet<PeerId> = observed.peers.iter().map(|peer| peer.peer_id).collect();

    let peers_to_add = spec
        .compute_peers
        .iter()
        .filter(|peer| !observed_ids.contains(&peer.peer_id))
        .cloned()
        .collect();
    let peers_to_remove = observed
        .peers
        .iter()
        .filter(|peer| !desired_ids.contains(&peer.peer_id))
        .cloned()
        .collect();

    let mut units_to_remove = Vec::new();
    let mut units_to_add = Vec::new();
    for desired_peer in &spec.compute_peers {
        let Some(observed_peer) =
            observed.peers.iter().find(|peer| peer.peer_id == desired_peer.peer_id)
        else {
            continue;
        };
        let desired_count = desired_peer.unit_ids.len();
        let observed_count = observed_peer.unit_ids.len();
        if desired_count < observed_count {
            units_to_remove.push(PeerUnitsDelta {
                peer_id: desired_peer.peer_id,
                unit_ids: tail_slice(&observed_peer.unit_ids, observed_count - desired_count)
                    .to_vec(),
            });
        } else if desired_count > observed_count {
            units_to_add.push(PeerUnitsDelta {
                peer_id: desired_peer.peer_id,
                unit_ids: tail_slice(&desired_peer.unit_ids, desired_count - observed_count)
                    .to_vec(),
            });
        }
    }

    let (effectors_to_add, effectors_to_remove) = match &spec.effectors {
        // Unset effectors mean "no restriction": nothing is added and, more
        // importantly, nothing currently registered is removed.
        None => (Vec::new(), Vec::new()),
        Some(desired) => {
            let desired_set: HashSet<EffectorId> = desired.iter().copied().collect();
            let observed_set: HashSet<EffectorId> = observed.effectors.iter().copied().collect();
            (
                desired.iter().filter(|id| !observed_set.contains(*id)).copied().collect(),
                observed
                    .effectors
                    .iter()
                    .filter(|id| !desired_set.contains(*id))
                    .copied()
                    .collect(),
            )
        }
    };

    let new_payment_token = (observed.payment_token != usdc).then_some(usdc);
    let new_price = (format_price(spec.min_price_per_epoch)
        != format_price(observed.price_per_epoch))
    .then_some(spec.min_price_per_epoch);

    OfferDiff {
        peers_to_add,
        peers_to_remove,
        effectors_to_add,
        effectors_to_remove,
        units_to_remove,
        units_to_add,
        new_payment_token,
        new_price,
    }
}

/// The last `count` elements of `items`.
///
/// Unit-count reconciliation always trims or grows from the tail: when the
/// desired count shrinks, the last observed units go away; when it grows, the
/// last desired units are registered.
pub fn tail_slice<T>(items: &[T], count: usize) -> &[T] {
    &items[items.len().saturating_sub(count)..]
}

/// Splits per-offer lookup results into successes and failures.
pub fn partition_results<T, E>(
    results: impl IntoIterator<Item = Result<T, E>>,
) -> (Vec<T>, Vec<E>) {
    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(error) => failures.push(error),
        }
    }
    (successes, failures)
}
