use alloy_primitives::{Address, U256};
use pretty_assertions::assert_eq;

use crate::diff::{OfferDiff, PeerUnitsDelta};
use crate::populate::populate_offer_calls;
use crate::test_utils::{effector, offer_id, on_chain_peer, peer_id, peer_spec, unit_id, OFFER_NAME};
use nebula_market_types::MarketCall;

fn variant(call: &MarketCall) -> &'static str {
    match call {
        MarketCall::AddComputePeers { .. } => "add_peers",
        MarketCall::RemoveComputePeer { .. } => "remove_peer",
        MarketCall::AddComputeUnits { .. } => "add_units",
        MarketCall::RemoveComputeUnit { .. } => "remove_unit",
        MarketCall::AddEffectors { .. } => "add_effectors",
        MarketCall::RemoveEffectors { .. } => "remove_effectors",
        MarketCall::ChangePaymentToken { .. } => "change_payment_token",
        MarketCall::ChangeMinPricePerEpoch { .. } => "change_min_price",
    }
}

#[test]
fn empty_diff_populates_nothing() {
    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &OfferDiff::default());
    assert!(populated.is_empty());
    assert_eq!(populated.remove_peer_calls, vec![]);
    assert_eq!(populated.calls, vec![]);
}

#[test]
fn removed_peer_units_come_before_the_peer_itself() {
    let diff =
        OfferDiff { peers_to_remove: vec![on_chain_peer(1, &[10, 11])], ..Default::default() };

    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &diff);
    assert_eq!(populated.calls, vec![]);
    assert_eq!(
        populated.remove_peer_calls.iter().map(|call| variant(&call.call)).collect::<Vec<_>>(),
        vec!["remove_unit", "remove_unit", "remove_peer"],
    );
    assert_eq!(
        populated.remove_peer_calls[0].call,
        MarketCall::RemoveComputeUnit { unit_id: unit_id(10) },
    );
    assert_eq!(
        populated.remove_peer_calls[1].call,
        MarketCall::RemoveComputeUnit { unit_id: unit_id(11) },
    );
    assert_eq!(
        populated.remove_peer_calls[2].call,
        MarketCall::RemoveComputePeer { offer_id: offer_id(), peer_id: peer_id(1) },
    );
}

#[test]
fn removal_group_narration_is_terse_after_the_first_call() {
    let diff =
        OfferDiff { peers_to_remove: vec![on_chain_peer(1, &[10, 11])], ..Default::default() };

    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &diff);
    let first = populated.remove_peer_calls[0].description.as_deref().unwrap();
    assert!(first.contains(&peer_id(1).to_base58()));
    assert!(first.contains(&unit_id(10).to_string()));
    assert!(first.contains(&unit_id(11).to_string()));

    assert_eq!(
        populated.remove_peer_calls[1].description.as_deref(),
        Some(unit_id(11).to_string().as_str()),
    );
    assert_eq!(
        populated.remove_peer_calls[2].description.as_deref(),
        Some(format!("Remove compute peer {}", peer_id(1)).as_str()),
    );
}

#[test]
fn calls_follow_the_assembly_order() {
    let diff = OfferDiff {
        peers_to_add: vec![peer_spec(2, &[20])],
        peers_to_remove: vec![],
        effectors_to_add: vec![effector(31)],
        effectors_to_remove: vec![effector(30)],
        units_to_remove: vec![PeerUnitsDelta { peer_id: peer_id(1), unit_ids: vec![unit_id(12)] }],
        units_to_add: vec![PeerUnitsDelta { peer_id: peer_id(4), unit_ids: vec![unit_id(13)] }],
        new_payment_token: Some(Address::repeat_byte(0xcc)),
        new_price: Some(U256::from(500_000_u64)),
    };

    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &diff);
    assert_eq!(populated.remove_peer_calls, vec![]);
    assert_eq!(
        populated.calls.iter().map(|call| variant(&call.call)).collect::<Vec<_>>(),
        vec![
            "add_peers",
            "remove_effectors",
            "add_effectors",
            "remove_unit",
            "add_units",
            "change_payment_token",
            "change_min_price",
        ],
    );
}

#[test]
fn every_trimmed_unit_gets_its_own_call() {
    let diff = OfferDiff {
        units_to_remove: vec![PeerUnitsDelta {
            peer_id: peer_id(1),
            unit_ids: vec![unit_id(10), unit_id(11), unit_id(12)],
        }],
        ..Default::default()
    };

    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &diff);
    assert_eq!(
        populated.calls.iter().map(|call| call.call.clone()).collect::<Vec<_>>(),
        vec![
            MarketCall::RemoveComputeUnit { unit_id: unit_id(10) },
            MarketCall::RemoveComputeUnit { unit_id: unit_id(11) },
            MarketCall::RemoveComputeUnit { unit_id: unit_id(12) },
        ],
    );
    assert!(populated.calls[0].description.as_deref().unwrap().contains("3 compute unit(s)"));
}

#[test]
fn grown_peer_units_are_registered_in_one_call() {
    let diff = OfferDiff {
        units_to_add: vec![PeerUnitsDelta {
            peer_id: peer_id(1),
            unit_ids: vec![unit_id(10), unit_id(11)],
        }],
        ..Default::default()
    };

    let populated = populate_offer_calls(OFFER_NAME, offer_id(), &diff);
    assert_eq!(
        populated.calls,
        vec![nebula_market_types::PopulatedCall::described(
            format!(
                "Add 2 compute unit(s) [{}, {}] to peer {}",
                unit_id(10),
                unit_id(11),
                peer_id(1),
            ),
            MarketCall::AddComputeUnits {
                offer_id: offer_id(),
                peer_id: peer_id(1),
                unit_ids: vec![unit_id(10), unit_id(11)],
            },
        )],
    );
}
