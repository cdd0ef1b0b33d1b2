use nebula_market_types::{MarketCall, PopulatedCall};
use pretty_assertions::assert_eq;

use crate::populate::OfferCalls;
use crate::report::format_update_plan;
use crate::test_utils::{offer_id, unit_id, OFFER_NAME};

fn described(description: &str) -> PopulatedCall {
    PopulatedCall::described(description, MarketCall::RemoveComputeUnit { unit_id: unit_id(9) })
}

#[test]
fn plan_lists_removals_before_remaining_updates() {
    let offers = vec![OfferCalls {
        offer_name: OFFER_NAME.to_string(),
        offer_id: offer_id(),
        remove_peer_calls: vec![described("drop a unit")],
        calls: vec![described("add a peer")],
    }];

    let plan = format_update_plan(&offers);
    assert!(plan.contains(&format!("Offer \"{OFFER_NAME}\" ({})", offer_id())));
    assert!(plan.contains("- drop a unit"));
    assert!(plan.contains("- add a peer"));

    let removals_at = plan.find("Peer and compute unit removals").unwrap();
    let updates_at = plan.find("Remaining updates").unwrap();
    assert!(removals_at < updates_at);
}

#[test]
fn undescribed_calls_are_omitted() {
    let offers = vec![OfferCalls {
        offer_name: OFFER_NAME.to_string(),
        offer_id: offer_id(),
        remove_peer_calls: vec![],
        calls: vec![
            described("visible"),
            PopulatedCall {
                description: None,
                call: MarketCall::RemoveComputeUnit { unit_id: unit_id(9) },
            },
        ],
    }];

    let plan = format_update_plan(&offers);
    assert_eq!(plan.matches("    - ").count(), 1);
    assert!(plan.contains("- visible"));
}

#[test]
fn offers_absent_from_a_segment_are_not_rendered_in_it() {
    let offers = vec![
        OfferCalls {
            offer_name: "offer-a".to_string(),
            offer_id: offer_id(),
            remove_peer_calls: vec![described("remove from a")],
            calls: vec![],
        },
        OfferCalls {
            offer_name: "offer-b".to_string(),
            offer_id: offer_id(),
            remove_peer_calls: vec![],
            calls: vec![described("update b")],
        },
    ];

    let plan = format_update_plan(&offers);
    let removals_at = plan.find("Peer and compute unit removals").unwrap();
    let updates_at = plan.find("Remaining updates").unwrap();

    let removal_section = &plan[removals_at..updates_at];
    assert!(removal_section.contains("offer-a"));
    assert!(!removal_section.contains("offer-b"));

    let update_section = &plan[updates_at..];
    assert!(update_section.contains("offer-b"));
    assert!(!update_section.contains("offer-a"));
}
