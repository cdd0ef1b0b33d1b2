use nebula_market_types::{OfferId, PopulatedCall};

use crate::populate::OfferCalls;

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;

/// Renders the update plan shown before the confirmation prompt.
///
/// The layout mirrors the submission order: the removal segment of every
/// offer comes first, everything else second. An offer contributing nothing
/// to a segment is omitted from it, and only described calls are listed —
/// the plan is the sole audit trail the operator sees before signing.
pub fn format_update_plan(offers: &[OfferCalls]) -> String {
    let mut plan = String::from("The following updates will be submitted as one atomic batch:\n");

    let removals: Vec<&OfferCalls> =
        offers.iter().filter(|offer| !offer.remove_peer_calls.is_empty()).collect();
    if !removals.is_empty() {
        plan.push_str("\nPeer and compute unit removals (submitted first):\n");
        for offer in removals {
            push_offer_section(
                &mut plan,
                &offer.offer_name,
                offer.offer_id,
                &offer.remove_peer_calls,
            );
        }
    }

    let updates: Vec<&OfferCalls> = offers.iter().filter(|offer| !offer.calls.is_empty()).collect();
    if !updates.is_empty() {
        plan.push_str("\nRemaining updates:\n");
        for offer in updates {
            push_offer_section(&mut plan, &offer.offer_name, offer.offer_id, &offer.calls);
        }
    }

    plan
}

fn push_offer_section(plan: &mut String, name: &str, offer_id: OfferId, calls: &[PopulatedCall]) {
    plan.push_str(&format!("  Offer \"{name}\" ({offer_id}):\n"));
    for call in calls {
        if let Some(description) = &call.description {
            plan.push_str(&format!("    - {description}\n"));
        }
    }
}
