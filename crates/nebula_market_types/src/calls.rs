use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{EffectorId, OfferId, PeerId, PeerSpec, UnitId};

/// A single unsigned market-contract mutation.
///
/// Constructed by the reconciliation engine and ABI-encoded by the chain
/// client at submission time. Calls carry no identity beyond their position
/// in the batch; their ordering is a correctness invariant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MarketCall {
    AddComputePeers {
        offer_id: OfferId,
        peers: Vec<PeerSpec>,
    },
    RemoveComputePeer {
        offer_id: OfferId,
        peer_id: PeerId,
    },
    AddComputeUnits {
        offer_id: OfferId,
        peer_id: PeerId,
        unit_ids: Vec<UnitId>,
    },
    RemoveComputeUnit {
        unit_id: UnitId,
    },
    AddEffectors {
        offer_id: OfferId,
        effectors: Vec<EffectorId>,
    },
    RemoveEffectors {
        offer_id: OfferId,
        effectors: Vec<EffectorId>,
    },
    ChangePaymentToken {
        offer_id: OfferId,
        new_token: Address,
    },
    ChangeMinPricePerEpoch {
        offer_id: OfferId,
        new_price: U256,
    },
}

/// A populated call plus the narration shown in the confirmation plan.
///
/// `description` is present on the first call of a logical group and on
/// standalone calls; follow-up calls of the same group carry only a terse
/// annotation so the plan does not repeat itself.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PopulatedCall {
    pub description: Option<String>,
    pub call: MarketCall,
}

impl PopulatedCall {
    pub fn described(description: impl Into<String>, call: MarketCall) -> Self {
        Self { description: Some(description.into()), call }
    }
}
