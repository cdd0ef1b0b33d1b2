use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::Address;
use nebula_market_types::price::{parse_price, PriceParseError};
use nebula_market_types::{EffectorId, OfferId, OfferSpec, PeerId, PeerSpec, UnitId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;
use validator::Validate;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

/// Provider-side configuration: the chain endpoint plus the desired state of
/// every published offer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct ProviderConfig {
    pub node_url: Url,
    pub market_contract_address: Address,
    #[validate(length(min = 1), nested)]
    pub offers: Vec<OfferConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct OfferConfig {
    #[validate(length(min = 1))]
    pub name: String,
    /// Written by the offer creation flow; absent until then.
    pub offer_id: Option<OfferId>,
    /// Decimal USDC amount, e.g. "0.5".
    pub min_price_per_epoch: String,
    /// Omit to leave on-chain effectors untouched.
    pub effectors: Option<Vec<EffectorId>>,
    #[validate(length(min = 1), nested)]
    pub compute_peers: Vec<ComputePeerConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct ComputePeerConfig {
    pub peer_id: PeerId,
    #[validate(length(min = 1))]
    pub unit_ids: Vec<UnitId>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse provider config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] validator::ValidationErrors),
    #[error("offer \"{0}\" is declared more than once")]
    DuplicateOffer(String),
    #[error("offer \"{offer}\" lists peer {peer} more than once")]
    DuplicatePeer { offer: String, peer: PeerId },
    #[error("offer \"{offer}\" has an invalid price: {source}")]
    InvalidPrice { offer: String, source: PriceParseError },
}

pub fn load_provider_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
    let config: ProviderConfig = toml::from_str(&raw)?;
    config.validate()?;

    let mut seen_offers = HashSet::new();
    for offer in &config.offers {
        if !seen_offers.insert(offer.name.as_str()) {
            return Err(ConfigError::DuplicateOffer(offer.name.clone()));
        }
        let mut seen_peers = HashSet::new();
        for peer in &offer.compute_peers {
            if !seen_peers.insert(peer.peer_id) {
                return Err(ConfigError::DuplicatePeer {
                    offer: offer.name.clone(),
                    peer: peer.peer_id,
                });
            }
        }
    }
    Ok(config)
}

/// Resolves the desired offers selected on the command line. An empty
/// selection means every configured offer; unknown names are warned about and
/// ignored.
pub fn resolve_offers(
    config: &ProviderConfig,
    selection: &[String],
) -> Result<Vec<OfferSpec>, ConfigError> {
    for name in selection {
        if !config.offers.iter().any(|offer| &offer.name == name) {
            warn!("Offer \"{name}\" is not present in the provider config; ignoring");
        }
    }

    config
        .offers
        .iter()
        .filter(|offer| selection.is_empty() || selection.contains(&offer.name))
        .map(|offer| {
            let min_price_per_epoch = parse_price(&offer.min_price_per_epoch)
                .map_err(|source| ConfigError::InvalidPrice {
                    offer: offer.name.clone(),
                    source,
                })?;
            Ok(OfferSpec {
                name: offer.name.clone(),
                offer_id: offer.offer_id,
                compute_peers: offer
                    .compute_peers
                    .iter()
                    .map(|peer| PeerSpec {
                        peer_id: peer.peer_id,
                        unit_ids: peer.unit_ids.clone(),
                    })
                    .collect(),
                effectors: offer.effectors.clone(),
                min_price_per_epoch,
            })
        })
        .collect()
}
