use std::io::Write;
use std::path::Path;

use alloy::primitives::{B256, U256};
use assert_matches::assert_matches;
use nebula_market_types::PeerId;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use super::{load_provider_config, resolve_offers, ConfigError};

fn peer(tag: u8) -> PeerId {
    PeerId::new(B256::repeat_byte(tag))
}

fn sample_config() -> String {
    format!(
        r#"
node_url = "https://rpc.devnet.nebula.network/"
market_contract_address = "0x0b306bf915c4d645ff596e518faf3f9669b97016"

[[offers]]
name = "offer-a"
offer_id = "{offer_id}"
min_price_per_epoch = "0.5"
effectors = ["{effector}"]

[[offers.compute_peers]]
peer_id = "{peer_a}"
unit_ids = ["{unit_a}", "{unit_b}"]

[[offers]]
name = "offer-b"
min_price_per_epoch = "1"

[[offers.compute_peers]]
peer_id = "{peer_b}"
unit_ids = ["{unit_c}"]
"#,
        offer_id = B256::repeat_byte(0xf0),
        effector = B256::repeat_byte(0x30),
        peer_a = peer(1),
        unit_a = B256::repeat_byte(0x10),
        unit_b = B256::repeat_byte(0x11),
        peer_b = peer(2),
        unit_c = B256::repeat_byte(0x12),
    )
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_and_resolves_a_complete_config() {
    let file = write_config(&sample_config());
    let config = load_provider_config(file.path()).unwrap();
    assert_eq!(config.offers.len(), 2);

    let offers = resolve_offers(&config, &[]).unwrap();
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].name, "offer-a");
    assert_eq!(offers[0].offer_id, Some(B256::repeat_byte(0xf0)));
    assert_eq!(offers[0].min_price_per_epoch, U256::from(500_000_u64));
    assert_eq!(offers[0].effectors, Some(vec![B256::repeat_byte(0x30)]));
    assert_eq!(offers[0].compute_peers.len(), 1);
    assert_eq!(offers[0].compute_peers[0].peer_id, peer(1));
    assert_eq!(
        offers[0].compute_peers[0].unit_ids,
        vec![B256::repeat_byte(0x10), B256::repeat_byte(0x11)],
    );

    assert_eq!(offers[1].name, "offer-b");
    assert_eq!(offers[1].offer_id, None);
    assert_eq!(offers[1].min_price_per_epoch, U256::from(1_000_000_u64));
    assert_eq!(offers[1].effectors, None);
}

#[test]
fn selection_picks_a_subset_and_ignores_unknown_names() {
    let file = write_config(&sample_config());
    let config = load_provider_config(file.path()).unwrap();

    let offers =
        resolve_offers(&config, &["offer-b".to_string(), "no-such-offer".to_string()]).unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].name, "offer-b");
}

#[test]
fn duplicate_offer_names_are_rejected() {
    let file = write_config(&sample_config().replace("offer-b", "offer-a"));
    assert_matches!(
        load_provider_config(file.path()),
        Err(ConfigError::DuplicateOffer(name)) if name == "offer-a"
    );
}

#[test]
fn duplicate_peers_within_an_offer_are_rejected() {
    let contents = format!(
        r#"
node_url = "https://rpc.devnet.nebula.network/"
market_contract_address = "0x0b306bf915c4d645ff596e518faf3f9669b97016"

[[offers]]
name = "offer-a"
min_price_per_epoch = "0.5"

[[offers.compute_peers]]
peer_id = "{peer}"
unit_ids = ["{unit_a}"]

[[offers.compute_peers]]
peer_id = "{peer}"
unit_ids = ["{unit_b}"]
"#,
        peer = peer(1),
        unit_a = B256::repeat_byte(0x10),
        unit_b = B256::repeat_byte(0x11),
    );
    let file = write_config(&contents);
    assert_matches!(
        load_provider_config(file.path()),
        Err(ConfigError::DuplicatePeer { offer, .. }) if offer == "offer-a"
    );
}

#[test]
fn empty_unit_list_fails_validation() {
    let contents = format!(
        r#"
node_url = "https://rpc.devnet.nebula.network/"
market_contract_address = "0x0b306bf915c4d645ff596e518faf3f9669b97016"

[[offers]]
name = "offer-a"
min_price_per_epoch = "0.5"

[[offers.compute_peers]]
peer_id = "{peer}"
unit_ids = []
"#,
        peer = peer(1),
    );
    let file = write_config(&contents);
    assert_matches!(load_provider_config(file.path()), Err(ConfigError::Invalid(_)));
}

#[test]
fn invalid_price_surfaces_with_the_offer_name() {
    let file = write_config(&sample_config().replace(r#""0.5""#, r#""not-a-number""#));
    let config = load_provider_config(file.path()).unwrap();
    assert_matches!(
        resolve_offers(&config, &[]),
        Err(ConfigError::InvalidPrice { offer, .. }) if offer == "offer-a"
    );
}

#[test]
fn missing_file_is_a_read_error() {
    assert_matches!(
        load_provider_config(Path::new("/definitely/not/here.toml")),
        Err(ConfigError::Read { .. })
    );
}
