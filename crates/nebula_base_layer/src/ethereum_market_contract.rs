use std::future::IntoFuture;

use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use nebula_market_types::{MarketCall, OfferId, OnChainOffer, OnChainPeer, PeerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;
use validator::Validate;

use crate::{MarketClientError, MarketClientResult, MarketContract};

#[cfg(test)]
#[path = "ethereum_market_contract_tests.rs"]
mod ethereum_market_contract_tests;

// Typed binding for the market facet of the deal contract. `multicall`
// executes the encoded calls in order within one transaction and reverts as
// a whole if any of them reverts.
sol! {
    #[sol(rpc)]
    contract Market {
        struct OfferView {
            address provider;
            address paymentToken;
            uint256 minPricePerEpoch;
            bytes32[] effectors;
        }

        struct ComputePeerView {
            bytes32 peerId;
            address owner;
            bytes32[] unitIds;
        }

        struct RegisterComputePeer {
            bytes32 peerId;
            address owner;
            bytes32[] unitIds;
        }

        function getOffer(bytes32 offerId) external view returns (OfferView memory);
        function getOfferPeers(bytes32 offerId) external view returns (ComputePeerView[] memory);
        function isProviderRegistered(address provider) external view returns (bool);
        function usdcToken() external view returns (address);

        function addComputePeers(bytes32 offerId, RegisterComputePeer[] calldata peers) external;
        function removeComputePeer(bytes32 offerId, bytes32 peerId) external;
        function addComputeUnits(bytes32 offerId, bytes32 peerId, bytes32[] calldata unitIds) external;
        function removeComputeUnit(bytes32 unitId) external;
        function addEffectors(bytes32 offerId, bytes32[] calldata effectors) external;
        function removeEffectors(bytes32 offerId, bytes32[] calldata effectors) external;
        function changePaymentToken(bytes32 offerId, address newPaymentToken) external;
        function changeMinPricePerEpoch(bytes32 offerId, uint256 newPrice) external;
        function multicall(bytes[] calldata data) external returns (bytes[] memory results);
    }
}

/// Market contract client over an Ethereum JSON-RPC endpoint.
///
/// The signer doubles as the provider identity: it owns registered compute
/// peers and is the address checked by `is_provider_registered`.
#[derive(Clone, Debug)]
pub struct EthereumMarketContract {
    pub config: EthereumMarketConfig,
    contract: Market::MarketInstance<DynProvider>,
    signer_address: Address,
}

impl EthereumMarketContract {
    pub fn new(config: EthereumMarketConfig, signer: PrivateKeySigner) -> Self {
        let signer_address = signer.address();
        let provider =
            ProviderBuilder::new().wallet(signer).connect_http(config.node_url.clone()).erased();
        let contract = Market::new(config.market_contract_address, provider);
        Self { config, contract, signer_address }
    }
}

#[async_trait]
impl MarketContract for EthereumMarketContract {
    async fn get_offer(&self, offer_id: OfferId) -> MarketClientResult<Option<OnChainOffer>> {
        let offer_call = self.contract.getOffer(offer_id);
        let peers_call = self.contract.getOfferPeers(offer_id);
        let (offer, peers) =
            tokio::try_join!(offer_call.call().into_future(), peers_call.call().into_future())?;

        // The contract returns a zeroed struct for ids it has never seen.
        if offer.provider == Address::ZERO {
            return Ok(None);
        }

        Ok(Some(OnChainOffer {
            payment_token: offer.paymentToken,
            price_per_epoch: offer.minPricePerEpoch,
            effectors: offer.effectors,
            peers: peers
                .into_iter()
                .map(|peer| OnChainPeer {
                    peer_id: PeerId::new(peer.peerId),
                    unit_ids: peer.unitIds,
                })
                .collect(),
        }))
    }

    async fn usdc_address(&self) -> MarketClientResult<Address> {
        Ok(self.contract.usdcToken().call().await?)
    }

    async fn is_provider_registered(&self) -> MarketClientResult<bool> {
        Ok(self.contract.isProviderRegistered(self.signer_address).call().await?)
    }

    fn provider_address(&self) -> Address {
        self.signer_address
    }

    async fn sign_batch(&self, title: &str, calls: Vec<MarketCall>) -> MarketClientResult<()> {
        info!("Signing batch \"{title}\" with {} calls", calls.len());
        let data: Vec<Bytes> =
            calls.iter().map(|call| encode_market_call(call, self.signer_address)).collect();
        let pending = self.contract.multicall(data).send().await?;
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(MarketClientError::BatchReverted { tx_hash: receipt.transaction_hash });
        }
        debug!("Batch {} mined in block {:?}", receipt.transaction_hash, receipt.block_number);
        Ok(())
    }
}

// `owner` is stamped on newly registered peers; the contract only accepts
// peers owned by the transaction sender.
fn encode_market_call(call: &MarketCall, owner: Address) -> Bytes {
    match call {
        MarketCall::AddComputePeers { offer_id, peers } => Market::addComputePeersCall {
            offerId: *offer_id,
            peers: peers
                .iter()
                .map(|peer| Market::RegisterComputePeer {
                    peerId: peer.peer_id.as_b256(),
                    owner,
                    unitIds: peer.unit_ids.clone(),
                })
                .collect(),
        }
        .abi_encode()
        .into(),
        MarketCall::RemoveComputePeer { offer_id, peer_id } => {
            Market::removeComputePeerCall { offerId: *offer_id, peerId: peer_id.as_b256() }
                .abi_encode()
                .into()
        }
        MarketCall::AddComputeUnits { offer_id, peer_id, unit_ids } => {
            Market::addComputeUnitsCall {
                offerId: *offer_id,
                peerId: peer_id.as_b256(),
                unitIds: unit_ids.clone(),
            }
            .abi_encode()
            .into()
        }
        MarketCall::RemoveComputeUnit { unit_id } => {
            Market::removeComputeUnitCall { unitId: *unit_id }.abi_encode().into()
        }
        MarketCall::AddEffectors { offer_id, effectors } => {
            Market::addEffectorsCall { offerId: *offer_id, effectors: effectors.clone() }
                .abi_encode()
                .into()
        }
        MarketCall::RemoveEffectors { offer_id, effectors } => {
            Market::removeEffectorsCall { offerId: *offer_id, effectors: effectors.clone() }
                .abi_encode()
                .into()
        }
        MarketCall::ChangePaymentToken { offer_id, new_token } => {
            Market::changePaymentTokenCall { offerId: *offer_id, newPaymentToken: *new_token }
                .abi_encode()
                .into()
        }
        MarketCall::ChangeMinPricePerEpoch { offer_id, new_price } => {
            Market::changeMinPricePerEpochCall { offerId: *offer_id, newPrice: *new_price }
                .abi_encode()
                .into()
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct EthereumMarketConfig {
    pub node_url: Url,
    pub market_contract_address: Address,
}

impl Default for EthereumMarketConfig {
    fn default() -> Self {
        let market_contract_address =
            "0x0B306BF915C4d645ff596e518fAf3F9669b97016".parse().unwrap();
        let node_url = "https://rpc.testnet.nebula.network/".parse().unwrap();

        Self { node_url, market_contract_address }
    }
}
