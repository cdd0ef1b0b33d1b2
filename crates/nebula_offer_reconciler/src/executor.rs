use itertools::Itertools;
use nebula_base_layer::MarketContract;
use nebula_market_types::{MarketCall, OfferSpec};
use tracing::{info, instrument};

use crate::diff::{diff_offer, filter_offers_found_on_chain};
use crate::populate::{populate_offer_calls, OfferCalls};
use crate::report::format_update_plan;
use crate::{ConfirmationPrompt, OfferUpdateError, OfferUpdateResult};

#[cfg(test)]
#[path = "executor_tests.rs"]
mod executor_tests;

#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateOptions {
    /// Print the plan and stop: no prompt, no submission.
    pub dry_run: bool,
}

/// How an update run ended. Every variant is a normal exit; fatal conditions
/// surface as errors instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Desired and observed state already agree (or no offer was eligible).
    NoChanges,
    /// The plan was printed and `dry_run` stopped the run there.
    DryRun,
    /// The operator declined the confirmation prompt.
    Declined,
    /// The batch was signed and mined.
    Submitted { transactions: usize },
}

/// Drives one reconciliation run: fetch, diff, populate, confirm, submit.
pub struct OfferReconciler<C: MarketContract, P: ConfirmationPrompt> {
    chain: C,
    prompt: P,
    options: UpdateOptions,
}

impl<C: MarketContract, P: ConfirmationPrompt> OfferReconciler<C, P> {
    pub fn new(chain: C, prompt: P, options: UpdateOptions) -> Self {
        Self { chain, prompt, options }
    }

    /// Reconciles the desired offers against on-chain state.
    ///
    /// Until the final submission call this performs reads only; declining
    /// the prompt leaves the chain untouched. Re-running after a submission
    /// recomputes the diff against the updated chain state, so a second run
    /// with no external changes submits nothing.
    #[instrument(skip_all, err)]
    pub async fn update_offers(&self, desired: Vec<OfferSpec>) -> OfferUpdateResult<UpdateOutcome> {
        let snapshots = filter_offers_found_on_chain(&self.chain, desired).await?;
        if snapshots.is_empty() {
            info!("No offers eligible for update");
            return Ok(UpdateOutcome::NoChanges);
        }

        let usdc = self.chain.usdc_address().await?;

        let offer_calls: Vec<OfferCalls> = snapshots
            .iter()
            .map(|snapshot| {
                let diff = diff_offer(&snapshot.spec, &snapshot.observed, usdc);
                populate_offer_calls(&snapshot.spec.name, snapshot.offer_id, &diff)
            })
            .filter(|calls| !calls.is_empty())
            .collect();

        // Removals from every offer are mined before any addition from any
        // offer: the market contract enforces provider-wide capacity and
        // uniqueness constraints across offers.
        let batch: Vec<MarketCall> = offer_calls
            .iter()
            .flat_map(|offer| &offer.remove_peer_calls)
            .chain(offer_calls.iter().flat_map(|offer| &offer.calls))
            .map(|populated| populated.call.clone())
            .collect();

        if batch.is_empty() {
            info!("Offers are already up to date; nothing to submit");
            return Ok(UpdateOutcome::NoChanges);
        }

        info!("{}", format_update_plan(&offer_calls));

        if self.options.dry_run {
            info!("Dry run requested; not submitting");
            return Ok(UpdateOutcome::DryRun);
        }

        if !self.prompt.confirm("Submit the updates listed above?", true).await {
            info!("Offer update canceled; nothing was submitted");
            return Ok(UpdateOutcome::Declined);
        }

        if !self.chain.is_provider_registered().await? {
            return Err(OfferUpdateError::ProviderNotRegistered(self.chain.provider_address()));
        }

        let title = format!(
            "Update offers [{}]",
            offer_calls.iter().map(|offer| offer.offer_name.as_str()).join(", ")
        );
        let transactions = batch.len();
        self.chain.sign_batch(&title, batch).await?;
        info!("Submitted {transactions} transaction(s)");
        Ok(UpdateOutcome::Submitted { transactions })
    }
}
