use alloy_primitives::utils::{format_units, parse_units, UnitsError};
use alloy_primitives::U256;
use thiserror::Error;

#[cfg(test)]
#[path = "price_tests.rs"]
mod price_tests;

/// Offers are priced in USDC by convention.
pub const USDC_DECIMALS: u8 = 6;

/// Formats a raw token amount as a decimal USDC string.
///
/// Both the desired and the observed price go through this exact function
/// before being compared, so representation differences can never register as
/// a price change.
pub fn format_price(amount: U256) -> String {
    let formatted =
        format_units(amount, USDC_DECIMALS).expect("USDC_DECIMALS is a valid decimals value");
    format!("{formatted} USDC")
}

#[derive(Debug, Error)]
pub enum PriceParseError {
    #[error("price must be a non-negative decimal amount")]
    Negative,
    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// Parses a human decimal USDC amount (e.g. "1.5") into the raw on-chain
/// value.
pub fn parse_price(value: &str) -> Result<U256, PriceParseError> {
    if value.trim_start().starts_with('-') {
        return Err(PriceParseError::Negative);
    }
    Ok(parse_units(value, USDC_DECIMALS)?.get_absolute())
}
