//! Jewelry valuation from a resolved price and a weight

use crate::core::metal::Metal;
use crate::core::resolve::ResolvedPrice;
use anyhow::Result;

/// The outcome of appraising one item.
///
/// `meaningful` is false when the metal's price was unavailable; the value
/// is zero then and callers must warn instead of displaying it as an
/// estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub metal: Metal,
    pub weight_grams: f64,
    pub value: f64,
    pub meaningful: bool,
}

/// Computes `price_per_gram * weight_grams`.
///
/// Rejects non-positive weights before touching the price. An unavailable
/// price is not an error: the valuation comes back flagged as not
/// meaningful.
pub fn appraise(price: &ResolvedPrice, weight_grams: f64) -> Result<Valuation> {
    if weight_grams <= 0.0 || !weight_grams.is_finite() {
        anyhow::bail!("Weight must be a positive number of grams, got {}", weight_grams);
    }

    if !price.is_available() {
        return Ok(Valuation {
            metal: price.metal,
            weight_grams,
            value: 0.0,
            meaningful: false,
        });
    }

    Ok(Valuation {
        metal: price.metal,
        weight_grams,
        value: price.price_per_gram * weight_grams,
        meaningful: true,
    })
}
