// Multi-marketplace comparison: prices the same product under each channel's
// fee policy and ranks the outcomes.
use std::cmp::Ordering;

use shared::models::{
    ComparisonResult, MarketplaceId, MarketplaceProfile, MarketplaceResult, PriceInput, RankingMode,
};

use crate::calculator;
use crate::error::PricingError;

/// Static fee policy per channel (commission %, fixed fee per sale in BRL,
/// payment processing %).
pub fn profile(id: MarketplaceId) -> MarketplaceProfile {
    let (name, fee_percent, fixed_fee, payment_fee_percent) = match id {
        MarketplaceId::Amazon => ("Amazon", 15.0, 0.0, 0.0),
        MarketplaceId::Americanas => ("Americanas", 16.0, 5.0, 0.0),
        MarketplaceId::Magalu => ("Magalu", 16.0, 5.0, 0.0),
        MarketplaceId::MercadoLivreClassico => ("Mercado Livre Clássico", 13.0, 6.0, 0.0),
        MarketplaceId::MercadoLivrePremium => ("Mercado Livre Premium", 18.0, 6.0, 0.0),
        MarketplaceId::Shopee => ("Shopee", 20.0, 4.0, 0.0),
        MarketplaceId::LojaPropria => ("Loja Própria", 0.0, 0.0, 4.99),
    };
    MarketplaceProfile {
        id,
        name: name.to_string(),
        fee_percent,
        fixed_fee,
        payment_fee_percent,
    }
}

pub fn default_profiles() -> Vec<MarketplaceProfile> {
    MarketplaceId::ALL.iter().copied().map(profile).collect()
}

// The channel's commission and payment fee replace the card fee; its fixed
// fee is an extra per-sale cost.
fn input_for_profile(base: &PriceInput, profile: &MarketplaceProfile) -> PriceInput {
    PriceInput {
        card_fee_percent: profile.fee_percent + profile.payment_fee_percent,
        other_costs: base.other_costs + profile.fixed_fee,
        ..*base
    }
}

fn rank_order(ranking: RankingMode, a: &MarketplaceResult, b: &MarketplaceResult) -> Ordering {
    let primary = match ranking {
        RankingMode::LowestFees => a.total_fees.total_cmp(&b.total_fees),
        RankingMode::HighestProfit => b.profit.total_cmp(&a.profit),
    };
    primary.then_with(|| a.marketplace_id.as_str().cmp(b.marketplace_id.as_str()))
}

pub fn compare(
    base: &PriceInput,
    profiles: &[MarketplaceProfile],
    ranking: RankingMode,
) -> Result<ComparisonResult, PricingError> {
    if profiles.is_empty() {
        tracing::debug!("No marketplace profiles given, returning empty comparison");
        return Ok(ComparisonResult { ranking, results: Vec::new(), infeasible: Vec::new() });
    }

    let mut results = Vec::with_capacity(profiles.len());
    let mut infeasible = Vec::new();

    for profile in profiles {
        let breakdown = match calculator::calculate(&input_for_profile(base, profile)) {
            Ok(b) => b,
            Err(PricingError::InfeasiblePricing { .. }) => {
                tracing::warn!(
                    marketplace = %profile.id,
                    fee_percent = profile.fee_percent,
                    payment_fee_percent = profile.payment_fee_percent,
                    "Marketplace fees leave no room for the target margin, skipping"
                );
                infeasible.push(profile.id);
                continue;
            }
            Err(e) => return Err(e),
        };

        results.push(MarketplaceResult {
            marketplace_id: profile.id,
            marketplace_name: profile.name.clone(),
            fixed_fee: profile.fixed_fee,
            total_fees: breakdown.card_fee_amount + profile.fixed_fee,
            profit: breakdown.profit,
            breakdown,
            rank: 0,
            is_recommended: false,
            profit_difference: 0.0,
            profit_difference_percent: 0.0,
        });
    }

    results.sort_by(|a, b| rank_order(ranking, a, b));

    if let Some(best_profit) = results.first().map(|r| r.profit) {
        for (idx, result) in results.iter_mut().enumerate() {
            result.rank = idx + 1;
            result.is_recommended = idx == 0;
            result.profit_difference = result.profit - best_profit;
            result.profit_difference_percent = if best_profit != 0.0 {
                result.profit_difference / best_profit * 100.0
            } else {
                0.0
            };
        }
    }

    Ok(ComparisonResult { ranking, results, infeasible })
}

pub fn compare_all(base: &PriceInput, ranking: RankingMode) -> Result<ComparisonResult, PricingError> {
    compare(base, &default_profiles(), ranking)
}
