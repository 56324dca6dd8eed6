//! Macro-economic model: GDP, tax rate and spending in, growth, inflation and
//! budget balance out. Figures are annual; the monthly system applies a twelfth.

use serde::{Deserialize, Serialize};

pub const BASELINE_GROWTH: f64 = 0.02;
pub const TAX_PENALTY_THRESHOLD: f64 = 0.30;
pub const TAX_PENALTY_COEFFICIENT: f64 = 0.5;
pub const STIMULUS_THRESHOLD: f64 = 0.20;
pub const STIMULUS_COEFFICIENT: f64 = 0.2;
pub const OVERHEAT_THRESHOLD: f64 = 0.40;
pub const OVERHEAT_SURCHARGE: f64 = 0.02;
pub const BASE_INFLATION: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomyReport {
    pub revenue: f64,
    pub expenses: f64,
    pub budget_surplus: f64,
    pub new_gdp: f64,
    pub inflation: f64,
    pub growth_rate: f64,
}

pub fn compute_economy(gdp: f64, tax_rate: f64, public_spending: f64) -> EconomyReport {
    let spending_share = if gdp > 0.0 { public_spending / gdp } else { 0.0 };

    let tax_penalty = (tax_rate - TAX_PENALTY_THRESHOLD).max(0.0) * TAX_PENALTY_COEFFICIENT;
    let stimulus = (spending_share - STIMULUS_THRESHOLD).max(0.0) * STIMULUS_COEFFICIENT;
    let growth_rate = BASELINE_GROWTH - tax_penalty + stimulus;

    // Contraction does not pull prices under the base rate.
    let mut inflation = BASE_INFLATION + growth_rate.max(0.0) * 0.5;
    if spending_share > OVERHEAT_THRESHOLD {
        inflation += OVERHEAT_SURCHARGE;
    }

    let revenue = gdp * tax_rate;
    let expenses = public_spending;

    EconomyReport {
        revenue,
        expenses,
        budget_surplus: revenue - expenses,
        new_gdp: gdp * (1.0 + growth_rate),
        inflation,
        growth_rate,
    }
}
