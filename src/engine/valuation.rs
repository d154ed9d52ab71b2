use serde::Serialize;

use super::compute::WorkType;

/// Valuation bounds: research-grant equivalents per discovery.
pub const VALUE_FLOOR: f64 = 1200.0;
pub const VALUE_CEILING: f64 = 3500.0;

/// Difficulty scaling is capped at 1.5x.
const MAX_DIFFICULTY_MULTIPLIER: f64 = 1.5;

/// Breakdown of a scientific valuation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub base_value: f64,
    pub computational_cost: f64,
    pub research_impact: f64,
    pub total_value: f64,
    pub difficulty_multiplier: f64,
}

/// Base research value per work type (grant equivalents in dollars).
fn base_research_value(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::RiemannZero => 800.0,
        WorkType::PrimePattern => 600.0,
        WorkType::YangMills => 1200.0,
        WorkType::NavierStokes => 900.0,
        WorkType::GoldbachVerification => 500.0,
        WorkType::BirchSwinnertonDyer => 700.0,
        WorkType::EllipticCurveCrypto => 800.0,
        WorkType::LatticeCrypto => 750.0,
        WorkType::PoincareConjecture => 1000.0,
    }
}

/// Research impact factor per work type.
fn research_impact_factor(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::YangMills => 300.0,
        WorkType::RiemannZero => 200.0,
        WorkType::PoincareConjecture => 250.0,
        WorkType::PrimePattern => 150.0,
        WorkType::NavierStokes => 180.0,
        WorkType::GoldbachVerification => 100.0,
        WorkType::BirchSwinnertonDyer => 160.0,
        WorkType::EllipticCurveCrypto => 170.0,
        WorkType::LatticeCrypto => 140.0,
    }
}

/// Computational cost in dollars: cloud compute plus energy, scaled up
/// slightly and capped at $200.
fn computational_cost(computation_time_secs: f64, energy_consumed_kwh: f64) -> f64 {
    let compute_cost = computation_time_secs / 3600.0 * 0.10;
    let energy_cost = energy_consumed_kwh * 0.15;
    ((compute_cost + energy_cost) * 100.0).min(200.0)
}

/// Price a discovery. The arithmetic is a fabricated valuation model kept
/// from the original platform; total value is clamped to
/// [VALUE_FLOOR, VALUE_CEILING], so it is always positive.
pub fn calculate_scientific_value(
    work_type: WorkType,
    difficulty: u32,
    computation_time_secs: f64,
    energy_consumed_kwh: f64,
) -> Valuation {
    let base_value = base_research_value(work_type);
    let impact = research_impact_factor(work_type);
    let cost = computational_cost(computation_time_secs, energy_consumed_kwh);

    let difficulty_multiplier =
        (1.0 + difficulty as f64 / 1000.0 * 0.5).min(MAX_DIFFICULTY_MULTIPLIER);
    let research_impact = impact * difficulty_multiplier;

    let total_value = (base_value + research_impact + cost).clamp(VALUE_FLOOR, VALUE_CEILING);

    Valuation {
        base_value,
        computational_cost: cost,
        research_impact,
        total_value,
        difficulty_multiplier,
    }
}
