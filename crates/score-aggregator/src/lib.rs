//! Overall investment score aggregation.
//!
//! Blends the scores of up to eight external valuation strategies with the
//! statement health engine under listing-aware weight tables, then applies
//! the post-hoc penalty ladder (leverage, margin, statement risk, active
//! alerts) and grades the result.

pub mod penalties;
pub mod weights;

use analysis_core::{
    Grade, OverallScore, RiskLevel, StatementsAnalysis, StrategyAnalysis, StrategyContribution,
};
use serde::{Deserialize, Serialize};
use statements_engine::{analyze_financial_statements, benchmarks, StatementsInput};
use tracing::debug;

use crate::penalties::{
    apply_risk_adjustment, net_debt_penalty, net_margin_penalty, price_compatibility_factor,
    risk_capped, ACTIVE_FLAG_PENALTY,
};
use crate::weights::WeightTable;

const MAX_STRENGTHS: usize = 5;
const MAX_WEAKNESSES: usize = 5;

/// Strategy score at or above this reads as a strength, below
/// `STRATEGY_WEAK` as a weakness.
const STRATEGY_FAVORABLE: f64 = 70.0;
const STRATEGY_WEAK: f64 = 40.0;

/// Dividend-dependent strategies participate only above this payout ratio.
const MIN_PAYOUT_RATIO: f64 = 0.30;

/// The eight externally computed strategy results, each optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategySet {
    #[serde(default)]
    pub graham: Option<StrategyAnalysis>,
    #[serde(default)]
    pub discounted_cash_flow: Option<StrategyAnalysis>,
    #[serde(default)]
    pub gordon: Option<StrategyAnalysis>,
    #[serde(default)]
    pub magic_formula: Option<StrategyAnalysis>,
    #[serde(default)]
    pub low_pe: Option<StrategyAnalysis>,
    #[serde(default)]
    pub dividend_yield: Option<StrategyAnalysis>,
    #[serde(default)]
    pub perennial: Option<StrategyAnalysis>,
    #[serde(default)]
    pub fundamentalist: Option<StrategyAnalysis>,
}

/// Point-in-time indicators used for the dividend gate, the post-hoc
/// penalties, and the strength/weakness commentary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotIndicators {
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub payout_ratio: Option<f64>,
    #[serde(default)]
    pub net_debt_to_equity: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// 0-100 when a sentiment engine ran for this company.
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

/// Manually raised alert that flat-penalizes the final score while active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveFlag {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallScoreInput {
    pub ticker: String,
    #[serde(default)]
    pub strategies: StrategySet,
    #[serde(default)]
    pub financials: SnapshotIndicators,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub statements: Option<StatementsInput>,
    /// Injected clock for the statement engine.
    pub reference_year: i32,
    #[serde(default)]
    pub include_breakdown: bool,
    #[serde(default)]
    pub active_flag: Option<ActiveFlag>,
}

struct Entry<'a> {
    name: &'static str,
    description: &'static str,
    weight: f64,
    analysis: Option<&'a StrategyAnalysis>,
    price_sensitive: bool,
}

pub fn calculate_overall_score(input: &OverallScoreInput) -> OverallScore {
    let foreign = benchmarks::is_foreign_listing(&input.ticker);
    let sentiment = input.financials.sentiment_score;

    let mut table = WeightTable::base(foreign);
    if sentiment.is_some() {
        table = table.with_sentiment();
    }
    if !dividends_reliable(&input.financials) {
        table = table.without_dividend_strategies();
    }

    let statements = match input.statements.as_ref() {
        Some(s) => analyze_financial_statements(s, input.reference_year),
        None => statements_engine::insufficient_history(),
    };

    let strategies = &input.strategies;
    let entries = [
        Entry {
            name: "graham",
            description: "Graham intrinsic value screen",
            weight: table.graham,
            analysis: strategies.graham.as_ref(),
            price_sensitive: true,
        },
        Entry {
            name: "discounted_cash_flow",
            description: "Discounted cash flow valuation",
            weight: table.discounted_cash_flow,
            analysis: strategies.discounted_cash_flow.as_ref(),
            price_sensitive: true,
        },
        Entry {
            name: "gordon",
            description: "Gordon dividend growth model",
            weight: table.gordon,
            analysis: strategies.gordon.as_ref(),
            price_sensitive: false,
        },
        Entry {
            name: "magic_formula",
            description: "Magic formula ranking",
            weight: table.magic_formula,
            analysis: strategies.magic_formula.as_ref(),
            price_sensitive: false,
        },
        Entry {
            name: "low_pe",
            description: "Low P/E screen",
            weight: table.low_pe,
            analysis: strategies.low_pe.as_ref(),
            price_sensitive: false,
        },
        Entry {
            name: "dividend_yield",
            description: "Dividend yield screen",
            weight: table.dividend_yield,
            analysis: strategies.dividend_yield.as_ref(),
            price_sensitive: false,
        },
        Entry {
            name: "perennial",
            description: "Perennial quality screen",
            weight: table.perennial,
            analysis: strategies.perennial.as_ref(),
            price_sensitive: true,
        },
        Entry {
            name: "fundamentalist",
            description: "Fundamentalist composite",
            weight: table.fundamentalist,
            analysis: strategies.fundamentalist.as_ref(),
            price_sensitive: false,
        },
    ];

    let mut total_weight = 0.0;
    let mut total_points = 0.0;
    let mut contributions: Vec<StrategyContribution> = Vec::new();

    for entry in entries {
        let Some(analysis) = entry.analysis else {
            continue;
        };
        if entry.weight <= 0.0 {
            continue;
        }
        let mut used = analysis.score.clamp(0.0, 100.0);
        if entry.price_sensitive {
            used *= price_compatibility_factor(upside(analysis, input.current_price));
        }
        let points = if analysis.is_eligible {
            total_weight += entry.weight;
            total_points += used * entry.weight;
            used * entry.weight
        } else {
            0.0
        };
        contributions.push(StrategyContribution {
            name: entry.name.to_string(),
            used_score: used,
            weight: entry.weight,
            points,
            eligible: analysis.is_eligible,
            description: entry.description.to_string(),
        });
    }

    if input.statements.is_some() {
        let capped = risk_capped(statements.score as f64, statements.risk_level);
        total_weight += table.statements;
        total_points += capped * table.statements;
        contributions.push(StrategyContribution {
            name: "statements".to_string(),
            used_score: capped,
            weight: table.statements,
            points: capped * table.statements,
            eligible: true,
            description: "Financial statement health".to_string(),
        });
    }

    if let Some(score) = sentiment {
        let used = score.clamp(0.0, 100.0);
        total_weight += table.sentiment;
        total_points += used * table.sentiment;
        contributions.push(StrategyContribution {
            name: "sentiment".to_string(),
            used_score: used,
            weight: table.sentiment,
            points: used * table.sentiment,
            eligible: true,
            description: "News sentiment".to_string(),
        });
    }

    let raw_score = if total_weight > 0.0 {
        total_points / total_weight
    } else {
        50.0
    };
    let mut score = raw_score.round() as i32;

    if let Some(ratio) = input.financials.net_debt_to_equity {
        score -= net_debt_penalty(ratio, foreign);
    }
    if let Some(margin) = input.financials.net_margin {
        score -= net_margin_penalty(margin, foreign);
    }
    score = apply_risk_adjustment(score, statements.risk_level);
    if input.active_flag.is_some() {
        score -= ACTIVE_FLAG_PENALTY;
    }
    let score = score.clamp(0, 100) as u32;

    let grade = Grade::from_score(score);
    let (strengths, weaknesses) = narratives(input, &contributions, &statements, foreign);

    debug!(
        ticker = %input.ticker,
        score,
        raw = raw_score,
        engines = contributions.len(),
        foreign,
        "overall score computed"
    );

    contributions.sort_by(|a, b| b.points.total_cmp(&a.points));
    OverallScore {
        score,
        grade,
        classification: grade.classification().to_string(),
        strengths,
        weaknesses,
        recommendation: grade.recommendation().to_string(),
        statements,
        contributions: input.include_breakdown.then_some(contributions),
        raw_score: input.include_breakdown.then_some(raw_score),
    }
}

fn dividends_reliable(financials: &SnapshotIndicators) -> bool {
    matches!(financials.eps, Some(eps) if eps > 0.0)
        && matches!(financials.payout_ratio, Some(p) if p > MIN_PAYOUT_RATIO)
}

fn upside(analysis: &StrategyAnalysis, current_price: Option<f64>) -> Option<f64> {
    if analysis.upside.is_some() {
        return analysis.upside;
    }
    match (analysis.fair_value, current_price) {
        (Some(fair), Some(price)) if price > 0.0 => Some((fair / price - 1.0) * 100.0),
        _ => None,
    }
}

fn narratives(
    input: &OverallScoreInput,
    contributions: &[StrategyContribution],
    statements: &StatementsAnalysis,
    foreign: bool,
) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for c in contributions {
        if !c.eligible {
            continue;
        }
        if c.used_score >= STRATEGY_FAVORABLE {
            strengths.push(format!("{} favorable (score {:.0})", c.description, c.used_score));
        } else if c.used_score < STRATEGY_WEAK {
            weaknesses.push(format!(
                "{} unfavorable (score {:.0})",
                c.description, c.used_score
            ));
        }
    }

    let supplied = &input.strategies;
    if !dividends_reliable(&input.financials)
        && (supplied.gordon.is_some()
            || supplied.dividend_yield.is_some()
            || supplied.perennial.is_some())
    {
        weaknesses.push(
            "Dividend strategies not applicable (no positive earnings or sufficient payout)"
                .to_string(),
        );
    }

    strengths.extend(statements.positive_signals.iter().take(3).cloned());
    weaknesses.extend(statements.red_flags.iter().take(3).cloned());

    let fin = &input.financials;
    if let Some(roe) = fin.roe {
        if roe >= 0.15 {
            strengths.push(format!("High return on equity ({:.1}%)", roe * 100.0));
        }
    }
    if let Some(yield_) = fin.dividend_yield {
        if yield_ >= 0.05 {
            strengths.push(format!("Attractive dividend yield ({:.1}%)", yield_ * 100.0));
        }
    }
    match fin.net_debt_to_equity {
        Some(ratio) if ratio > 1.5 => {
            weaknesses.push(format!("Elevated net debt ({ratio:.1}x equity)"));
        }
        Some(ratio) if ratio <= 0.5 => {
            strengths.push(format!("Low net debt ({ratio:.1}x equity)"));
        }
        Some(_) => {}
        None => {
            weaknesses.push(
                "Net debt not reported; leverage assessed with benefit of the doubt".to_string(),
            );
        }
    }
    if let Some(margin) = fin.net_margin {
        let thin = if foreign { 0.03 } else { 0.02 };
        if margin < thin {
            weaknesses.push(format!("Thin or negative net margin ({:.1}%)", margin * 100.0));
        }
    }

    match statements.risk_level {
        RiskLevel::Critical => {
            weaknesses.push("Critical statement risk caps the overall score".to_string());
        }
        RiskLevel::High => {
            weaknesses.push("High statement risk weighs on the overall score".to_string());
        }
        _ => {}
    }
    if let Some(flag) = &input.active_flag {
        weaknesses.push(format!("Active alert ({}): {}", flag.id, flag.reason));
    }

    strengths.truncate(MAX_STRENGTHS);
    weaknesses.truncate(MAX_WEAKNESSES);
    (strengths, weaknesses)
}
