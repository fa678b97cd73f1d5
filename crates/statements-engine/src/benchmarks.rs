//! Sector and size aware benchmark tables.
//!
//! Layered derivation, order matters: domestic base table, full replacement
//! for foreign listings, financial-sector overwrites (independent of listing
//! origin), margin-expectation adjustments, then size scaling of the growth
//! thresholds. Later stages may overwrite fields set by earlier ones.

use analysis_core::{MarginExpectation, SectorContext, SectorType, SizeCategory, SizeContext};
use serde::{Deserialize, Serialize};

/// Ticker suffixes of depositary receipts for foreign-market companies.
const FOREIGN_LISTING_SUFFIXES: &[&str] = &["31", "32", "33", "34", "35", "39"];

/// Membership test for foreign listings, keyed by ticker.
pub fn is_foreign_listing(ticker: &str) -> bool {
    let digits: String = ticker
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    FOREIGN_LISTING_SUFFIXES.contains(&digits.as_str())
}

/// Threshold set the rule evaluators score against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorBenchmarks {
    pub roe_min: f64,
    pub roe_good: f64,
    pub roe_excellent: f64,
    pub roa_min: f64,
    pub roa_good: f64,
    pub net_margin_min: f64,
    pub net_margin_good: f64,
    pub operating_margin_min: f64,
    pub current_ratio_min: f64,
    pub current_ratio_good: f64,
    pub quick_ratio_min: f64,
    pub debt_to_equity_max: f64,
    pub interest_coverage_min: f64,
    pub asset_turnover_min: f64,
    pub revenue_growth_min: f64,
    pub profit_growth_min: f64,
}

/// Base thresholds for domestically listed companies.
const DOMESTIC: SectorBenchmarks = SectorBenchmarks {
    roe_min: 0.08,
    roe_good: 0.15,
    roe_excellent: 0.25,
    roa_min: 0.03,
    roa_good: 0.07,
    net_margin_min: 0.05,
    net_margin_good: 0.12,
    operating_margin_min: 0.08,
    current_ratio_min: 1.0,
    current_ratio_good: 1.5,
    quick_ratio_min: 0.8,
    debt_to_equity_max: 2.0,
    interest_coverage_min: 1.5,
    asset_turnover_min: 0.5,
    revenue_growth_min: 0.05,
    profit_growth_min: 0.05,
};

/// Looser thresholds for foreign listings, where reporting conventions and
/// capital structures differ from the local market.
const FOREIGN: SectorBenchmarks = SectorBenchmarks {
    roe_min: 0.06,
    roe_good: 0.12,
    roe_excellent: 0.20,
    roa_min: 0.02,
    roa_good: 0.05,
    net_margin_min: 0.03,
    net_margin_good: 0.10,
    operating_margin_min: 0.05,
    current_ratio_min: 0.9,
    current_ratio_good: 1.3,
    quick_ratio_min: 0.7,
    debt_to_equity_max: 2.5,
    interest_coverage_min: 1.2,
    asset_turnover_min: 0.4,
    revenue_growth_min: 0.03,
    profit_growth_min: 0.03,
};

impl SectorBenchmarks {
    /// Derive the benchmark table for one company. `foreign_listed` comes
    /// from [`is_foreign_listing`] or an external membership test.
    pub fn for_company(
        sector: &SectorContext,
        size: &SizeContext,
        foreign_listed: bool,
    ) -> Self {
        let mut bench = if foreign_listed { FOREIGN } else { DOMESTIC };

        if sector.sector_type == SectorType::Financial {
            // Banks: ROA runs on a different scale, margins are wide, and
            // balance-sheet leverage is the business model. Same constants
            // regardless of listing origin.
            bench.roe_min = 0.10;
            bench.roe_good = 0.15;
            bench.roe_excellent = 0.20;
            bench.roa_min = 0.008;
            bench.roa_good = 0.015;
            bench.net_margin_min = 0.10;
            bench.net_margin_good = 0.25;
            bench.operating_margin_min = 0.15;
            bench.current_ratio_min = 0.9;
            bench.current_ratio_good = 1.1;
            bench.quick_ratio_min = 0.9;
            bench.debt_to_equity_max = 12.0;
        } else {
            match sector.margin_expectation {
                MarginExpectation::High => {
                    bench.net_margin_min *= 1.5;
                    bench.net_margin_good *= 1.4;
                    bench.operating_margin_min *= 1.5;
                    bench.roe_good += 0.02;
                    bench.roe_excellent += 0.03;
                }
                MarginExpectation::Low => {
                    bench.net_margin_min *= 0.6;
                    bench.net_margin_good *= 0.6;
                    bench.operating_margin_min *= 0.6;
                    bench.roe_min -= 0.02;
                    // Thin-margin sectors run on volume and more debt.
                    bench.debt_to_equity_max += 0.5;
                }
                MarginExpectation::Normal => {}
            }
        }

        match size.category {
            SizeCategory::Large => {
                bench.revenue_growth_min *= 0.6;
                bench.profit_growth_min *= 0.6;
            }
            SizeCategory::Small => {
                bench.revenue_growth_min *= 1.4;
                bench.profit_growth_min *= 1.4;
            }
            SizeCategory::Mid => {}
        }

        bench
    }
}
