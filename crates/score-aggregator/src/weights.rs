//! Base weight tables and their two reshaping passes: the sentiment reserve
//! and the dividend-strategy redistribution.

/// Weight of every engine entering the blend. Absent or excluded engines are
/// dropped from both numerator and denominator at aggregation time, so the
/// tables only fix the relative importance of what is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTable {
    pub graham: f64,
    pub discounted_cash_flow: f64,
    pub gordon: f64,
    pub magic_formula: f64,
    pub low_pe: f64,
    pub dividend_yield: f64,
    pub perennial: f64,
    pub fundamentalist: f64,
    pub statements: f64,
    pub sentiment: f64,
}

const DOMESTIC: WeightTable = WeightTable {
    graham: 0.12,
    discounted_cash_flow: 0.08,
    gordon: 0.08,
    magic_formula: 0.10,
    low_pe: 0.10,
    dividend_yield: 0.12,
    perennial: 0.05,
    fundamentalist: 0.15,
    statements: 0.20,
    sentiment: 0.0,
};

/// Foreign listings (BDRs): thinner local filings, so the asset-light screens
/// and the statement engine carry more and the dividend screens less.
const FOREIGN: WeightTable = WeightTable {
    graham: 0.15,
    discounted_cash_flow: 0.06,
    gordon: 0.04,
    magic_formula: 0.12,
    low_pe: 0.12,
    dividend_yield: 0.08,
    perennial: 0.0,
    fundamentalist: 0.18,
    statements: 0.25,
    sentiment: 0.0,
};

/// Share reserved for sentiment when a sentiment score is available.
const SENTIMENT_RESERVE: f64 = 0.10;

impl WeightTable {
    pub fn base(foreign_listed: bool) -> Self {
        if foreign_listed {
            FOREIGN
        } else {
            DOMESTIC
        }
    }

    /// Scales every strategy weight by 0.9 and reserves the freed 10% for
    /// the sentiment engine.
    pub fn with_sentiment(mut self) -> Self {
        let scale = 1.0 - SENTIMENT_RESERVE;
        self.graham *= scale;
        self.discounted_cash_flow *= scale;
        self.gordon *= scale;
        self.magic_formula *= scale;
        self.low_pe *= scale;
        self.dividend_yield *= scale;
        self.perennial *= scale;
        self.fundamentalist *= scale;
        self.statements *= scale;
        self.sentiment = SENTIMENT_RESERVE;
        self
    }

    /// Removes the dividend-dependent strategies and hands their combined
    /// weight to the five fundamentals-driven engines, preserving the total.
    pub fn without_dividend_strategies(mut self) -> Self {
        let unused = self.gordon + self.dividend_yield + self.perennial;
        let receiving = self.graham
            + self.low_pe
            + self.magic_formula
            + self.fundamentalist
            + self.statements;
        if receiving > 0.0 {
            let factor = 1.0 + unused / receiving;
            self.graham *= factor;
            self.low_pe *= factor;
            self.magic_formula *= factor;
            self.fundamentalist *= factor;
            self.statements *= factor;
        }
        self.gordon = 0.0;
        self.dividend_yield = 0.0;
        self.perennial = 0.0;
        self
    }

    pub fn total(&self) -> f64 {
        self.graham
            + self.discounted_cash_flow
            + self.gordon
            + self.magic_formula
            + self.low_pe
            + self.dividend_yield
            + self.perennial
            + self.fundamentalist
            + self.statements
            + self.sentiment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tables_sum_to_one() {
        assert!((WeightTable::base(false).total() - 1.0).abs() < 1e-12);
        assert!((WeightTable::base(true).total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sentiment_reserve_keeps_the_total() {
        let table = WeightTable::base(false).with_sentiment();
        assert!((table.total() - 1.0).abs() < 1e-12);
        assert!((table.sentiment - 0.10).abs() < 1e-12);
        assert!((table.statements - 0.18).abs() < 1e-12);
    }

    #[test]
    fn dividend_redistribution_preserves_the_total() {
        let table = WeightTable::base(false).without_dividend_strategies();
        assert!((table.total() - 1.0).abs() < 1e-12);
        assert_eq!(table.gordon, 0.0);
        assert_eq!(table.dividend_yield, 0.0);
        assert_eq!(table.perennial, 0.0);
        // 0.25 unused over 0.67 receiving.
        let factor = 1.0 + 0.25 / 0.67;
        assert!((table.statements - 0.20 * factor).abs() < 1e-12);
        // The untouched engine keeps its base weight.
        assert!((table.discounted_cash_flow - 0.08).abs() < 1e-12);
    }

    #[test]
    fn reshaping_passes_compose() {
        let table = WeightTable::base(true)
            .with_sentiment()
            .without_dividend_strategies();
        assert!((table.total() - 1.0).abs() < 1e-12);
    }
}
