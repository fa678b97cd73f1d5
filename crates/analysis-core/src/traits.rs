use crate::{SectorContext, SizeContext};

/// Seam for the external sector classifier. The engines consume the derived
/// [`SectorContext`] and never inspect raw sector strings beyond the fixed
/// banking keyword table.
pub trait SectorClassifier: Send + Sync {
    fn classify(&self, sector: Option<&str>, industry: Option<&str>) -> SectorContext;
}

/// Seam for the external size classifier.
pub trait SizeClassifier: Send + Sync {
    fn classify(&self, market_cap: Option<f64>) -> SizeContext;
}
