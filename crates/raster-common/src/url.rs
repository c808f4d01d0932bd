//! URL templates for raster and summary resources.
//!
//! Placeholders: `{indicator}`, `{yyyy}` (4-digit year), `{mm}` (2-digit
//! month). Every occurrence is substituted. Templates are not validated; a
//! template without placeholders simply yields the same URL for every month.

use serde::{Deserialize, Serialize};

use crate::indicator::Indicator;
use crate::time::YearMonth;

pub const DEFAULT_RASTER_TEMPLATE: &str = "{base}/{indicator}/{indicator}_{yyyy}_{mm}.tif";
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "{base}/summary_{indicator}.json";

/// Raster and summary URL templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTemplates {
    pub raster: String,
    pub summary: String,
}

impl UrlTemplates {
    pub fn new(raster: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            raster: raster.into(),
            summary: summary.into(),
        }
    }

    /// Default templates rooted at `base` (trailing slash ignored).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            raster: DEFAULT_RASTER_TEMPLATE.replace("{base}", base),
            summary: DEFAULT_SUMMARY_TEMPLATE.replace("{base}", base),
        }
    }

    /// URL of the raster for an indicator and month.
    pub fn raster_url(&self, indicator: Indicator, month: YearMonth) -> String {
        raster_url(&self.raster, indicator, month)
    }

    /// URL of the per-indicator summary series.
    pub fn summary_url(&self, indicator: Indicator) -> String {
        summary_url(&self.summary, indicator)
    }
}

/// Substitute indicator and month into a raster template.
pub fn raster_url(template: &str, indicator: Indicator, month: YearMonth) -> String {
    template
        .replace("{indicator}", indicator.as_str())
        .replace("{yyyy}", &format!("{:04}", month.year))
        .replace("{mm}", &format!("{:02}", month.month))
}

/// Substitute the indicator into a summary template.
pub fn summary_url(template: &str, indicator: Indicator) -> String {
    template.replace("{indicator}", indicator.as_str())
}
