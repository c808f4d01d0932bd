//! Area-wide monthly statistics published next to the rasters.

use serde::{Deserialize, Serialize};

use crate::time::{TimeCodec, TimeIndex, YearMonth};

/// One month of area statistics from `summary_{indicator}.json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub year: i32,
    pub month: u32,
    /// Statistics are null for months without a single valid pixel.
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Fraction of pixels with a finite value.
    pub valid_ratio: f64,
}

impl SummaryRecord {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// A parsed summary series, indexed by time index.
#[derive(Debug, Clone, Default)]
pub struct SummarySeries {
    records: Vec<SummaryRecord>,
}

impl SummarySeries {
    /// Parse the JSON array written by the upstream pipeline. Records are
    /// sorted by month; duplicate months keep the last record.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        let records: Vec<SummaryRecord> = serde_json::from_slice(json)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(mut records: Vec<SummaryRecord>) -> Self {
        records.sort_by_key(|r| r.year_month());
        let mut deduped: Vec<SummaryRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.year_month() == record.year_month() => *last = record,
                _ => deduped.push(record),
            }
        }
        Self { records: deduped }
    }

    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, month: YearMonth) -> Option<&SummaryRecord> {
        self.records
            .binary_search_by_key(&month, |r| r.year_month())
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn at(&self, codec: &TimeCodec, index: TimeIndex) -> Option<&SummaryRecord> {
        self.get(codec.to_calendar(index))
    }

    /// Last month covered by the series.
    pub fn last_month(&self) -> Option<YearMonth> {
        self.records.last().map(|r| r.year_month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"[
        {"year": 2016, "month": 2, "mean": 0.41, "max": 0.8, "min": -0.1, "valid_ratio": 0.93},
        {"year": 2016, "month": 1, "mean": 0.35, "max": 0.7, "min": -0.2, "valid_ratio": 0.88}
    ]"#;

    #[test]
    fn test_parse_and_sort() {
        let series = SummarySeries::from_json(JSON.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].month, 1);
        assert_eq!(series.last_month(), Some(YearMonth::new(2016, 2)));
    }

    #[test]
    fn test_lookup_by_index() {
        let series = SummarySeries::from_json(JSON.as_bytes()).unwrap();
        let codec = TimeCodec::default();
        assert_eq!(series.at(&codec, TimeIndex(1)).unwrap().mean, Some(0.41));
        assert!(series.at(&codec, TimeIndex(5)).is_none());
    }

    #[test]
    fn test_duplicate_month_keeps_last() {
        let record = |mean| SummaryRecord {
            year: 2020,
            month: 5,
            mean: Some(mean),
            min: Some(0.0),
            max: Some(1.0),
            valid_ratio: 1.0,
        };
        let series = SummarySeries::from_records(vec![record(0.1), record(0.2)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].mean, Some(0.2));
    }

    #[test]
    fn test_null_statistics() {
        let json = r#"[{"year": 2019, "month": 8, "mean": null, "max": null, "min": null, "valid_ratio": 0.0}]"#;
        let series = SummarySeries::from_json(json.as_bytes()).unwrap();
        assert_eq!(series.records()[0].mean, None);
        assert_eq!(series.records()[0].valid_ratio, 0.0);
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(SummarySeries::from_json(b"{not json").is_err());
    }
}
