//! Configuration for the raster pipeline.
//!
//! Values come from an optional YAML file, then environment overrides. Every
//! field has a default, so an empty file (or no file) is a valid config.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use raster_common::{BoundingBox, TimeCodec, UrlTemplates, Viewport, YearMonth};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};

/// Configuration for the raster pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the raster archive, a URL or a local directory.
    pub base_url: String,

    /// Raster URL template; derived from `base_url` when unset.
    pub raster_template: Option<String>,

    /// Summary URL template; derived from `base_url` when unset.
    pub summary_template: Option<String>,

    /// Month of time index 0.
    pub epoch: YearMonth,

    /// Last archived month (inclusive). When unset, the month before the
    /// current UTC month.
    pub end: Option<YearMonth>,

    /// Area covered by every raster.
    pub bbox: BoundingBox,

    /// Initial map view.
    pub viewport: Viewport,

    /// Months warmed on each side of the displayed month.
    pub prefetch_radius: u32,

    /// Concurrent fetches per sampler wave.
    pub sampler_pool_size: usize,

    /// Transport timeout for a single fetch.
    pub fetch_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "output".to_string(),
            raster_template: None,
            summary_template: None,
            epoch: YearMonth::new(2016, 1),
            end: None,
            bbox: BoundingBox::default(),
            viewport: Viewport::default(),
            prefetch_radius: 2,
            sampler_pool_size: 8,
            fetch_timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Load from an optional file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading pipeline config");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup.
    ///
    /// Keys: `RASTER_BASE_URL`, `RASTER_URL_TEMPLATE`, `SUMMARY_URL_TEMPLATE`,
    /// `RASTER_EPOCH`, `RASTER_END`, `PREFETCH_RADIUS`, `SAMPLER_POOL_SIZE`,
    /// `FETCH_TIMEOUT_SECS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RASTER_BASE_URL") {
            self.base_url = val;
        }

        if let Some(val) = lookup("RASTER_URL_TEMPLATE") {
            self.raster_template = Some(val);
        }

        if let Some(val) = lookup("SUMMARY_URL_TEMPLATE") {
            self.summary_template = Some(val);
        }

        if let Some(val) = lookup("RASTER_EPOCH") {
            self.epoch = parse_month("RASTER_EPOCH", &val)?;
        }

        if let Some(val) = lookup("RASTER_END") {
            self.end = Some(parse_month("RASTER_END", &val)?);
        }

        if let Some(val) = lookup("PREFETCH_RADIUS") {
            self.prefetch_radius = parse_number("PREFETCH_RADIUS", &val)?;
        }

        if let Some(val) = lookup("SAMPLER_POOL_SIZE") {
            self.sampler_pool_size = parse_number("SAMPLER_POOL_SIZE", &val)?;
        }

        if let Some(val) = lookup("FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_number("FETCH_TIMEOUT_SECS", &val)?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.sampler_pool_size == 0 {
            return Err(PipelineError::config("sampler_pool_size must be > 0"));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(PipelineError::config("fetch_timeout_secs must be > 0"));
        }

        if self.bbox.width() <= 0.0 || self.bbox.height() <= 0.0 {
            return Err(PipelineError::config(format!(
                "bbox has no area: {:?}",
                self.bbox
            )));
        }

        if let Some(end) = self.end {
            if end < self.epoch {
                return Err(PipelineError::config(format!(
                    "end month {} is before epoch {}",
                    end, self.epoch
                )));
            }
        }

        Ok(())
    }

    pub fn codec(&self) -> TimeCodec {
        TimeCodec::new(self.epoch)
    }

    /// Resolved raster and summary templates.
    pub fn templates(&self) -> UrlTemplates {
        let mut templates = UrlTemplates::with_base(&self.base_url);
        if let Some(raster) = &self.raster_template {
            templates.raster = raster.clone();
        }
        if let Some(summary) = &self.summary_template {
            templates.summary = summary.clone();
        }
        templates
    }

    /// Last archived month as seen at `now`.
    pub fn end_month(&self, now: DateTime<Utc>) -> YearMonth {
        self.end.unwrap_or_else(|| YearMonth::of(now).previous())
    }

    /// Number of archived months as seen at `now`.
    pub fn total_months_at(&self, now: DateTime<Utc>) -> u32 {
        self.codec().months_through(self.end_month(now))
    }

    pub fn total_months(&self) -> u32 {
        self.total_months_at(Utc::now())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_month(key: &str, val: &str) -> Result<YearMonth> {
    YearMonth::parse(val).map_err(|e| PipelineError::config(format!("{}: {}", key, e)))
}

fn parse_number<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| PipelineError::config(format!("{}: not a number: {}", key, val)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.epoch, YearMonth::new(2016, 1));
        assert_eq!(config.prefetch_radius, 2);
        assert_eq!(config.sampler_pool_size, 8);
        assert_eq!(config.bbox, BoundingBox::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_total_months_without_end_stops_before_current_month() {
        let config = PipelineConfig::default();
        let now = Utc.with_ymd_and_hms(2016, 4, 10, 12, 0, 0).unwrap();
        // Jan, Feb, Mar 2016
        assert_eq!(config.total_months_at(now), 3);
    }

    #[test]
    fn test_total_months_with_end_is_inclusive() {
        let config = PipelineConfig {
            end: Some(YearMonth::new(2025, 12)),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(config.total_months_at(now), 120);
    }

    #[test]
    fn test_yaml_partial_document() {
        let yaml = r#"
base_url: https://example.com/output
end: "2020-06"
prefetch_radius: 3
bbox:
  west: 0.0
  south: 0.0
  east: 1.0
  north: 1.0
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.end, Some(YearMonth::new(2020, 6)));
        assert_eq!(config.prefetch_radius, 3);
        assert_eq!(config.sampler_pool_size, 8);
        assert_eq!(config.bbox, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            PipelineConfig::from_yaml_str("  \n").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PipelineConfig::default();
        config
            .apply_overrides(lookup(&[
                ("RASTER_BASE_URL", "https://host/data/"),
                ("RASTER_EPOCH", "2018-04"),
                ("SAMPLER_POOL_SIZE", "4"),
            ]))
            .unwrap();

        assert_eq!(config.epoch, YearMonth::new(2018, 4));
        assert_eq!(config.sampler_pool_size, 4);
        assert_eq!(
            config.templates().summary,
            "https://host/data/summary_{indicator}.json"
        );
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PREFETCH_RADIUS", "two")]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_explicit_template_wins() {
        let config = PipelineConfig {
            raster_template: Some("s3/{yyyy}{mm}_{indicator}.tif".to_string()),
            ..Default::default()
        };
        assert_eq!(config.templates().raster, "s3/{yyyy}{mm}_{indicator}.tif");
    }

    #[test]
    fn test_validate_rejects_end_before_epoch() {
        let config = PipelineConfig {
            end: Some(YearMonth::new(2015, 12)),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "sampler_pool_size: 2\nend: \"2017-01\"\n").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.sampler_pool_size, 2);
        assert_eq!(config.total_months(), 13);
    }
}
