use serde::Serialize;
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::error::{AntibiogramError, Result};
use crate::interpretation::ClassificationResult;
use crate::statistics::DescriptiveStats;

pub const SUMMARIES_DIR: &str = "summaries";
pub const SUMMARY_FILE: &str = "antibiogram_summary.toml";

#[derive(Clone, Debug, Serialize)]
pub struct AntibioticStatistics {
    pub antibiotic: String,
    pub statistics: DescriptiveStats,
}

/// Session report, written on request only and never read back
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub generated: String,
    pub measurements: usize,
    pub bacteria_match: String,
    pub statistics: Option<DescriptiveStats>,
    pub results: Vec<ClassificationResult>,
    pub by_antibiotic: Vec<AntibioticStatistics>,
}

pub fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_default()
}

impl SessionSummary {
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AntibiogramError::Summary(e.to_string()))
    }

    pub fn write(&self, directory: &Path) -> Result<PathBuf> {
        let tomled = self.to_toml()?;
        let directory = directory.join(SUMMARIES_DIR);
        std::fs::create_dir_all(&directory)?;
        let output_name = directory.join(SUMMARY_FILE);
        std::fs::write(&output_name, tomled)?;
        Ok(output_name)
    }
}
