#![deny(unused_crate_dependencies)]
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod error;
pub mod interpretation;
pub mod matching;
pub mod measurement;
pub mod plot;
pub mod reference;
pub mod statistics;
pub mod summary;

use crate::error::{AntibiogramError, Result};
use crate::interpretation::{derive_results, ClassificationResult, Thresholds};
use crate::matching::{match_bacteria, MatchOutcome};
use crate::measurement::{Measurement, MeasurementStore};
use crate::plot::plot_measurements;
use crate::reference::ReferenceData;
use crate::statistics::{compare, descriptive_stats, DescriptiveStats, WelchTest, MIN_GROUP_SIZE};
use crate::summary::{timestamp, AntibioticStatistics, SessionSummary};

pub const OUTPUT: &str = "output";

/// Single user session: measurements collected so far and reference data
/// loaded at startup.
#[derive(Debug)]
pub struct Session {
    store: MeasurementStore,
    reference: ReferenceData,
}

impl Session {
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            store: MeasurementStore::new(),
            reference,
        }
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Record measurement under antibiotic name as spelled in thresholds
    /// table, if it is tabulated.
    pub fn add(&mut self, antibiotic: &str, raw_diameter: &str) -> Result<&Measurement> {
        let antibiotic = self.reference.thresholds.canonical_name(antibiotic);
        if self.reference.thresholds.get(&antibiotic).is_none() {
            warn!("No threshold data for {antibiotic}, measurement will not be interpreted.");
        }
        let measurement = self.store.add(&antibiotic, raw_diameter)?;
        debug!(
            "Added {} mm for {}",
            measurement.diameter, measurement.antibiotic
        );
        Ok(measurement)
    }

    pub fn clear(&mut self) {
        debug!("Cleared {} measurements", self.store.len());
        self.store.clear()
    }

    pub fn results(&self) -> Vec<ClassificationResult> {
        derive_results(&self.store, &self.reference.thresholds)
    }

    /// Statistics over all measured diameters, regardless of antibiotic.
    pub fn statistics(&self) -> Result<DescriptiveStats> {
        descriptive_stats(&self.store.diameters()).ok_or(AntibiogramError::InsufficientData {
            required: 1,
            found: 0,
        })
    }

    pub fn statistics_for(&self, antibiotic: &str) -> Result<DescriptiveStats> {
        let antibiotic = self.reference.thresholds.canonical_name(antibiotic);
        descriptive_stats(&self.store.diameters_for(&antibiotic)).ok_or(
            AntibiogramError::InsufficientData {
                required: 1,
                found: 0,
            },
        )
    }

    /// Statistics for each measured antibiotic, in order of first
    /// measurement.
    pub fn statistics_by_antibiotic(&self) -> Vec<AntibioticStatistics> {
        self.store
            .antibiotics()
            .into_iter()
            .filter_map(|antibiotic| {
                descriptive_stats(&self.store.diameters_for(antibiotic)).map(|statistics| {
                    AntibioticStatistics {
                        antibiotic: antibiotic.to_owned(),
                        statistics,
                    }
                })
            })
            .collect()
    }

    pub fn compare(&self, antibiotic_a: &str, antibiotic_b: &str) -> Result<WelchTest> {
        let diameters_a = self
            .store
            .diameters_for(&self.reference.thresholds.canonical_name(antibiotic_a));
        let diameters_b = self
            .store
            .diameters_for(&self.reference.thresholds.canonical_name(antibiotic_b));
        compare(&diameters_a, &diameters_b).ok_or(AntibiogramError::InsufficientData {
            required: MIN_GROUP_SIZE,
            found: diameters_a.len().min(diameters_b.len()),
        })
    }

    pub fn match_bacteria(&self) -> MatchOutcome {
        match_bacteria(&self.results(), &self.reference.bacteria)
    }

    pub fn thresholds(&self, antibiotic: &str) -> Result<&Thresholds> {
        let name = self.reference.thresholds.canonical_name(antibiotic);
        self.reference
            .thresholds
            .get(&name)
            .ok_or(AntibiogramError::UnknownAntibiotic { name })
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            generated: timestamp(),
            measurements: self.store.len(),
            bacteria_match: self.match_bacteria().to_string(),
            statistics: descriptive_stats(&self.store.diameters()),
            results: self.results(),
            by_antibiotic: self.statistics_by_antibiotic(),
        }
    }

    pub fn export_summary(&self, directory: &Path) -> Result<PathBuf> {
        let output_name = self.summary().write(directory)?;
        debug!("Summary written to {}", output_name.display());
        Ok(output_name)
    }

    pub fn plot(&self, directory: &Path) -> Result<PathBuf> {
        let output_name = plot_measurements(self.store.all(), directory)?;
        debug!("Graph written to {}", output_name.display());
        Ok(output_name)
    }
}
