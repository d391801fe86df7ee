//! Reference data: antibiotic thresholds and bacteria reaction profiles
//!
//! Reference file is toml with one entry per table row:
//!
//! ```toml
//! [format]
//! name = "antibiogram-reference"
//! version = "0.1.0"
//!
//! [[threshold]]
//! antibiotic = "Penicillin"
//! susceptible = 15
//! intermediate = 13
//! resistant = 12
//!
//! [[reaction]]
//! bacteria = "Escherichia coli"
//! antibiotic = "Penicillin"
//! reaction = "R"
//! ```
//!
//! Invalid rows are skipped with a warning.

use semver::Version;
use std::path::Path;
use toml::{Table, Value};
use tracing::{debug, warn};

pub mod keywords;
pub mod utils;
pub mod valid_versions;

use crate::error::{AntibiogramError, Result};
use crate::interpretation::{ThresholdTable, Thresholds};
use crate::matching::{BacteriaReferenceTable, Reaction};
use keywords::{
    ANTIBIOTIC, BACTERIA, FORMAT, INTERMEDIATE, NAME, REACTION, REFERENCE_FORMAT_NAME, RESISTANT,
    SUSCEPTIBLE, THRESHOLD, VERSION,
};
use utils::Extractable;
use valid_versions::VALID_VERSIONS_REFERENCE;

pub const DEFAULT_REFERENCE_FILE: &str = "data/reference.toml";

/// Built-in thresholds, used when no reference file is available:
/// antibiotic, susceptible, intermediate, resistant
pub const DEFAULT_THRESHOLDS: &[(&str, f64, f64, f64)] = &[
    ("Penicillin", 15.0, 13.0, 12.0),
    ("Cefazolin", 18.0, 15.0, 14.0),
    ("Erythromycin", 18.0, 14.0, 13.0),
    ("Tetracycline", 19.0, 15.0, 14.0),
    ("Gentamicin", 15.0, 13.0, 12.0),
];

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceData {
    pub thresholds: ThresholdTable,
    pub bacteria: BacteriaReferenceTable,
}

impl Default for ReferenceData {
    fn default() -> Self {
        let mut thresholds = ThresholdTable::new();
        for (antibiotic, susceptible, intermediate, resistant) in DEFAULT_THRESHOLDS.iter() {
            thresholds.insert(
                antibiotic,
                Thresholds {
                    susceptible: *susceptible,
                    intermediate: *intermediate,
                    resistant: *resistant,
                },
            );
        }
        Self {
            thresholds,
            bacteria: BacteriaReferenceTable::new(),
        }
    }
}

impl ReferenceData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents_toml = std::fs::read_to_string(path.as_ref())?;
        let reference_data = Self::from_toml_str(&contents_toml)?;
        debug!(
            "Loaded {} antibiotic thresholds and {} bacteria profiles from {}",
            reference_data.thresholds.len(),
            reference_data.bacteria.len(),
            path.as_ref().display()
        );
        Ok(reference_data)
    }

    pub fn from_toml_str(contents_toml: &str) -> Result<Self> {
        let all_reference = contents_toml.parse::<Table>()?;
        check_format(&all_reference)?;

        let mut thresholds = ThresholdTable::new();
        if let Some(threshold_table_set) = <&[Value]>::try_single_key(&all_reference, THRESHOLD) {
            for threshold_table_value in threshold_table_set {
                if let Value::Table(threshold_table) = threshold_table_value {
                    if let Some((antibiotic, current_thresholds)) =
                        try_from_threshold_table(threshold_table)
                    {
                        thresholds.insert(antibiotic, current_thresholds)
                    }
                }
            }
        }
        if thresholds.is_empty() {
            warn!("No valid antibiotic thresholds in reference data.");
        }

        // reaction rows are checked against thresholds spelling
        let mut bacteria = BacteriaReferenceTable::new();
        if let Some(reaction_table_set) = <&[Value]>::try_single_key(&all_reference, REACTION) {
            for reaction_table_value in reaction_table_set {
                if let Value::Table(reaction_table) = reaction_table_value {
                    if let Some((bacterium, antibiotic, reaction)) =
                        try_from_reaction_table(reaction_table)
                    {
                        bacteria.insert(
                            bacterium,
                            &thresholds.canonical_name(antibiotic),
                            reaction,
                        )
                    }
                }
            }
        }

        Ok(Self {
            thresholds,
            bacteria,
        })
    }
}

fn check_format(all_reference: &Table) -> Result<()> {
    match <&str>::try_double_key(all_reference, FORMAT, NAME) {
        Some(REFERENCE_FORMAT_NAME) => {}
        Some(other) => warn!("Reference data format is named {other}, processed anyways."),
        None => warn!("Reference data format has no name, processed anyways."),
    }
    let version = match <&str>::try_double_key(all_reference, FORMAT, VERSION) {
        Some(version_str) => Version::parse(version_str).map_err(|e| {
            AntibiogramError::ReferenceData(format!(
                "format version {version_str} could not be parsed: {e}"
            ))
        })?,
        None => {
            return Err(AntibiogramError::ReferenceData(
                "no format version recorded".to_owned(),
            ))
        }
    };
    if !VALID_VERSIONS_REFERENCE.contains(&version) {
        warn!("Reference data has undocumented format version {version}. Processed anyways.");
    }
    Ok(())
}

fn try_from_threshold_table(threshold_table: &Table) -> Option<(&str, Thresholds)> {
    let antibiotic = match <&str>::try_single_key(threshold_table, ANTIBIOTIC) {
        Some(a) => a.trim(),
        None => {
            warn!("Encountered threshold row with no antibiotic. Row skipped.");
            return None;
        }
    };
    let cutoff = |key: &str| -> Option<f64> {
        let value = <f64>::try_single_key(threshold_table, key);
        if value.is_none() {
            warn!("Threshold row for {antibiotic} has no valid {key} value. Row skipped.");
        }
        value
    };
    let thresholds = Thresholds {
        susceptible: cutoff(SUSCEPTIBLE)?,
        intermediate: cutoff(INTERMEDIATE)?,
        resistant: cutoff(RESISTANT)?,
    };
    if thresholds.intermediate > thresholds.susceptible {
        warn!(
            "Threshold row for {antibiotic} has intermediate cutoff {} above susceptible cutoff {}, intermediate category is unreachable.",
            thresholds.intermediate, thresholds.susceptible
        );
    }
    Some((antibiotic, thresholds))
}

fn try_from_reaction_table(reaction_table: &Table) -> Option<(&str, &str, Reaction)> {
    let bacterium = match <&str>::try_single_key(reaction_table, BACTERIA) {
        Some(a) => a.trim(),
        None => {
            warn!("Encountered reaction row with no bacteria name. Row skipped.");
            return None;
        }
    };
    let antibiotic = match <&str>::try_single_key(reaction_table, ANTIBIOTIC) {
        Some(a) => a.trim(),
        None => {
            warn!("Reaction row for {bacterium} has no antibiotic. Row skipped.");
            return None;
        }
    };
    match <&str>::try_single_key(reaction_table, REACTION).and_then(Reaction::from_letter) {
        Some(reaction) => Some((bacterium, antibiotic, reaction)),
        None => {
            warn!("Reaction row for {bacterium} and {antibiotic} has no valid reaction, expected S, I or R. Row skipped.");
            None
        }
    }
}
