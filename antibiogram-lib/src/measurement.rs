//! Session measurement store
//!
//! Inhibition zone diameters, mm, recorded in the order they were entered.
//! Entries are never edited, the whole store could only be cleared.

use itertools::Itertools;
use serde::Serialize;

use crate::error::{AntibiogramError, Result};

/// Single inhibition zone measurement
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub antibiotic: String,

    /// Inhibition zone diameter, mm
    pub diameter: f64,
}

#[derive(Clone, Debug, Default)]
pub struct MeasurementStore {
    measurements: Vec<Measurement>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement if `raw_diameter` is a finite number.
    ///
    /// Store remains unchanged on error. Antibiotic name is not checked here,
    /// antibiotics without thresholds are interpreted as unknown later on.
    pub fn add(&mut self, antibiotic: &str, raw_diameter: &str) -> Result<&Measurement> {
        let diameter = parse_diameter(raw_diameter)?;
        let index = self.measurements.len();
        self.measurements.push(Measurement {
            antibiotic: antibiotic.to_owned(),
            diameter,
        });
        Ok(&self.measurements[index])
    }

    pub fn clear(&mut self) {
        self.measurements.clear()
    }

    pub fn all(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Diameters recorded for the antibiotic, exact name match.
    pub fn diameters_for(&self, antibiotic: &str) -> Vec<f64> {
        self.measurements
            .iter()
            .filter(|measurement| measurement.antibiotic == antibiotic)
            .map(|measurement| measurement.diameter)
            .collect()
    }

    pub fn diameters(&self) -> Vec<f64> {
        self.measurements
            .iter()
            .map(|measurement| measurement.diameter)
            .collect()
    }

    /// Distinct antibiotic names, in order of first appearance
    pub fn antibiotics(&self) -> Vec<&str> {
        self.measurements
            .iter()
            .map(|measurement| measurement.antibiotic.as_str())
            .unique()
            .collect()
    }
}

fn parse_diameter(raw_diameter: &str) -> Result<f64> {
    match raw_diameter.trim().parse::<f64>() {
        Ok(diameter) if diameter.is_finite() => Ok(diameter),
        _ => Err(AntibiogramError::InvalidDiameter {
            raw: raw_diameter.to_owned(),
        }),
    }
}
