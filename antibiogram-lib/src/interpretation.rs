//! Interpretation of inhibition zone diameters
//!
//! Larger inhibition zone means the bacteria are more susceptible to the
//! antibiotic. Category is decided by antibiotic-specific cutoffs:
//!
//! - diameter at or above `susceptible` cutoff is `Susceptible`,
//! - diameter at or above `intermediate` cutoff, but below `susceptible`
//! cutoff, is `Intermediate`,
//! - anything below is `Resistant`.
//!
//! `resistant` cutoff is reference information only.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::measurement::MeasurementStore;

/// Antibiotic cutoffs, inhibition zone diameter in mm
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    pub susceptible: f64,
    pub intermediate: f64,
    pub resistant: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThresholdTable {
    thresholds: BTreeMap<String, Thresholds>,
}

impl ThresholdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, antibiotic: &str, thresholds: Thresholds) {
        self.thresholds.insert(antibiotic.to_owned(), thresholds);
    }

    pub fn get(&self, antibiotic: &str) -> Option<&Thresholds> {
        self.thresholds.get(antibiotic)
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Thresholds)> {
        self.thresholds
            .iter()
            .map(|(antibiotic, thresholds)| (antibiotic.as_str(), thresholds))
    }

    /// Antibiotic name as it is spelled in the table.
    ///
    /// Input is trimmed. If it matches a tabulated antibiotic ignoring case,
    /// tabulated spelling is returned, otherwise the trimmed input.
    pub fn canonical_name(&self, antibiotic: &str) -> String {
        let trimmed = antibiotic.trim();
        if self.thresholds.contains_key(trimmed) {
            return trimmed.to_owned();
        }
        match self
            .thresholds
            .keys()
            .find(|known| known.eq_ignore_ascii_case(trimmed))
        {
            Some(known) => known.to_owned(),
            None => trimmed.to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Category {
    Susceptible,
    Intermediate,
    Resistant,
    Unknown,
}

impl Category {
    /// First letter of the category name.
    pub fn letter(&self) -> char {
        match self {
            Category::Susceptible => 'S',
            Category::Intermediate => 'I',
            Category::Resistant => 'R',
            Category::Unknown => 'U',
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Category::Susceptible => write!(f, "Susceptible"),
            Category::Intermediate => write!(f, "Intermediate"),
            Category::Resistant => write!(f, "Resistant"),
            Category::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub antibiotic: String,
    pub diameter: f64,
    pub category: Category,
}

pub fn classify(diameter: f64, antibiotic: &str, table: &ThresholdTable) -> Category {
    match table.get(antibiotic) {
        None => Category::Unknown,
        Some(thresholds) => {
            if diameter >= thresholds.susceptible {
                Category::Susceptible
            } else if diameter >= thresholds.intermediate {
                Category::Intermediate
            } else {
                Category::Resistant
            }
        }
    }
}

/// Classification of every stored measurement, in store order.
pub fn derive_results(store: &MeasurementStore, table: &ThresholdTable) -> Vec<ClassificationResult> {
    store
        .all()
        .iter()
        .map(|measurement| ClassificationResult {
            antibiotic: measurement.antibiotic.to_owned(),
            diameter: measurement.diameter,
            category: classify(measurement.diameter, &measurement.antibiotic, table),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn penicillin_table() -> ThresholdTable {
        let mut table = ThresholdTable::new();
        table.insert(
            "Penicillin",
            Thresholds {
                susceptible: 15.0,
                intermediate: 13.0,
                resistant: 12.0,
            },
        );
        table
    }

    #[test]
    fn boundaries() {
        let table = penicillin_table();
        assert_eq!(classify(15.0, "Penicillin", &table), Category::Susceptible);
        assert_eq!(classify(14.999, "Penicillin", &table), Category::Intermediate);
        assert_eq!(classify(13.0, "Penicillin", &table), Category::Intermediate);
        assert_eq!(classify(12.999, "Penicillin", &table), Category::Resistant);
        assert_eq!(classify(0.0, "Penicillin", &table), Category::Resistant);
        assert_eq!(classify(40.0, "Penicillin", &table), Category::Susceptible);
    }

    #[test]
    fn unknown_antibiotic() {
        let table = penicillin_table();
        assert_eq!(classify(30.0, "Vancomycin", &table), Category::Unknown);
        assert_eq!(classify(30.0, "penicillin", &table), Category::Unknown);
        assert_eq!(Category::Unknown.letter(), 'U');
    }

    #[test]
    fn canonical_names() {
        let table = penicillin_table();
        assert_eq!(table.canonical_name(" penicillin "), "Penicillin");
        assert_eq!(table.canonical_name("PENICILLIN"), "Penicillin");
        assert_eq!(table.canonical_name(" Vancomycin"), "Vancomycin");
    }

    #[test]
    fn results_follow_store_and_repeat() {
        let table = penicillin_table();
        let mut store = MeasurementStore::new();
        store.add("Penicillin", "16").unwrap();
        store.add("Vancomycin", "16").unwrap();
        store.add("Penicillin", "14").unwrap();
        store.add("Penicillin", "9").unwrap();

        let results = derive_results(&store, &table);
        let categories: Vec<Category> = results.iter().map(|result| result.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Susceptible,
                Category::Unknown,
                Category::Intermediate,
                Category::Resistant
            ]
        );
        assert_eq!(results[1].antibiotic, "Vancomycin");
        assert_eq!(results, derive_results(&store, &table));
    }

    fn rank(category: Category) -> u8 {
        match category {
            Category::Resistant => 0,
            Category::Intermediate => 1,
            Category::Susceptible => 2,
            Category::Unknown => unreachable!("antibiotic is tabulated"),
        }
    }

    proptest! {
        #[test]
        fn classification_is_monotonic(
            intermediate in 0.0f64..30.0,
            gap in 0.0f64..10.0,
            d1 in -5.0f64..50.0,
            d2 in -5.0f64..50.0,
        ) {
            let mut table = ThresholdTable::new();
            table.insert("Tetracycline", Thresholds {
                susceptible: intermediate + gap,
                intermediate,
                resistant: intermediate - 1.0,
            });
            let (low, high) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            let category_low = classify(low, "Tetracycline", &table);
            let category_high = classify(high, "Tetracycline", &table);
            prop_assert_ne!(category_low, Category::Unknown);
            prop_assert!(rank(category_low) <= rank(category_high));
        }
    }
}
