//! Best matching bacterium for the observed susceptibility pattern
//!
//! Each reference bacterium scores one point for every measured antibiotic
//! with observed category letter equal to the expected reaction letter.
//! Antibiotics not listed for the bacterium do not affect its score. If the
//! same antibiotic was measured more than once, only the latest result
//! counts.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::interpretation::ClassificationResult;

/// Scores up to this value are reported as low confidence matches
pub const LOW_CONFIDENCE_MAX_SCORE: usize = 2;

/// Expected bacterium reaction to antibiotic
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reaction {
    Susceptible,
    Intermediate,
    Resistant,
}

impl Reaction {
    /// Parse reaction letter, case-insensitive.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Reaction::Susceptible),
            "I" => Some(Reaction::Intermediate),
            "R" => Some(Reaction::Resistant),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Reaction::Susceptible => 'S',
            Reaction::Intermediate => 'I',
            Reaction::Resistant => 'R',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BacteriumProfile {
    pub name: String,
    pub reactions: Vec<(String, Reaction)>,
}

impl BacteriumProfile {
    pub fn expected(&self, antibiotic: &str) -> Option<Reaction> {
        self.reactions
            .iter()
            .find(|(known, _)| known == antibiotic)
            .map(|(_, reaction)| *reaction)
    }

    fn score(&self, observed: &HashMap<&str, char>) -> usize {
        self.reactions
            .iter()
            .filter(|(antibiotic, reaction)| match observed.get(antibiotic.as_str()) {
                Some(letter) => letter.eq_ignore_ascii_case(&reaction.letter()),
                None => false,
            })
            .count()
    }
}

/// Bacteria reaction profiles, in order of first appearance in reference
/// data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BacteriaReferenceTable {
    profiles: Vec<BacteriumProfile>,
}

impl BacteriaReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record expected reaction; repeated bacterium-antibiotic pair replaces
    /// the earlier reaction.
    pub fn insert(&mut self, bacterium: &str, antibiotic: &str, reaction: Reaction) {
        let position = self
            .profiles
            .iter()
            .position(|profile| profile.name == bacterium);
        let index = match position {
            Some(index) => index,
            None => {
                self.profiles.push(BacteriumProfile {
                    name: bacterium.to_owned(),
                    reactions: Vec::new(),
                });
                self.profiles.len() - 1
            }
        };
        let profile = &mut self.profiles[index];
        match profile
            .reactions
            .iter_mut()
            .find(|(known, _)| known == antibiotic)
        {
            Some(entry) => entry.1 = reaction,
            None => profile.reactions.push((antibiotic.to_owned(), reaction)),
        }
    }

    pub fn profiles(&self) -> &[BacteriumProfile] {
        &self.profiles
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchOutcome {
    NoMeasurementData,
    NoReferenceData,
    NotEnoughData,
    LowConfidence { bacterium: String, score: usize },
    Match { bacterium: String, score: usize },
}

impl MatchOutcome {
    pub fn bacterium(&self) -> Option<&str> {
        match self {
            MatchOutcome::LowConfidence { bacterium, .. } | MatchOutcome::Match { bacterium, .. } => {
                Some(bacterium.as_str())
            }
            _ => None,
        }
    }
}

impl Display for MatchOutcome {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            MatchOutcome::NoMeasurementData => write!(f, "No measurement data to match."),
            MatchOutcome::NoReferenceData => write!(f, "No matching bacteria data available."),
            MatchOutcome::NotEnoughData => {
                write!(f, "Not enough data to determine a matching bacterium.")
            }
            MatchOutcome::LowConfidence { bacterium, score } => write!(
                f,
                "Possible match: {bacterium} (score {score}), low confidence, measure more antibiotics"
            ),
            MatchOutcome::Match { bacterium, score } => {
                write!(f, "Best match: {bacterium} (score {score})")
            }
        }
    }
}

pub fn match_bacteria(
    results: &[ClassificationResult],
    reference: &BacteriaReferenceTable,
) -> MatchOutcome {
    if results.is_empty() {
        return MatchOutcome::NoMeasurementData;
    }

    let mut observed: HashMap<&str, char> = HashMap::new();
    for result in results.iter() {
        observed.insert(result.antibiotic.as_str(), result.category.letter());
    }

    let mut best: Option<(&BacteriumProfile, usize)> = None;
    for profile in reference.profiles.iter() {
        let score = profile.score(&observed);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((profile, score));
        }
    }

    match best {
        None => MatchOutcome::NoReferenceData,
        Some((_, 0)) => MatchOutcome::NotEnoughData,
        Some((profile, score)) if score <= LOW_CONFIDENCE_MAX_SCORE => {
            MatchOutcome::LowConfidence {
                bacterium: profile.name.to_owned(),
                score,
            }
        }
        Some((profile, score)) => MatchOutcome::Match {
            bacterium: profile.name.to_owned(),
            score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::Category;

    fn result(antibiotic: &str, category: Category) -> ClassificationResult {
        ClassificationResult {
            antibiotic: antibiotic.to_owned(),
            diameter: 0.0,
            category,
        }
    }

    fn table(rows: &[(&str, &str, &str)]) -> BacteriaReferenceTable {
        let mut table = BacteriaReferenceTable::new();
        for (bacterium, antibiotic, letter) in rows {
            table.insert(bacterium, antibiotic, Reaction::from_letter(letter).unwrap());
        }
        table
    }

    #[test]
    fn reaction_letters() {
        assert_eq!(Reaction::from_letter("s"), Some(Reaction::Susceptible));
        assert_eq!(Reaction::from_letter(" I "), Some(Reaction::Intermediate));
        assert_eq!(Reaction::from_letter("R"), Some(Reaction::Resistant));
        assert_eq!(Reaction::from_letter("U"), None);
        assert_eq!(Reaction::from_letter("Resistant"), None);
    }

    #[test]
    fn low_confidence_best() {
        let results = vec![
            result("Penicillin", Category::Resistant),
            result("Gentamicin", Category::Susceptible),
        ];
        let reference = table(&[
            ("X", "Penicillin", "R"),
            ("X", "Gentamicin", "S"),
            ("Y", "Penicillin", "R"),
            ("Y", "Gentamicin", "R"),
        ]);
        let outcome = match_bacteria(&results, &reference);
        assert_eq!(
            outcome,
            MatchOutcome::LowConfidence {
                bacterium: "X".to_owned(),
                score: 2
            }
        );
        assert!(outcome.to_string().contains("X (score 2)"));
        assert!(outcome.to_string().contains("low confidence"));
    }

    #[test]
    fn confident_match() {
        let results = vec![
            result("Penicillin", Category::Resistant),
            result("Gentamicin", Category::Susceptible),
            result("Cefazolin", Category::Intermediate),
        ];
        let reference = table(&[
            ("Y", "Penicillin", "R"),
            ("X", "Penicillin", "r"),
            ("X", "Gentamicin", "s"),
            ("X", "Cefazolin", "i"),
            ("X", "Tetracycline", "R"),
        ]);
        assert_eq!(
            match_bacteria(&results, &reference).to_string(),
            "Best match: X (score 3)"
        );
    }

    #[test]
    fn empty_inputs() {
        let reference = table(&[("X", "Penicillin", "R")]);
        assert_eq!(
            match_bacteria(&[], &reference),
            MatchOutcome::NoMeasurementData
        );
        assert_eq!(
            match_bacteria(&[], &BacteriaReferenceTable::new()),
            MatchOutcome::NoMeasurementData
        );
        assert_eq!(
            match_bacteria(
                &[result("Penicillin", Category::Resistant)],
                &BacteriaReferenceTable::new()
            ),
            MatchOutcome::NoReferenceData
        );
    }

    #[test]
    fn zero_score() {
        let results = vec![
            result("Penicillin", Category::Susceptible),
            result("Vancomycin", Category::Unknown),
        ];
        let reference = table(&[("X", "Penicillin", "R"), ("Y", "Gentamicin", "S")]);
        assert_eq!(
            match_bacteria(&results, &reference),
            MatchOutcome::NotEnoughData
        );
    }

    #[test]
    fn ties_go_to_first_bacterium() {
        let results = vec![result("Penicillin", Category::Resistant)];
        let reference = table(&[
            ("Z", "Gentamicin", "S"),
            ("Y", "Penicillin", "R"),
            ("X", "Penicillin", "R"),
        ]);
        assert_eq!(
            match_bacteria(&results, &reference).bacterium(),
            Some("Y")
        );
    }

    #[test]
    fn latest_measurement_wins() {
        let results = vec![
            result("Penicillin", Category::Resistant),
            result("Penicillin", Category::Susceptible),
        ];
        let reference = table(&[("R-type", "Penicillin", "R"), ("S-type", "Penicillin", "S")]);
        assert_eq!(
            match_bacteria(&results, &reference).bacterium(),
            Some("S-type")
        );
    }

    #[test]
    fn repeated_reference_row_replaces() {
        let reference = table(&[
            ("X", "Penicillin", "R"),
            ("Y", "Penicillin", "S"),
            ("X", "Penicillin", "S"),
        ]);
        assert_eq!(reference.len(), 2);
        assert_eq!(
            reference.profiles()[0].expected("Penicillin"),
            Some(Reaction::Susceptible)
        );
        assert_eq!(reference.profiles()[0].reactions.len(), 1);
    }
}
