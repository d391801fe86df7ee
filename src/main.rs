use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use antibiogram_lib::{
    error::AntibiogramError,
    interpretation::ClassificationResult,
    reference::{ReferenceData, DEFAULT_REFERENCE_FILE},
    statistics::DescriptiveStats,
    Session, OUTPUT,
};

#[derive(Parser)]
#[command(name = "Antibiogram")]
#[command(version = "0.1.0")]
#[command(
    about = "Antibiogram result analysis",
    long_about = "Interactive session for recording inhibition zone diameters, interpreting them against antibiotic thresholds, comparing antibiotics and matching reference bacteria"
)]
struct Cli {
    /// Reference data file with antibiotic thresholds and bacteria reactions
    #[arg(short, long, env = "ANTIBIOGRAM_REFERENCE", default_value = DEFAULT_REFERENCE_FILE)]
    reference: PathBuf,

    /// Directory for exported graphs and summaries
    #[arg(short, long, env = "ANTIBIOGRAM_OUTPUT", default_value = OUTPUT)]
    output: PathBuf,
}

/// Single line typed in the session
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add inhibition zone diameter measured for antibiotic
    Add {
        /// Antibiotic name
        antibiotic: String,

        /// Inhibition zone diameter, mm
        #[arg(allow_hyphen_values = true)]
        diameter: String,
    },

    /// Show all measurements with interpretation
    Results,

    /// Show mean and standard deviations of measured diameters
    ///
    /// All measurements are used unless antibiotic is specified
    Stats {
        /// Antibiotic name
        antibiotic: Option<String>,
    },

    /// Show statistics separately for each measured antibiotic
    StatsAll,

    /// Compare diameters measured for two antibiotics with Welch t-test
    ///
    /// Each antibiotic needs at least two measurements
    Compare {
        antibiotic1: String,
        antibiotic2: String,
    },

    /// Find reference bacterium best matching the measured pattern
    Match,

    /// Show reference thresholds for antibiotic
    Thresholds {
        /// Antibiotic name
        antibiotic: String,
    },

    /// Plot measurements as svg bar chart
    Plot,

    /// Export session summary in toml format
    Summary,

    /// Remove all measurements
    Clear,

    /// End session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Eq, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

const NO_DATA: &str = "No data available.";

pub fn execute(session: &mut Session, command: Command, output: &Path) -> Reply {
    let text = match command {
        Command::Add {
            antibiotic,
            diameter,
        } => match session.add(&antibiotic, &diameter) {
            Ok(_) => results_table(&session.results()),
            Err(AntibiogramError::InvalidDiameter { .. }) => {
                "Error: Invalid diameter value.".to_owned()
            }
            Err(e) => format!("Error: {e}"),
        },
        Command::Results => {
            let results = session.results();
            if results.is_empty() {
                NO_DATA.to_owned()
            } else {
                results_table(&results)
            }
        }
        Command::Stats { antibiotic } => {
            let statistics = match antibiotic {
                Some(antibiotic) => session.statistics_for(&antibiotic),
                None => session.statistics(),
            };
            match statistics {
                Ok(statistics) => statistics_message(&statistics),
                Err(_) => NO_DATA.to_owned(),
            }
        }
        Command::StatsAll => {
            let by_antibiotic = session.statistics_by_antibiotic();
            if by_antibiotic.is_empty() {
                NO_DATA.to_owned()
            } else {
                by_antibiotic
                    .iter()
                    .map(|element| {
                        format!(
                            "{} ({} measurements)\n{}",
                            element.antibiotic,
                            element.statistics.count,
                            statistics_message(&element.statistics)
                        )
                    })
                    .collect::<Vec<String>>()
                    .join("\n\n")
            }
        }
        Command::Compare {
            antibiotic1,
            antibiotic2,
        } => match session.compare(&antibiotic1, &antibiotic2) {
            Ok(test) => format!(
                "T-statistic: {:.3}\nP-value: {:.4}\nDegrees of freedom: {:.2}",
                test.t_statistic, test.p_value, test.degrees_of_freedom
            ),
            Err(AntibiogramError::InsufficientData { .. }) => {
                "Not enough data for comparison.".to_owned()
            }
            Err(e) => format!("Error: {e}"),
        },
        Command::Match => session.match_bacteria().to_string(),
        Command::Thresholds { antibiotic } => match session.thresholds(&antibiotic) {
            Ok(thresholds) => format!(
                "{}: susceptible >= {} mm, intermediate >= {} mm, resistant <= {} mm",
                session.reference().thresholds.canonical_name(&antibiotic),
                thresholds.susceptible,
                thresholds.intermediate,
                thresholds.resistant
            ),
            Err(e) => format!("Error: {e}"),
        },
        Command::Plot => match session.plot(output) {
            Ok(output_name) => format!("Graph written to {}", output_name.display()),
            Err(AntibiogramError::InsufficientData { .. }) => NO_DATA.to_owned(),
            Err(e) => format!("Error: {e}"),
        },
        Command::Summary => match session.export_summary(output) {
            Ok(output_name) => format!("Summary written to {}", output_name.display()),
            Err(e) => format!("Error: {e}"),
        },
        Command::Clear => {
            session.clear();
            "All measurements cleared.".to_owned()
        }
        Command::Quit => return Reply::Quit,
    };
    Reply::Text(text)
}

fn statistics_message(statistics: &DescriptiveStats) -> String {
    let sample_std = match statistics.sample_std {
        Some(sample_std) => format!("{sample_std:.2} mm"),
        None if statistics.count == 1 => "undefined for a single measurement".to_owned(),
        None => "out of numeric range".to_owned(),
    };
    format!(
        "Mean Diameter: {:.2} mm\nStandard Deviation (population): {:.2} mm\nStandard Deviation (sample): {sample_std}",
        statistics.mean, statistics.population_std
    )
}

/// Row of results table
#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Antibiotic")]
    antibiotic: String,
    #[tabled(rename = "Diameter")]
    diameter: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&ClassificationResult> for ResultRow {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            antibiotic: result.antibiotic.to_owned(),
            diameter: format!("{:.1}", result.diameter),
            result: result.category.to_string(),
        }
    }
}

fn results_table(results: &[ClassificationResult]) -> String {
    Table::new(results.iter().map(ResultRow::from)).to_string()
}

/// Split typed line into words, double quotes group words with spaces.
fn split_line(line: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if has_word {
        words.push(current);
    }
    words
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let reference = if cli.reference.exists() {
        ReferenceData::from_file(&cli.reference).with_context(|| {
            format!(
                "Error loading reference data from {}",
                cli.reference.display()
            )
        })?
    } else {
        warn!(
            "Reference file {} not found, using built-in thresholds and no bacteria profiles.",
            cli.reference.display()
        );
        ReferenceData::default()
    };
    let mut session = Session::new(reference);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("Antibiogram session. Type `help` for available commands.");
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words = split_line(&line);
        if words.is_empty() {
            continue;
        }
        match Line::try_parse_from(words) {
            Ok(parsed) => match execute(&mut session, parsed.command, &cli.output) {
                Reply::Text(text) => println!("{text}"),
                Reply::Quit => break,
            },
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> Reply {
        let parsed = Line::try_parse_from(split_line(line)).unwrap();
        execute(session, parsed.command, &std::env::temp_dir().join("antibiogram_shell"))
    }

    fn text(session: &mut Session, line: &str) -> String {
        match run(session, line) {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit on `{line}`"),
        }
    }

    #[test]
    fn split_words_and_quotes() {
        assert_eq!(split_line("  add  Penicillin 14 \n"), vec!["add", "Penicillin", "14"]);
        assert_eq!(
            split_line(r#"add "Penicillin G" 14"#),
            vec!["add", "Penicillin G", "14"]
        );
        assert_eq!(split_line(r#"add "" 14"#), vec!["add", "", "14"]);
        assert!(split_line("   ").is_empty());
    }

    #[test]
    fn add_and_results() {
        let mut session = Session::new(ReferenceData::default());
        assert_eq!(text(&mut session, "results"), NO_DATA);
        let table = text(&mut session, "add penicillin 16");
        assert!(table.contains("Antibiotic"));
        assert!(table.contains("Diameter"));
        assert!(table.contains("Result"));
        assert!(table.contains("Penicillin"));
        assert!(table.contains("16.0"));
        assert!(table.contains("Susceptible"));

        assert_eq!(
            text(&mut session, "add Penicillin wide"),
            "Error: Invalid diameter value."
        );
        let table = text(&mut session, "add Penicillin -3");
        assert_eq!(table.matches("Penicillin").count(), 2);
        let last_row = table
            .lines()
            .filter(|line| line.contains("Penicillin"))
            .last()
            .unwrap();
        assert!(last_row.contains("-3.0"));
        assert!(last_row.contains("Resistant"));
    }

    #[test]
    fn statistics_messages() {
        let mut session = Session::new(ReferenceData::default());
        assert_eq!(text(&mut session, "stats"), NO_DATA);
        text(&mut session, "add Cefazolin 20");
        assert!(text(&mut session, "stats").contains("undefined for a single measurement"));
        text(&mut session, "add Cefazolin 22");
        text(&mut session, "add Gentamicin 18");
        let message = text(&mut session, "stats");
        assert!(message.contains("Mean Diameter: 20.00 mm"));
        assert!(message.contains("Standard Deviation (population): 1.63 mm"));
        assert!(message.contains("Standard Deviation (sample): 2.00 mm"));
        assert!(text(&mut session, "stats cefazolin").contains("Mean Diameter: 21.00 mm"));
        assert!(text(&mut session, "stats-all").contains("Gentamicin (1 measurements)"));

        text(&mut session, "clear");
        text(&mut session, "add Cefazolin 1.7976931348623157e308");
        text(&mut session, "add Cefazolin -1.7976931348623157e308");
        let message = text(&mut session, "stats");
        assert!(message.contains("Mean Diameter: 0.00 mm"));
        assert!(message.contains("Standard Deviation (sample): out of numeric range"));
    }

    #[test]
    fn comparison_messages() {
        let mut session = Session::new(ReferenceData::default());
        text(&mut session, "add Gentamicin 20");
        assert_eq!(
            text(&mut session, "compare Gentamicin Penicillin"),
            "Not enough data for comparison."
        );
        for line in [
            "add Gentamicin 21",
            "add Gentamicin 22",
            "add Penicillin 10",
            "add Penicillin 11",
            "add Penicillin 12",
        ] {
            text(&mut session, line);
        }
        let message = text(&mut session, "compare Gentamicin Penicillin");
        assert!(message.starts_with("T-statistic: 12.247"));
        assert!(message.contains("P-value: 0.0003"));
    }

    #[test]
    fn other_commands() {
        let mut session = Session::new(ReferenceData::default());
        assert_eq!(
            text(&mut session, "match"),
            "No measurement data to match."
        );
        text(&mut session, "add Penicillin 10");
        assert_eq!(
            text(&mut session, "match"),
            "No matching bacteria data available."
        );
        assert_eq!(
            text(&mut session, "thresholds erythromycin"),
            "Erythromycin: susceptible >= 18 mm, intermediate >= 14 mm, resistant <= 13 mm"
        );
        assert!(text(&mut session, "thresholds Vancomycin").starts_with("Error:"));
        assert!(text(&mut session, "summary").starts_with("Summary written to"));
        assert_eq!(text(&mut session, "clear"), "All measurements cleared.");
        assert_eq!(text(&mut session, "results"), NO_DATA);
        assert_eq!(text(&mut session, "plot"), NO_DATA);
        assert_eq!(run(&mut session, "quit"), Reply::Quit);
        assert_eq!(run(&mut session, "exit"), Reply::Quit);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Line::try_parse_from(split_line("measure Penicillin 14")).is_err());
        assert!(Line::try_parse_from(split_line("add Penicillin")).is_err());
    }
}
