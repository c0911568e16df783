//! Command line arguments of the `survey-keyer` binary.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use survey_keyer::{DefinitionError, Questionnaire};
use thiserror::Error;

use crate::Settings;

/// Keyboard-driven transcription of paper questionnaires.
#[derive(Parser, Debug, Clone)]
#[command(name = "survey-keyer", author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ./survey-keyer.toml when present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Key records into the terminal entry form.
    Entry(EntryArgs),

    /// Export stored records as CSV with the multi-row header.
    Export(ExportArgs),

    /// Merge exported CSV batches and report duplicate IDs.
    Merge(MergeArgs),

    /// Validate a questionnaire and print its structure.
    Check(QuestionnaireArgs),
}

/// Where the questionnaire comes from.
#[derive(Args, Debug, Clone)]
pub struct QuestionnaireArgs {
    /// Questionnaire definition (JSON).
    #[arg(short, long, required_unless_present = "bundled")]
    pub questionnaire: Option<PathBuf>,

    /// Use a bundled questionnaire instead (commute, library).
    #[arg(long, conflicts_with = "questionnaire")]
    pub bundled: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    #[command(flatten)]
    pub source: QuestionnaireArgs,

    /// Operator name written into records.
    #[arg(long)]
    pub operator: Option<String>,

    /// Directory holding record stores and the log.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Start with every conditional question shown.
    #[arg(long)]
    pub show_all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: QuestionnaireArgs,

    /// Directory holding the record store.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Output file (defaults to <data_dir>/<storage key>.csv).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Exported CSV files, merged in the order given.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Merged output file.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Error type for resolving a questionnaire argument.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unknown bundled questionnaire '{0}' (expected one of: {names})", names = example_questionnaires::NAMES.join(", "))]
    UnknownBundled(String),

    #[error("No questionnaire given")]
    Missing,

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl QuestionnaireArgs {
    /// Load the selected questionnaire.
    pub fn load(&self) -> Result<Questionnaire, SourceError> {
        if let Some(name) = &self.bundled {
            return example_questionnaires::by_name(name)
                .ok_or_else(|| SourceError::UnknownBundled(name.clone()));
        }
        let path = self.questionnaire.as_deref().ok_or(SourceError::Missing)?;
        Ok(Questionnaire::from_path(path)?)
    }
}

impl EntryArgs {
    /// File settings with this command's flags applied.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(operator) = &self.operator {
            settings.operator = operator.clone();
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if self.show_all {
            settings.show_all = true;
        }
        settings
    }
}

impl ExportArgs {
    /// File settings with this command's flags applied.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        settings
    }

    /// The CSV file to write for a questionnaire.
    pub fn out_path(&self, data_dir: &Path, storage_key: &str) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| data_dir.join(format!("{storage_key}.csv")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn entry_flags_override_settings() {
        let cli = Cli::parse_from([
            "survey-keyer",
            "entry",
            "--bundled",
            "commute",
            "--operator",
            "kato",
            "--show-all",
        ]);
        let Command::Entry(args) = cli.command else {
            panic!("expected entry");
        };
        let settings = args.apply(Settings {
            operator: "file".to_string(),
            ..Settings::default()
        });
        assert_eq!(settings.operator, "kato");
        assert!(settings.show_all);
        assert_eq!(settings.data_dir, PathBuf::from("./data"));
        assert_eq!(args.source.load().unwrap().storage_key, "commute-2026");
    }

    #[test]
    fn questionnaire_source_is_required() {
        assert!(Cli::try_parse_from(["survey-keyer", "check"]).is_err());
        assert!(
            Cli::try_parse_from([
                "survey-keyer",
                "check",
                "-q",
                "a.json",
                "--bundled",
                "commute"
            ])
            .is_err()
        );
    }

    #[test]
    fn unknown_bundled_name_is_reported() {
        let args = QuestionnaireArgs {
            questionnaire: None,
            bundled: Some("census".to_string()),
        };
        let err = args.load().unwrap_err();
        assert!(err.to_string().contains("commute, library"));
    }

    #[test]
    fn export_defaults_to_data_dir() {
        let cli = Cli::parse_from(["survey-keyer", "export", "--bundled", "library"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(
            args.out_path(Path::new("data"), "library-visit"),
            PathBuf::from("data/library-visit.csv")
        );
    }
}
