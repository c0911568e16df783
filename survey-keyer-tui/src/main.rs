use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use survey_keyer::{
    ConditionTable, FieldLayout, QuestionList, Questionnaire, RecordStore, Session,
    export_csv_to_path, merge_batches,
};
use survey_keyer_tui::cli::{Cli, Command, EntryArgs, ExportArgs, MergeArgs, QuestionnaireArgs};
use survey_keyer_tui::{EntryForm, Settings};
use tracing_subscriber::EnvFilter;

/// Log file inside the data directory while the form owns the terminal.
const LOG_FILE: &str = "survey-keyer.log";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    match &cli.command {
        Command::Entry(args) => entry(args, settings, cli.verbose),
        Command::Export(args) => {
            init_tracing(cli.verbose, None)?;
            export(args, settings)
        }
        Command::Merge(args) => {
            init_tracing(cli.verbose, None)?;
            merge(args)
        }
        Command::Check(args) => {
            init_tracing(cli.verbose, None)?;
            check(args)
        }
    }
}

/// Install the subscriber, writing to `log_path` or stderr.
fn init_tracing(verbose: bool, log_path: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn entry(args: &EntryArgs, settings: Settings, verbose: bool) -> anyhow::Result<()> {
    let settings = args.apply(settings);
    let questionnaire = args.source.load().context("loading questionnaire")?;
    std::fs::create_dir_all(&settings.data_dir)
        .with_context(|| format!("creating {}", settings.data_dir.display()))?;
    init_tracing(verbose, Some(&settings.data_dir.join(LOG_FILE)))?;

    let store = settings
        .open_store(&questionnaire.storage_key)
        .context("opening record store")?;
    tracing::info!(
        questionnaire = %questionnaire.name,
        operator = %settings.operator,
        records = store.count(),
        "starting entry"
    );
    let mut session = Session::new(&questionnaire, store, settings.session_config());
    EntryForm::new()
        .with_title(questionnaire.name.clone())
        .run(&mut session)?;
    println!(
        "{} records stored in {}",
        session.store().count(),
        session.store().path().display()
    );
    Ok(())
}

fn export(args: &ExportArgs, settings: Settings) -> anyhow::Result<()> {
    let settings = args.apply(settings);
    let questionnaire = args.source.load().context("loading questionnaire")?;
    let store = settings
        .open_store(&questionnaire.storage_key)
        .context("opening record store")?;
    let out = args.out_path(&settings.data_dir, &questionnaire.storage_key);

    let layout = FieldLayout::new(&questionnaire);
    let report = export_csv_to_path(&layout, store.all(), &out)
        .with_context(|| format!("exporting to {}", out.display()))?;
    println!(
        "Exported {} records ({} columns) to {}",
        report.rows,
        report.columns,
        out.display()
    );
    if !report.forced.is_empty() {
        println!(
            "Review {} records with answers from forced branches:",
            report.forced.len()
        );
        for id in &report.forced {
            println!("  {id}");
        }
    }
    Ok(())
}

fn merge(args: &MergeArgs) -> anyhow::Result<()> {
    let report = merge_batches(&args.inputs, &args.out)
        .with_context(|| format!("merging into {}", args.out.display()))?;
    println!(
        "Merged {} rows from {} files into {}",
        report.rows,
        report.files,
        args.out.display()
    );
    if !report.duplicates.is_empty() {
        println!(
            "{} duplicate IDs on {} rows:",
            report.duplicates.len(),
            report.duplicate_rows()
        );
        for duplicate in &report.duplicates {
            let lines: Vec<String> = duplicate.lines.iter().map(|l| l.to_string()).collect();
            println!("  {} (lines {})", duplicate.id, lines.join(", "));
        }
    }
    Ok(())
}

fn check(args: &QuestionnaireArgs) -> anyhow::Result<()> {
    let questionnaire = args.load().context("loading questionnaire")?;
    print_structure(&questionnaire);
    Ok(())
}

fn print_structure(questionnaire: &Questionnaire) {
    let table = ConditionTable::new(questionnaire);
    let list = QuestionList::new(questionnaire, &table);
    let layout = FieldLayout::new(questionnaire);

    println!(
        "{} (storage key {})",
        questionnaire.name, questionnaire.storage_key
    );
    println!(
        "{} questions, {} answer fields, {} export columns, {} conditions",
        list.len(),
        layout.fields().len(),
        layout.header().width(),
        table.len()
    );
    for entry in list.entries() {
        let indent = "  ".repeat(entry.depth + 1);
        let condition = table
            .entry_for_target(&entry.id)
            .map(|c| {
                let values: Vec<String> = c.triggers.iter().map(|v| v.to_string()).collect();
                format!("  if {} in [{}]", c.parent, values.join(","))
            })
            .unwrap_or_default();
        println!(
            "{indent}{} [{}] {}{condition}",
            entry.id,
            entry.kind.type_tag(),
            entry.title
        );
    }
    for entry in table.entries().iter().filter(|e| e.is_section) {
        let values: Vec<String> = entry.triggers.iter().map(|v| v.to_string()).collect();
        println!(
            "section {} shown if {} in [{}]",
            entry.target,
            entry.parent,
            values.join(",")
        );
    }
}
