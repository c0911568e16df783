//! CSV export of stored records and merging of exported batches.
//!
//! Exported files start with four header rows (sections, titles, option
//! marks, machine keys) followed by one row per record. Files are written
//! with a UTF-8 byte order mark so spreadsheet programs pick the right
//! encoding for the Japanese header labels.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{AnswerRecord, ColumnKind, FieldLayout};

/// Number of header rows in an exported file.
pub const HEADER_ROWS: usize = 4;

const BOM: &str = "\u{feff}";

/// Errors while exporting or merging.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A file could not be opened or created.
    #[error("Cannot access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or parsing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A batch is shorter than the header block.
    #[error("'{0}' has no export header")]
    MissingHeader(PathBuf),

    /// A batch was exported from a different questionnaire layout.
    #[error("'{path}' has a different column layout than '{expected_from}'")]
    HeaderMismatch { path: PathBuf, expected_from: PathBuf },

    /// Nothing to merge.
    #[error("No batches given")]
    NoInput,
}

/// Summary of an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Data rows written.
    pub rows: usize,

    /// Columns per row.
    pub columns: usize,

    /// Ids of records holding answers from forced branches.
    pub forced: Vec<String>,
}

/// Write records as CSV with the multi-row header.
pub fn export_csv<W: Write>(
    layout: &FieldLayout,
    records: &[AnswerRecord],
    writer: W,
) -> Result<ExportReport, ExportError> {
    let header = layout.header();
    let mut csv = csv::WriterBuilder::new().from_writer(writer);
    for row in header.rows() {
        csv.write_record(&row)?;
    }

    let mut report = ExportReport {
        columns: header.width(),
        ..ExportReport::default()
    };
    for record in records {
        let row: Vec<String> = header.columns.iter().map(|c| cell(record, c)).collect();
        csv.write_record(&row)?;
        report.rows += 1;
        if record.has_forced_answers() {
            tracing::warn!(
                id = %record.id,
                fields = ?record.forced,
                "record holds answers from forced branches"
            );
            report.forced.push(record.id.clone());
        }
    }
    csv.flush().map_err(csv::Error::from)?;
    tracing::info!(rows = report.rows, columns = report.columns, "exported records");
    Ok(report)
}

/// Export records into a new file at `path`.
pub fn export_csv_to_path(
    layout: &FieldLayout,
    records: &[AnswerRecord],
    path: &Path,
) -> Result<ExportReport, ExportError> {
    let file = create_with_bom(path)?;
    export_csv(layout, records, file)
}

fn cell(record: &AnswerRecord, column: &ColumnKind) -> String {
    match column {
        ColumnKind::Plain(key) => record.cell(key).to_string(),
        ColumnKind::Other(field) => record.value(field).to_string(),
        ColumnKind::Option { field, value } => {
            let wanted = value.to_string();
            let selected = record
                .value(field)
                .split(',')
                .any(|part| part.trim() == wanted);
            if selected {
                "1".to_string()
            } else {
                String::new()
            }
        }
    }
}

fn create_with_bom(path: &Path) -> Result<File, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_err)?;
    file.write_all(BOM.as_bytes()).map_err(io_err)?;
    Ok(file)
}

/// An id shared by several merged rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,

    /// 1-based line numbers in the merged file.
    pub lines: Vec<usize>,
}

/// Summary of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Input files read.
    pub files: usize,

    /// Data rows written.
    pub rows: usize,

    /// Ids occurring on more than one row, by first occurrence.
    pub duplicates: Vec<DuplicateId>,
}

impl MergeReport {
    /// Number of rows involved in a duplicate.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicates.iter().map(|d| d.lines.len()).sum()
    }
}

struct Batch {
    header: Vec<Vec<String>>,
    rows: Vec<Vec<String>>,
}

fn read_batch(path: &Path) -> Result<Batch, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    if rows.len() < HEADER_ROWS {
        return Err(ExportError::MissingHeader(path.to_path_buf()));
    }
    if let Some(first) = rows.first_mut().and_then(|r| r.first_mut())
        && let Some(stripped) = first.strip_prefix(BOM)
    {
        *first = stripped.to_string();
    }
    let data = rows.split_off(HEADER_ROWS);
    let data = data
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .collect();
    Ok(Batch { header: rows, rows: data })
}

/// Concatenate exported batches into one file with a single header and
/// report ids that occur on more than one row.
pub fn merge_batches(inputs: &[PathBuf], output: &Path) -> Result<MergeReport, ExportError> {
    let Some(first_path) = inputs.first() else {
        return Err(ExportError::NoInput);
    };
    let first = read_batch(first_path)?;
    let keys = &first.header[HEADER_ROWS - 1];
    let width = keys.len();

    let mut rows = first.rows.clone();
    for path in &inputs[1..] {
        let batch = read_batch(path)?;
        if batch.header[HEADER_ROWS - 1] != *keys {
            return Err(ExportError::HeaderMismatch {
                path: path.clone(),
                expected_from: first_path.clone(),
            });
        }
        rows.extend(batch.rows);
    }

    let mut by_id: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let id = row.first().map(|c| c.trim()).unwrap_or("");
        if !id.is_empty() {
            by_id
                .entry(id.to_string())
                .or_default()
                .push(HEADER_ROWS + i + 1);
        }
    }
    let mut duplicates: Vec<DuplicateId> = by_id
        .into_iter()
        .filter(|(_, lines)| lines.len() > 1)
        .map(|(id, lines)| DuplicateId { id, lines })
        .collect();
    duplicates.sort_by_key(|d| d.lines[0]);
    for dup in &duplicates {
        tracing::warn!(id = %dup.id, lines = ?dup.lines, "duplicate id in merged batches");
    }

    let file = create_with_bom(output)?;
    let mut csv = csv::WriterBuilder::new().from_writer(file);
    for row in &first.header {
        csv.write_record(pad(row, width))?;
    }
    for row in &rows {
        csv.write_record(pad(row, width))?;
    }
    csv.flush().map_err(csv::Error::from)?;

    let report = MergeReport {
        files: inputs.len(),
        rows: rows.len(),
        duplicates,
    };
    tracing::info!(
        files = report.files,
        rows = report.rows,
        duplicates = report.duplicate_rows(),
        output = %output.display(),
        "merged batches"
    );
    Ok(report)
}

fn pad(row: &[String], width: usize) -> Vec<&str> {
    (0..width)
        .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
        .collect()
}
