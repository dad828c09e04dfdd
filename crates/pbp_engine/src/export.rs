use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use pbp_core::{AggregateResult, FromTable, Table, TableError, TableRow};
use serde_json::json;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub stage: String,
    pub success_rows: usize,
    pub failure_rows: usize,
    pub success_path: PathBuf,
    pub failure_path: PathBuf,
    pub manifest_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("malformed csv at line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("table error: {0}")]
    Table(#[from] TableError),
}

pub fn success_filename(stage: &str) -> String {
    format!("{stage}.csv")
}

pub fn failure_filename(stage: &str) -> String {
    format!("{stage}_failures.csv")
}

pub fn manifest_filename(stage: &str) -> String {
    format!("{stage}_manifest.json")
}

/// Write the success and failure tables of one stage plus a manifest
/// describing them.
pub fn export_stage<R: TableRow>(
    output_dir: &Path,
    stage: &str,
    result: &AggregateResult<R>,
) -> Result<ExportSummary, ExportError> {
    let writer = AtomicFileWriter::new(output_dir)?;
    let successes = result.success_table();
    let failures = result.failure_table();

    let success_path = writer.write(&success_filename(stage), &to_csv(&successes))?;
    let failure_path = writer.write(&failure_filename(stage), &to_csv(&failures))?;

    let manifest = json!({
        "stage": stage,
        "success": {
            "file": success_filename(stage),
            "rows": successes.len(),
            "columns": successes.columns,
        },
        "failure": {
            "file": failure_filename(stage),
            "rows": failures.len(),
            "columns": failures.columns,
        },
    });
    let manifest_path = writer.write(&manifest_filename(stage), &manifest.to_string())?;

    engine_info!(
        "exported {}: {} rows, {} failures to {}",
        stage,
        successes.len(),
        failures.len(),
        output_dir.display()
    );
    Ok(ExportSummary {
        stage: stage.to_string(),
        success_rows: successes.len(),
        failure_rows: failures.len(),
        success_path,
        failure_path,
        manifest_path,
    })
}

/// Render a table as CSV with a header line. Fields are quoted only when
/// they need it.
pub fn to_csv(table: &Table) -> String {
    let mut out = String::new();
    push_record(&mut out, &table.columns);
    for row in &table.rows {
        push_record(&mut out, row);
    }
    out
}

fn push_record(out: &mut String, fields: &[String]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

pub fn read_table(path: &Path) -> Result<Table, ExportError> {
    parse_csv(&fs::read_to_string(path)?)
}

/// Read a previously exported table back as units of the next stage.
pub fn read_units<R: FromTable>(path: &Path) -> Result<Vec<R>, ExportError> {
    Ok(read_table(path)?.decode()?)
}

/// Parse CSV produced by [`to_csv`]; the first record is the header.
/// Quoted fields may span lines.
pub fn parse_csv(text: &str) -> Result<Table, ExportError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                return Err(ExportError::Csv {
                    line,
                    message: "quote inside an unquoted field".into(),
                })
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                line += 1;
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(ExportError::Csv {
            line,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    let mut records = records.into_iter();
    let columns = records.next().ok_or(ExportError::Csv {
        line: 1,
        message: "missing header".into(),
    })?;
    Ok(Table {
        columns,
        rows: records.collect(),
    })
}
