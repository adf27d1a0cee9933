use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};
use sift_core::FieldValue;
use sift_records::{NormalizedRecord, RawRecord};
use sift_records::record::DATE_PART_COLUMNS;

/// Path meaning stdin or stdout
pub const STDIO: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    Jsonl,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Format::Csv),
            "jsonl" | "ndjson" => Some(Format::Jsonl),
            _ => None,
        }
    }

    /// Explicit choice first, then the file extension, then CSV
    pub fn resolve(explicit: Option<Format>, path: &Path) -> Format {
        explicit
            .or_else(|| Format::from_path(path))
            .unwrap_or(Format::Csv)
    }
}

/// Rows in input order plus the column names in first-seen order
#[derive(Debug, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl Table {
    fn add_column(&mut self, seen: &mut HashSet<String>, name: &str) {
        if seen.insert(name.to_string()) {
            self.columns.push(name.to_string());
        }
    }
}

pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path.as_os_str() == STDIO {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn open_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path.as_os_str() == STDIO {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

pub fn read_table(reader: impl BufRead, format: Format) -> anyhow::Result<Table> {
    match format {
        Format::Csv => read_csv(reader),
        Format::Jsonl => read_jsonl(reader),
    }
}

pub fn write_table(
    writer: impl Write,
    format: Format,
    columns: &[String],
    records: &[NormalizedRecord],
) -> anyhow::Result<()> {
    match format {
        Format::Csv => write_csv(writer, columns, records),
        Format::Jsonl => write_jsonl(writer, columns, records),
    }
}

/// Header row required; an empty cell is a missing value
pub fn read_csv(reader: impl Read) -> anyhow::Result<Table> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::default();
    let mut seen = HashSet::new();
    for header in &headers {
        table.add_column(&mut seen, header);
    }

    for (row, result) in reader.records().enumerate() {
        let cells = result.with_context(|| format!("Malformed CSV row {}", row + 1))?;
        let mut record = RawRecord::default();
        for (name, cell) in headers.iter().zip(cells.iter()) {
            record.set_column(name, FieldValue::from_cell(cell));
        }
        table.records.push(record);
    }

    tracing::debug!("Read {} CSV rows with {} columns", table.records.len(), table.columns.len());
    Ok(table)
}

/// One JSON object per line; blank lines are skipped
pub fn read_jsonl(reader: impl BufRead) -> anyhow::Result<Table> {
    let mut table = Table::default();
    let mut seen = HashSet::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let object: Map<String, Value> = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON object on line {}", line_no + 1))?;
        for key in object.keys() {
            table.add_column(&mut seen, key);
        }

        let record: RawRecord = serde_json::from_value(Value::Object(object))
            .with_context(|| format!("Invalid record on line {}", line_no + 1))?;
        table.records.push(record);
    }

    tracing::debug!("Read {} JSON lines with {} columns", table.records.len(), table.columns.len());
    Ok(table)
}

pub fn write_csv(
    writer: impl Write,
    columns: &[String],
    records: &[NormalizedRecord],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let header = output_columns(columns);
    writer.write_record(&header)?;

    for record in records {
        let row = record.to_row(columns);
        writer.write_record(header.iter().map(|column| csv_cell(row.get(column))))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_jsonl(
    mut writer: impl Write,
    columns: &[String],
    records: &[NormalizedRecord],
) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, &Value::Object(record.to_row(columns)))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Output header: input columns, date parts moved to the end
pub fn output_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !DATE_PART_COLUMNS.contains(&c.as_str()))
        .cloned()
        .chain(DATE_PART_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
