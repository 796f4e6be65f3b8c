use crate::models::Report;
use anyhow::{bail, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => bail!("Unknown export format '{}', expected csv or json", other),
        }
    }

    /// Guess from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Write the report to a file
pub fn export_report(report: &Report, format: ExportFormat, path: &Path) -> Result<String> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Csv => export_to_csv(report, path),
        ExportFormat::Json => export_to_json(report, path),
    }
}

fn export_to_csv(report: &Report, path: &Path) -> Result<String> {
    let mut file = File::create(path)?;

    writeln!(file, "{}", csv_line(&report.columns()))?;
    for row in &report.rows {
        writeln!(file, "{}", csv_line(&row.cells()))?;
    }

    Ok(path.to_string_lossy().to_string())
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote fields containing separators, quotes or line breaks
fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn export_to_json(report: &Report, path: &Path) -> Result<String> {
    let mut file = File::create(path)?;

    let columns = report.columns();
    let mut output = Vec::new();
    for row in &report.rows {
        let mut map = serde_json::Map::new();
        for (col, cell) in columns.iter().zip(row.cells()) {
            map.insert(col.clone(), serde_json::Value::String(cell));
        }
        output.push(serde_json::Value::Object(map));
    }

    let json = serde_json::to_string_pretty(&output)?;
    file.write_all(json.as_bytes())?;

    Ok(path.to_string_lossy().to_string())
}
