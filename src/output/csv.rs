use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::Tabular;
use crate::records::{ProjectRecord, TalentListOption};

/// Export file name for a project search.
pub const PROJECT_EXPORT_NAME: &str = "project_search_results.csv";

/// Write rows as CSV: one header line, then one record per row, columns in
/// display order. Cells with commas, quotes or line breaks are quoted.
pub fn write_csv<T: Tabular, W: Write>(rows: &[T], writer: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(T::headers())?;
    for row in rows {
        w.write_record(row.cells())?;
    }
    w.flush()?;
    Ok(())
}

/// Write rows to a CSV file, replacing it if present.
pub fn export_csv<T: Tabular>(rows: &[T], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_csv(rows, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))
}

/// Export file name for the talents of one list: `{project label}_{list id}_talents.csv`.
pub fn talent_export_name(project: &ProjectRecord, list: &TalentListOption) -> String {
    let name = format!("{}_{}_talents.csv", project.display_label(), list.id);
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
