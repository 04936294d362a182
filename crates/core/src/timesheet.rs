//! Timesheet CSV aggregation.
//!
//! Sums logged hours per project and person from an exported timesheet. Header matching is
//! case-insensitive. `Project` and `Hours` are required; `Person` (or `User`) is optional.

use crate::{CoreError, CoreResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PROJECT_HEADERS: &[&str] = &["project"];
const HOURS_HEADERS: &[&str] = &["hours"];
const PERSON_HEADERS: &[&str] = &["person", "user"];

/// Total hours for one project/person pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesheetRow {
    pub project: String,
    pub person: Option<String>,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesheetSummary {
    /// Sorted by project, then person, ignoring case.
    pub rows: Vec<TimesheetRow>,
    pub total_hours: f64,
}

impl TimesheetSummary {
    /// Renders the summary as `Project,Person,Hours` CSV with hours to two decimals.
    pub fn to_csv(&self) -> CoreResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Project", "Person", "Hours"])?;
        for row in &self.rows {
            writer.write_record([
                row.project.as_str(),
                row.person.as_deref().unwrap_or_default(),
                &format!("{:.2}", row.hours),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::CsvWrite(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CoreError::CsvWrite(e.to_string()))
    }
}

/// Aggregates a timesheet read from `reader`.
///
/// Rows with a blank `Hours` cell are skipped.
///
/// # Errors
///
/// Returns:
/// - `CoreError::InvalidInput` if a required column is missing,
/// - `CoreError::TimesheetRow` for a row with a blank project or hours that are not a
///   non-negative number,
/// - `CoreError::Csv` if the input is not well-formed CSV.
pub fn aggregate_timesheet<R: Read>(reader: R) -> CoreResult<TimesheetSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let project_col = find_column(&headers, PROJECT_HEADERS)
        .ok_or_else(|| CoreError::InvalidInput("timesheet is missing a 'Project' column".into()))?;
    let hours_col = find_column(&headers, HOURS_HEADERS)
        .ok_or_else(|| CoreError::InvalidInput("timesheet is missing an 'Hours' column".into()))?;
    let person_col = find_column(&headers, PERSON_HEADERS);

    // Keyed case-insensitively; the first spelling seen is the one reported.
    let mut totals: BTreeMap<(String, String), TimesheetRow> = BTreeMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let hours_cell = record.get(hours_col).unwrap_or_default();
        if hours_cell.is_empty() {
            continue;
        }
        let hours: f64 = hours_cell
            .parse()
            .ok()
            .filter(|h: &f64| h.is_finite() && *h >= 0.0)
            .ok_or_else(|| CoreError::TimesheetRow {
                line,
                message: format!("hours '{hours_cell}' is not a non-negative number"),
            })?;

        let project = record.get(project_col).unwrap_or_default();
        if project.is_empty() {
            return Err(CoreError::TimesheetRow {
                line,
                message: "project is blank".into(),
            });
        }
        let person = person_col
            .and_then(|col| record.get(col))
            .filter(|p| !p.is_empty());

        let key = (
            project.to_lowercase(),
            person.unwrap_or_default().to_lowercase(),
        );
        totals
            .entry(key)
            .or_insert_with(|| TimesheetRow {
                project: project.to_string(),
                person: person.map(str::to_string),
                hours: 0.0,
            })
            .hours += hours;
    }

    let rows: Vec<TimesheetRow> = totals.into_values().collect();
    let total_hours = rows.iter().map(|row| row.hours).sum();
    tracing::debug!(groups = rows.len(), total_hours, "aggregated timesheet");

    Ok(TimesheetSummary { rows, total_hours })
}

/// Aggregates a timesheet stored on disk.
pub fn aggregate_timesheet_file(path: &Path) -> CoreResult<TimesheetSummary> {
    let file = File::open(path).map_err(CoreError::FileRead)?;
    aggregate_timesheet(file)
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
}
