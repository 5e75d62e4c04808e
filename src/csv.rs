use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::desk::Outcome;
use crate::lifecycle::TransitionRequest;
use crate::model::{LeadId, LeadRecord, LeadSnapshot, LeadStatus};

/// Errors that can occur when reading or writing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv file: {0}")]
    Open(#[source] csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized lead status '{status}'")]
    UnrecognizedStatus { line: usize, status: String },

    #[error("failed to write csv row: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv writer: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct LeadRow {
    lead: LeadId,
    status: String,
    lender: Option<String>,
    manager: Option<String>,
    disbursement: Option<String>,
    status_updated_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StatusChangeRow {
    lead: LeadId,
    from: String,
    to: String,
    comment: Option<String>,
    reject_reason: Option<String>,
    reject_proof: Option<String>,
    approved_amount: Option<String>,
    close_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct MenuRow<'a> {
    lead: &'a str,
    actions: String,
}

#[derive(Debug, Serialize)]
struct StatusOutcomeRow<'a> {
    lead: &'a str,
    from: &'static str,
    to: &'static str,
    outcome: String,
}

fn parse_status(line: usize, raw: &str) -> Result<LeadStatus, CsvError> {
    raw.parse().map_err(|_| CsvError::UnrecognizedStatus {
        line,
        status: raw.to_string(),
    })
}

/// Open a csv file and deserialize its rows, tagged with their line number
fn open_rows<T>(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = (usize, Result<T, CsvError>)>, CsvError>
where
    T: for<'de> Deserialize<'de>,
{
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<T>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            (line, result.map_err(|source| CsvError::Parse { line, source }))
        }))
}

/// Read lead snapshots from a csv file
pub fn read_leads(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<(LeadId, LeadSnapshot), CsvError>>, CsvError> {
    Ok(open_rows::<LeadRow>(path)?.map(|(line, row)| {
        let row = row?;
        let record = LeadRecord {
            status: parse_status(line, &row.status)?,
            lender_name: row.lender,
            manager_id: row.manager,
            disbursement_ref: row.disbursement,
            status_updated_at: row.status_updated_at,
        };
        Ok((row.lead, LeadSnapshot::from(&record)))
    }))
}

/// Read status change requests from a csv file
pub fn read_status_changes(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<(LeadId, TransitionRequest), CsvError>>, CsvError> {
    Ok(open_rows::<StatusChangeRow>(path)?.map(|(line, row)| {
        let row = row?;
        let request = TransitionRequest {
            from: parse_status(line, &row.from)?,
            to: parse_status(line, &row.to)?,
            comment: row.comment.unwrap_or_default(),
            reject_reason: row.reject_reason,
            reject_proof: row.reject_proof,
            approved_amount: row.approved_amount,
            close_reason: row.close_reason,
        };
        Ok((row.lead, request))
    }))
}

/// Write computed menus in csv format, labels joined by `|`
pub fn write_menus<'a>(
    writer: impl io::Write,
    outcomes: impl IntoIterator<Item = &'a Outcome>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for outcome in outcomes {
        if let Outcome::Menu { lead, actions } = outcome {
            let labels: Vec<_> = actions.iter().map(|a| a.label).collect();
            writer.serialize(MenuRow {
                lead,
                actions: labels.join("|"),
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write status change outcomes in csv format, `ok` or the refusal reason
pub fn write_status_outcomes<'a>(
    writer: impl io::Write,
    outcomes: impl IntoIterator<Item = &'a Outcome>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for outcome in outcomes {
        let row = match outcome {
            Outcome::StatusChanged { lead, change } => StatusOutcomeRow {
                lead,
                from: change.from.as_str(),
                to: change.to.as_str(),
                outcome: "ok".to_string(),
            },
            Outcome::StatusRefused {
                lead,
                from,
                to,
                error,
            } => StatusOutcomeRow {
                lead,
                from: from.as_str(),
                to: to.as_str(),
                outcome: error.to_string(),
            },
            Outcome::Menu { .. } => continue,
        };
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
