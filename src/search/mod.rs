pub mod filters;
pub mod queries;

use chrono::NaiveDate;
use tracing::debug;

use crate::genre::GenreMap;
use crate::parse::{parse_tsv, ParseError, Table};
use crate::records::{ProjectRecord, TalentListOption, TalentRecord};
use crate::remote::{Executor, Statement, TransportError};
use filters::SearchCriteria;
use queries::{MAX_PROJECT_ROWS, TALENT_NUMERIC_COLUMNS};

/// Anything that can go wrong between sending a statement and holding typed rows.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not read query result: {0}")]
    Parse(#[from] ParseError),
}

/// Run a statement and parse its output. An empty result is an empty table,
/// not an error.
fn run(exec: &dyn Executor, statement: &Statement, numeric_columns: &[&str]) -> Result<Table, ActionError> {
    let raw = exec.execute(statement)?;
    match parse_tsv(&raw, numeric_columns) {
        Ok(table) => Ok(table),
        Err(ParseError::MissingHeader) => {
            debug!("{}: empty result", exec.name());
            Ok(Table::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Search projects matching the criteria, most recently created first, at
/// most [`MAX_PROJECT_ROWS`].
pub fn search_projects(
    exec: &dyn Executor,
    criteria: &SearchCriteria,
    genres: &GenreMap,
) -> Result<Vec<ProjectRecord>, ActionError> {
    let statement = queries::project_search(criteria, genres, exec.dialect());
    let table = run(exec, &statement, &[])?;
    Ok(ProjectRecord::from_table(&table, genres, MAX_PROJECT_ROWS)?)
}

/// Talent lists belonging to a project, newest first.
pub fn list_talent_lists(exec: &dyn Executor, project_id: &str) -> Result<Vec<TalentListOption>, ActionError> {
    let table = run(exec, &queries::talent_lists(project_id), &[])?;
    Ok(TalentListOption::from_table(&table)?)
}

/// Talents on one list of a project.
pub fn fetch_talents(
    exec: &dyn Executor,
    project_id: &str,
    talent_list_id: &str,
    today: NaiveDate,
) -> Result<Vec<TalentRecord>, ActionError> {
    let statement = queries::talent_detail(project_id, talent_list_id);
    let table = run(exec, &statement, &TALENT_NUMERIC_COLUMNS)?;
    Ok(TalentRecord::from_table(&table, today)?)
}
