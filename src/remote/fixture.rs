use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::statement::{Dialect, SqlValue, Statement};
use super::{escape_batch_cell, schema, Executor, TransportError};

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
            SqlValue::Date(d) => ToSqlOutput::from(d.format("%Y-%m-%d").to_string()),
        })
    }
}

/// Runs statements against a local SQLite file laid out like the production
/// casting database. The file is attached as `handy_casting` so the
/// schema-qualified table names in the queries resolve unchanged.
pub struct FixtureExecutor {
    pub conn: Connection,
    pub path: PathBuf,
}

impl FixtureExecutor {
    /// Open an existing fixture database.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        if !path.is_file() {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("fixture database not found: {}", path.display()),
            )));
        }
        Self::attach(path)
    }

    /// Open the fixture database, creating the file and tables if missing.
    pub fn create(path: &Path) -> Result<Self, TransportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let fixture = Self::attach(path)?;
        schema::create_schema(&fixture.conn)?;
        info!("Initialised fixture database: {}", path.display());
        Ok(fixture)
    }

    fn attach(path: &Path) -> Result<Self, TransportError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "ATTACH DATABASE ?1 AS handy_casting",
            [path.to_string_lossy().as_ref()],
        )?;
        Ok(FixtureExecutor {
            conn,
            path: path.to_path_buf(),
        })
    }
}

impl Executor for FixtureExecutor {
    fn name(&self) -> &str {
        "fixture"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&self, statement: &Statement) -> Result<String, TransportError> {
        let start = Instant::now();
        debug!(
            "fixture: running statement with {} bound values",
            statement.params.len()
        );

        let mut stmt = self.conn.prepare(&statement.sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(statement.params.iter()))?;

        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(render_cell(row.get_ref(i)?));
            }
            lines.push(cells.join("\t"));
        }

        info!(
            "fixture: {} rows in {:.1}ms",
            lines.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        // mysql --batch prints nothing, not even the header, for an empty result
        if lines.is_empty() {
            return Ok(String::new());
        }

        let mut out = columns.join("\t");
        out.push('\n');
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn render_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            escape_batch_cell(&String::from_utf8_lossy(bytes))
        }
    }
}
