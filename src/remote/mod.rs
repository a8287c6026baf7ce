pub mod fixture;
pub mod schema;
pub mod ssh;
pub mod statement;

use std::string::FromUtf8Error;

pub use statement::{Dialect, SqlValue, Statement};

/// Failure to run a statement or to get its output back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote command failed ({status}): {stderr}")]
    Remote { status: String, stderr: String },

    #[error("remote output is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    #[error(transparent)]
    Statement(#[from] statement::ArityMismatch),

    #[error("local fixture query failed: {0}")]
    Fixture(#[from] rusqlite::Error),
}

/// A backend that runs one fully composed statement and returns the result
/// the way `mysql --batch` prints it: a tab-separated header line followed by
/// one line per row, or nothing at all when there are no rows.
pub trait Executor {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// SQL flavour statements must be built in.
    fn dialect(&self) -> Dialect;

    fn execute(&self, statement: &Statement) -> Result<String, TransportError>;
}

/// Escape one cell the way `mysql --batch` does.
pub fn escape_batch_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}
