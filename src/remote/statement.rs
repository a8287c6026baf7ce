use chrono::NaiveDate;

/// SQL flavour a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Date(NaiveDate),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl SqlValue {
    /// Render as a MySQL literal. Strings are quoted with backslash escapes,
    /// which is what the server expects unless NO_BACKSLASH_ESCAPES is set.
    pub fn to_mysql_literal(&self) -> String {
        match self {
            SqlValue::Text(s) => quote_mysql(s),
            SqlValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("statement has {placeholders} placeholders but {values} bound values")]
pub struct ArityMismatch {
    pub placeholders: usize,
    pub values: usize,
}

/// SQL text with anonymous `?` placeholders and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Number of `?` placeholders outside quoted literals and identifiers.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        scan_placeholders(&self.sql, |_| count += 1);
        count
    }

    /// Substitute every placeholder with its escaped MySQL literal, producing
    /// one self-contained statement suitable for `mysql --batch`.
    pub fn to_mysql(&self) -> Result<String, ArityMismatch> {
        let placeholders = self.placeholder_count();
        if placeholders != self.params.len() {
            return Err(ArityMismatch {
                placeholders,
                values: self.params.len(),
            });
        }

        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut values = self.params.iter();
        let mut last = 0;
        scan_placeholders(&self.sql, |pos| {
            out.push_str(&self.sql[last..pos]);
            if let Some(v) = values.next() {
                out.push_str(&v.to_mysql_literal());
            }
            last = pos + 1;
        });
        out.push_str(&self.sql[last..]);
        Ok(out)
    }
}

/// Calls `on_placeholder` with the byte offset of each bare `?`.
fn scan_placeholders(sql: &str, mut on_placeholder: impl FnMut(usize)) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (pos, ch) in sql.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' && q != '`' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '?' => on_placeholder(pos),
                _ => {}
            },
        }
    }
}

/// Quote a string as a MySQL literal.
pub fn quote_mysql(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
