use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::genre::GenreMap;
use crate::remote::{Dialect, SqlValue};

/// User-supplied project search criteria. Every field is optional; an absent
/// (or empty) field adds no condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub project_name: Option<String>,
    pub product_name: Option<String>,
    pub talent_name: Option<String>,
    /// Genre display name, resolved to codes through the genre map.
    pub genre: Option<String>,
    pub group_name: Option<String>,
    pub contact_person: Option<String>,
    pub list_price: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

/// One condition on the project search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-sensitive substring match.
    Contains { column: &'static str, needle: String },
    /// Column equals one of the values. An empty set matches no row.
    OneOf {
        column: &'static str,
        values: Vec<String>,
    },
    OnOrAfter { column: &'static str, date: NaiveDate },
    OnOrBefore { column: &'static str, date: NaiveDate },
}

impl Predicate {
    /// Render as SQL with `?` placeholders, appending bound values to `params`.
    pub fn render(&self, dialect: Dialect, params: &mut Vec<SqlValue>) -> String {
        match self {
            Predicate::Contains { column, needle } => match dialect {
                Dialect::MySql => {
                    params.push(SqlValue::Text(format!("%{}%", escape_like(needle))));
                    format!("{column} LIKE BINARY ?")
                }
                Dialect::Sqlite => {
                    params.push(SqlValue::Text(needle.clone()));
                    format!("INSTR({column}, ?) > 0")
                }
            },
            Predicate::OneOf { values, .. } if values.is_empty() => "1 = 0".to_string(),
            Predicate::OneOf { column, values } => {
                params.extend(values.iter().map(|v| SqlValue::Text(v.clone())));
                let marks = vec!["?"; values.len()].join(", ");
                format!("{column} IN ({marks})")
            }
            Predicate::OnOrAfter { column, date } => {
                params.push(SqlValue::Date(*date));
                format!("{column} >= ?")
            }
            Predicate::OnOrBefore { column, date } => {
                params.push(SqlValue::Date(*date));
                format!("{column} <= ?")
            }
        }
    }
}

/// Escape LIKE wildcards so the needle matches literally (MySQL's default
/// escape character is the backslash).
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl SearchCriteria {
    /// True when no field would add a condition.
    pub fn is_empty(&self) -> bool {
        [
            &self.project_name,
            &self.product_name,
            &self.talent_name,
            &self.genre,
            &self.group_name,
            &self.contact_person,
            &self.list_price,
        ]
        .iter()
        .all(|f| present(f).is_none())
            && self.created_from.is_none()
            && self.created_to.is_none()
    }

    /// One predicate per present field.
    pub fn predicates(&self, genres: &GenreMap) -> Vec<Predicate> {
        let mut preds = Vec::new();

        let text_fields = [
            ("p.name", &self.project_name),
            ("p.product_name", &self.product_name),
            ("t.name", &self.talent_name),
            ("tlg.name", &self.group_name),
            ("p.contact_person", &self.contact_person),
            ("ttl.price", &self.list_price),
        ];
        for (column, field) in text_fields {
            if let Some(needle) = present(field) {
                preds.push(Predicate::Contains {
                    column,
                    needle: needle.to_string(),
                });
            }
        }

        if let Some(name) = present(&self.genre) {
            // An unknown display name resolves to no codes and must match nothing
            preds.push(Predicate::OneOf {
                column: "p.product_genre_cd",
                values: genres.codes_for(name).into_iter().map(str::to_string).collect(),
            });
        }

        if let Some(date) = self.created_from {
            preds.push(Predicate::OnOrAfter {
                column: "DATE(p.created)",
                date,
            });
        }

        if let Some(date) = self.created_to {
            preds.push(Predicate::OnOrBefore {
                column: "DATE(p.created)",
                date,
            });
        }

        preds
    }

    /// Build WHERE clause fragments and params for the project search.
    /// Returns (clause_parts, param_values) where clause_parts are AND-able
    /// conditions whose placeholders consume param_values in order.
    pub fn project_conditions(
        &self,
        genres: &GenreMap,
        dialect: Dialect,
    ) -> (Vec<String>, Vec<SqlValue>) {
        let mut params = Vec::new();
        let conditions = self
            .predicates(genres)
            .iter()
            .map(|p| p.render(dialect, &mut params))
            .collect();
        (conditions, params)
    }
}
