use chrono::NaiveDate;
use serde::Serialize;

use crate::genre::GenreMap;
use crate::parse::{ParseError, Record, Table, PLACEHOLDER};

/// Group label for talents not assigned to any list group.
pub const UNGROUPED: &str = "(ungrouped)";

/// Separator between the lower and upper bound of a fee range.
pub const RANGE_SEPARATOR: &str = "～";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub product_name: String,
    pub genre_code: String,
    pub genre_name: String,
    pub contact_person: String,
    pub budget: String,
    pub created: String,
    pub modified: String,
}

impl ProjectRecord {
    fn from_record(r: Record<'_>, genres: &GenreMap) -> Result<Self, ParseError> {
        let genre_code = r.get("genre_code")?.to_string();
        let genre_name = genres
            .name_of(&genre_code)
            .unwrap_or(PLACEHOLDER)
            .to_string();
        Ok(ProjectRecord {
            id: r.get("id")?.to_string(),
            name: r.get("name")?.to_string(),
            product_name: r.get("product_name")?.to_string(),
            genre_code,
            genre_name,
            contact_person: r.get("contact_person")?.to_string(),
            budget: r.get("budget")?.to_string(),
            created: r.get("created")?.to_string(),
            modified: r.get("modified")?.to_string(),
        })
    }

    /// Map parsed project rows, translating genre codes. Rows past `limit`
    /// are dropped.
    pub fn from_table(table: &Table, genres: &GenreMap, limit: usize) -> Result<Vec<Self>, ParseError> {
        table
            .records()
            .take(limit)
            .map(|r| Self::from_record(r, genres))
            .collect()
    }

    /// Label used when choosing a project: `name（product）- created`.
    pub fn display_label(&self) -> String {
        format!("{}（{}）- {}", self.name, self.product_name, self.created)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TalentListOption {
    pub id: String,
    pub name: String,
}

impl TalentListOption {
    pub fn from_table(table: &Table) -> Result<Vec<Self>, ParseError> {
        table
            .records()
            .map(|r| {
                Ok(TalentListOption {
                    id: r.get("id")?.to_string(),
                    name: r.get("name")?.to_string(),
                })
            })
            .collect()
    }

    pub fn display_label(&self) -> String {
        format!("{} (ID: {})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TalentRecord {
    pub name: String,
    pub age: String,
    pub group_name: String,
    pub negotiation_status: String,
    pub list_price: String,
    pub list_memo: String,
    pub hobby: String,
    pub skill: String,
    pub biography: String,
    pub fee_range: String,
    pub talent_memo: String,
    pub sort_order: String,
    pub listed_on: String,
}

impl TalentRecord {
    fn from_record(r: Record<'_>, today: NaiveDate) -> Result<Self, ParseError> {
        let age = r
            .value("birthday")?
            .and_then(|b| age_on(b, today))
            .filter(|&a| a != 0)
            .map(|a| a.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        Ok(TalentRecord {
            name: r.get("talent_name")?.to_string(),
            age,
            group_name: r.value("group_name")?.unwrap_or(UNGROUPED).to_string(),
            negotiation_status: r.get("nego_level")?.to_string(),
            list_price: r.get("list_price")?.to_string(),
            list_memo: r.get("list_memo")?.to_string(),
            hobby: r.get("hobby")?.to_string(),
            skill: r.get("skill")?.to_string(),
            biography: r.get("biography")?.to_string(),
            fee_range: fee_range(r.value("fee_lower")?, r.value("fee_upper")?),
            talent_memo: r.get("talent_memo")?.to_string(),
            sort_order: r.get("sort_no")?.to_string(),
            listed_on: r.get("listed_on")?.to_string(),
        })
    }

    /// Map parsed talent detail rows; ages are computed as of `today`.
    pub fn from_table(table: &Table, today: NaiveDate) -> Result<Vec<Self>, ParseError> {
        table
            .records()
            .map(|r| Self::from_record(r, today))
            .collect()
    }
}

/// Fee interval text: `lower～upper` when both bounds are known, the known
/// bound alone when only one is, otherwise the placeholder.
pub fn fee_range(lower: Option<&str>, upper: Option<&str>) -> String {
    match (lower, upper) {
        (Some(lo), Some(hi)) => format!("{lo}{RANGE_SEPARATOR}{hi}"),
        (Some(v), None) | (None, Some(v)) => v.to_string(),
        (None, None) => PLACEHOLDER.to_string(),
    }
}

/// Whole years between `birthday` and `today`, counted as elapsed days / 365
/// rounded down. Accepts `YYYY-MM-DD` with an optional time suffix.
pub fn age_on(birthday: &str, today: NaiveDate) -> Option<i64> {
    let date = NaiveDate::parse_from_str(birthday.get(..10)?, "%Y-%m-%d").ok()?;
    let days = (today - date).num_days();
    Some(days.div_euclid(365))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_tsv;
    use crate::search::queries::TALENT_NUMERIC_COLUMNS;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn fee_range_formats_one_sided_intervals() {
        assert_eq!(fee_range(Some("100"), Some("200")), "100～200");
        assert_eq!(fee_range(Some("100"), None), "100");
        assert_eq!(fee_range(None, Some("200")), "200");
        assert_eq!(fee_range(None, None), "-");
    }

    #[test]
    fn age_floors_elapsed_days() {
        assert_eq!(age_on("2000-04-01", today()), Some(25));
        assert_eq!(age_on("2000-04-02 00:00:00", today()), Some(25));
        assert_eq!(age_on("2024-06-01", today()), Some(0));
        assert_eq!(age_on("not a date", today()), None);
        assert_eq!(age_on("", today()), None);
    }

    #[test]
    fn project_rows_translate_genre_codes() {
        let genres = GenreMap::from_pairs([("01", "CM")]);
        let raw = "id\tname\tproduct_name\tgenre_code\tcontact_person\tbudget\tcreated\tmodified\n\
                   2\tSpring\tCola\t01\tSato\t500000\t2024-05-01\tNULL\n\
                   1\tWinter\tTea\t99\tNULL\t0\t2024-01-10\t2024-02-01\n";
        let table = parse_tsv(raw, &[]).unwrap();
        let projects = ProjectRecord::from_table(&table, &genres, 10).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].genre_name, "CM");
        assert_eq!(projects[0].modified, "-");
        assert_eq!(projects[1].genre_name, "-");
        assert_eq!(projects[1].contact_person, "-");
        assert_eq!(projects[1].budget, "0");
        assert_eq!(projects[0].display_label(), "Spring（Cola）- 2024-05-01");
    }

    #[test]
    fn project_rows_are_capped() {
        let mut raw = String::from("id\tname\tproduct_name\tgenre_code\tcontact_person\tbudget\tcreated\tmodified\n");
        for i in 0..5 {
            raw.push_str(&format!("{i}\tP{i}\t-\t01\t-\t0\t2024-01-01\t2024-01-01\n"));
        }
        let table = parse_tsv(&raw, &[]).unwrap();
        let projects = ProjectRecord::from_table(&table, &GenreMap::default(), 3).unwrap();
        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn talent_rows_derive_age_fee_and_group() {
        let raw = "talent_name\tbirthday\tgroup_name\tnego_level\tlist_price\tlist_memo\thobby\tskill\tbiography\tfee_lower\tfee_upper\ttalent_memo\tsort_no\tlisted_on\n\
                   Aoi\t1995-01-01\tLead\tOK\t300\tfirst\\nchoice\tski\tpiano\tNULL\t100\t200\tNULL\t1\t2024-05-02\n\
                   Ren\tNULL\tNULL\tNULL\t0\tNULL\tNULL\tNULL\tNULL\tNULL\t500\tNULL\t0\t2024-05-03\n";
        let table = parse_tsv(raw, &TALENT_NUMERIC_COLUMNS).unwrap();
        let talents = TalentRecord::from_table(&table, today()).unwrap();

        assert_eq!(talents[0].age, "30");
        assert_eq!(talents[0].fee_range, "100～200");
        assert_eq!(talents[0].list_memo, "first\nchoice");
        assert_eq!(talents[0].group_name, "Lead");

        assert_eq!(talents[1].age, "-");
        assert_eq!(talents[1].group_name, UNGROUPED);
        assert_eq!(talents[1].list_price, "-");
        assert_eq!(talents[1].sort_order, "-");
        assert_eq!(talents[1].fee_range, "500");
    }

    #[test]
    fn list_options_label_with_id() {
        let table = parse_tsv("id\tname\n9\tFinal\n4\tDraft\n", &[]).unwrap();
        let lists = TalentListOption::from_table(&table).unwrap();
        assert_eq!(lists[0].display_label(), "Final (ID: 9)");
        assert_eq!(lists[1].id, "4");
    }
}
