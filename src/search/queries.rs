use crate::genre::GenreMap;
use crate::remote::{Dialect, SqlValue, Statement};

use super::filters::SearchCriteria;

/// Only projects owned by this team are ever visible.
pub const OWNING_TEAM_ID: i64 = 1003;

/// Projects whose name contains any of these are test data and never shown.
pub const TEST_MARKERS: [&str; 5] = ["テスト", "てすと", "test", "試験", "〇〇"];

/// Maximum projects returned by one search, most recent first.
pub const MAX_PROJECT_ROWS: usize = 10_000;

/// Columns where a `0` means "not set".
pub const TALENT_NUMERIC_COLUMNS: [&str; 2] = ["list_price", "sort_no"];

/// Conditions applied to every project search regardless of criteria.
pub fn base_conditions() -> Vec<String> {
    let mut conds = vec![
        "p.deleted IS NULL".to_string(),
        format!("p.viewable_team_id = {OWNING_TEAM_ID}"),
    ];
    for marker in TEST_MARKERS {
        conds.push(format!("p.name NOT LIKE '%{marker}%'"));
    }
    conds
}

/// Project search. Left joins keep projects without talent lists in the
/// result; DISTINCT folds the join fan-out back to one row per project.
pub fn project_search(criteria: &SearchCriteria, genres: &GenreMap, dialect: Dialect) -> Statement {
    let (filter_conditions, params) = criteria.project_conditions(genres, dialect);

    let mut where_parts = base_conditions();
    where_parts.extend(filter_conditions);
    let where_clause = where_parts.join("\n   AND ");

    let sql = format!(
        "SELECT DISTINCT
        p.id AS id,
        p.name AS name,
        p.product_name AS product_name,
        p.product_genre_cd AS genre_code,
        p.contact_person AS contact_person,
        p.budget AS budget,
        DATE(p.created) AS created,
        DATE(p.modified) AS modified
 FROM handy_casting.projects p
 LEFT JOIN handy_casting.talent_lists tl ON p.id = tl.project_id
 LEFT JOIN handy_casting.talent_list_groups tlg ON tl.id = tlg.talent_list_id
 LEFT JOIN handy_casting.talents_talent_lists ttl ON tl.id = ttl.talent_list_id
 LEFT JOIN handy_casting.talents t ON ttl.talent_id = t.id
 WHERE {where_clause}
 ORDER BY p.created DESC
 LIMIT {MAX_PROJECT_ROWS}"
    );

    Statement::new(sql, params)
}

/// Talent lists of one project, newest first.
pub fn talent_lists(project_id: &str) -> Statement {
    Statement::new(
        "SELECT tl.id AS id, tl.name AS name
 FROM handy_casting.talent_lists tl
 WHERE tl.project_id = ?
 ORDER BY tl.id DESC",
        vec![SqlValue::from(project_id)],
    )
}

/// Members of one talent list with their talent details, grouped by list
/// group name and then by the list's own sort order.
pub fn talent_detail(project_id: &str, talent_list_id: &str) -> Statement {
    Statement::new(
        "SELECT
        t.name AS talent_name,
        t.birthday_for_search AS birthday,
        tlg.name AS group_name,
        ttl.nego_level AS nego_level,
        ttl.price AS list_price,
        ttl.memo AS list_memo,
        t.hobby AS hobby,
        t.skill AS skill,
        t.biography AS biography,
        t.fee_year_cm_lower AS fee_lower,
        t.fee_year_cm_upper AS fee_upper,
        t.memo AS talent_memo,
        ttl.sort_no AS sort_no,
        DATE(ttl.created) AS listed_on
 FROM handy_casting.projects p
 JOIN handy_casting.talent_lists tl ON p.id = tl.project_id
 JOIN handy_casting.talents_talent_lists ttl ON tl.id = ttl.talent_list_id
 JOIN handy_casting.talents t ON ttl.talent_id = t.id
 LEFT JOIN handy_casting.talent_list_groups tlg ON ttl.talent_list_group_id = tlg.id
 WHERE p.id = ?
   AND tl.id = ?
 ORDER BY tlg.name, ttl.sort_no",
        vec![SqlValue::from(project_id), SqlValue::from(talent_list_id)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn genres() -> GenreMap {
        GenreMap::from_pairs([("01", "CM"), ("02", "Print"), ("03", "CM")])
    }

    #[test]
    fn base_conditions_apply_without_criteria() {
        let stmt = project_search(&SearchCriteria::default(), &genres(), Dialect::MySql);
        assert!(stmt.params.is_empty());
        let sql = stmt.to_mysql().unwrap();
        assert!(sql.contains("p.deleted IS NULL"));
        assert!(sql.contains("p.viewable_team_id = 1003"));
        for marker in TEST_MARKERS {
            assert!(sql.contains(&format!("p.name NOT LIKE '%{marker}%'")));
        }
        assert!(sql.contains("ORDER BY p.created DESC"));
        assert!(sql.contains("LIMIT 10000"));
    }

    #[test]
    fn criteria_cannot_remove_base_conditions() {
        let criteria = SearchCriteria {
            project_name: Some("test".into()),
            ..Default::default()
        };
        let sql = project_search(&criteria, &genres(), Dialect::MySql)
            .to_mysql()
            .unwrap();
        assert!(sql.contains("p.name NOT LIKE '%test%'"));
        assert!(sql.contains("p.name LIKE BINARY '%test%'"));
    }

    #[test]
    fn genre_criteria_render_as_code_set() {
        let criteria = SearchCriteria {
            genre: Some("CM".into()),
            ..Default::default()
        };
        let sql = project_search(&criteria, &genres(), Dialect::MySql)
            .to_mysql()
            .unwrap();
        assert!(sql.contains("p.product_genre_cd IN ('01', '03')"));
    }

    #[test]
    fn field_order_does_not_change_the_condition_set() {
        let a = SearchCriteria {
            product_name: Some("Cola".into()),
            created_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        let mut b = SearchCriteria::default();
        b.created_to = a.created_to;
        b.product_name = a.product_name.clone();
        assert_eq!(
            project_search(&a, &genres(), Dialect::MySql),
            project_search(&b, &genres(), Dialect::MySql)
        );
    }

    #[test]
    fn detail_queries_bind_identifiers() {
        let sql = talent_lists("42").to_mysql().unwrap();
        assert!(sql.contains("tl.project_id = '42'"));
        assert!(sql.contains("ORDER BY tl.id DESC"));

        let sql = talent_detail("42", "7' OR 1=1").to_mysql().unwrap();
        assert!(sql.contains("p.id = '42'"));
        assert!(sql.contains("tl.id = '7\\' OR 1=1'"));
        assert!(sql.contains("ORDER BY tlg.name, ttl.sort_no"));
    }
}
