//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use castsearch::remote::fixture::FixtureExecutor;
use rusqlite::params;
use tempfile::TempDir;

/// Builder for a fixture database laid out like the casting schema.
pub struct FixtureBuilder {
    temp_dir: TempDir,
    exec: FixtureExecutor,
}

impl FixtureBuilder {
    /// Create an empty fixture with all tables.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let exec = FixtureExecutor::create(&temp_dir.path().join("casting.db")).expect("Failed to create fixture");
        Self { temp_dir, exec }
    }

    pub fn db_path(&self) -> PathBuf {
        self.exec.path.clone()
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn exec(&self) -> &FixtureExecutor {
        &self.exec
    }

    /// Visible project owned by the searching team.
    pub fn project(self, id: i64, name: &str, product: &str, genre: &str, created: &str) -> Self {
        self.project_full(ProjectRow {
            id,
            name,
            product,
            genre,
            created,
            ..ProjectRow::default()
        })
    }

    pub fn project_full(self, p: ProjectRow<'_>) -> Self {
        self.exec
            .conn
            .execute(
                "INSERT INTO handy_casting.projects
                    (id, name, product_name, product_genre_cd, contact_person, budget, viewable_team_id, created, modified, deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    p.id,
                    p.name,
                    p.product,
                    p.genre,
                    p.contact,
                    p.budget,
                    p.team,
                    p.created,
                    p.modified,
                    p.deleted
                ],
            )
            .expect("Failed to insert project");
        self
    }

    pub fn talent_list(self, id: i64, project_id: i64, name: &str) -> Self {
        self.exec
            .conn
            .execute(
                "INSERT INTO handy_casting.talent_lists (id, project_id, name) VALUES (?1, ?2, ?3)",
                params![id, project_id, name],
            )
            .expect("Failed to insert talent list");
        self
    }

    pub fn group(self, id: i64, list_id: i64, name: &str) -> Self {
        self.exec
            .conn
            .execute(
                "INSERT INTO handy_casting.talent_list_groups (id, talent_list_id, name) VALUES (?1, ?2, ?3)",
                params![id, list_id, name],
            )
            .expect("Failed to insert group");
        self
    }

    pub fn talent(self, t: TalentRow<'_>) -> Self {
        self.exec
            .conn
            .execute(
                "INSERT INTO handy_casting.talents
                    (id, name, birthday_for_search, hobby, skill, biography, fee_year_cm_lower, fee_year_cm_upper, memo)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![t.id, t.name, t.birthday, t.hobby, t.skill, t.biography, t.fee_lower, t.fee_upper, t.memo],
            )
            .expect("Failed to insert talent");
        self
    }

    /// Put a talent on a list.
    pub fn member(self, m: MemberRow<'_>) -> Self {
        self.exec
            .conn
            .execute(
                "INSERT INTO handy_casting.talents_talent_lists
                    (talent_id, talent_list_id, talent_list_group_id, nego_level, price, memo, sort_no, created)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![m.talent_id, m.list_id, m.group_id, m.nego_level, m.price, m.memo, m.sort_no, m.created],
            )
            .expect("Failed to insert membership");
        self
    }
}

pub struct ProjectRow<'a> {
    pub id: i64,
    pub name: &'a str,
    pub product: &'a str,
    pub genre: &'a str,
    pub contact: Option<&'a str>,
    pub budget: Option<i64>,
    pub team: i64,
    pub created: &'a str,
    pub modified: Option<&'a str>,
    pub deleted: Option<&'a str>,
}

impl Default for ProjectRow<'_> {
    fn default() -> Self {
        ProjectRow {
            id: 1,
            name: "Project",
            product: "Product",
            genre: "01",
            contact: Some("Sato"),
            budget: Some(1_000_000),
            team: 1003,
            created: "2024-01-01 09:00:00",
            modified: None,
            deleted: None,
        }
    }
}

#[derive(Default)]
pub struct TalentRow<'a> {
    pub id: i64,
    pub name: &'a str,
    pub birthday: Option<&'a str>,
    pub hobby: Option<&'a str>,
    pub skill: Option<&'a str>,
    pub biography: Option<&'a str>,
    pub fee_lower: Option<i64>,
    pub fee_upper: Option<i64>,
    pub memo: Option<&'a str>,
}

#[derive(Default)]
pub struct MemberRow<'a> {
    pub talent_id: i64,
    pub list_id: i64,
    pub group_id: Option<i64>,
    pub nego_level: Option<&'a str>,
    pub price: Option<i64>,
    pub memo: Option<&'a str>,
    pub sort_no: Option<i64>,
    pub created: Option<&'a str>,
}

/// Genre mapping JSON used across tests. Codes 01 and 03 share a name.
pub const GENRES_JSON: &str = r#"{"01": "CM", "02": "Print", "03": "CM", "04": "Web"}"#;
