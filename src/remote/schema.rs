use rusqlite::Connection;

/// Create the casting tables inside the attached `handy_casting` schema.
/// Column names and nullability follow the production MySQL tables closely
/// enough for the search queries to run unchanged.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS handy_casting.projects (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            product_name TEXT,
            product_genre_cd TEXT,
            contact_person TEXT,
            budget INTEGER,
            viewable_team_id INTEGER NOT NULL,
            created TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now')),
            modified TEXT,
            deleted TEXT
        );

        CREATE TABLE IF NOT EXISTS handy_casting.talent_lists (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created TEXT
        );

        CREATE TABLE IF NOT EXISTS handy_casting.talent_list_groups (
            id INTEGER PRIMARY KEY,
            talent_list_id INTEGER NOT NULL,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS handy_casting.talents (
            id INTEGER PRIMARY KEY,
            name TEXT,
            birthday_for_search TEXT,
            hobby TEXT,
            skill TEXT,
            biography TEXT,
            fee_year_cm_lower INTEGER,
            fee_year_cm_upper INTEGER,
            memo TEXT
        );

        CREATE TABLE IF NOT EXISTS handy_casting.talents_talent_lists (
            id INTEGER PRIMARY KEY,
            talent_id INTEGER NOT NULL,
            talent_list_id INTEGER NOT NULL,
            talent_list_group_id INTEGER,
            nego_level TEXT,
            price INTEGER,
            memo TEXT,
            sort_no INTEGER,
            created TEXT
        );

        -- Indexes for the join paths
        CREATE INDEX IF NOT EXISTS handy_casting.idx_projects_created ON projects(created);
        CREATE INDEX IF NOT EXISTS handy_casting.idx_talent_lists_project ON talent_lists(project_id);
        CREATE INDEX IF NOT EXISTS handy_casting.idx_groups_list ON talent_list_groups(talent_list_id);
        CREATE INDEX IF NOT EXISTS handy_casting.idx_memberships_list ON talents_talent_lists(talent_list_id);
        CREATE INDEX IF NOT EXISTS handy_casting.idx_memberships_talent ON talents_talent_lists(talent_id);
        ",
    )
}

/// Fill an empty fixture with a handful of projects, lists and talents so the
/// CLI has something to browse offline.
pub fn seed_demo(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        INSERT INTO handy_casting.projects
            (id, name, product_name, product_genre_cd, contact_person, budget, viewable_team_id, created, modified)
        VALUES
            (101, '春の新商品キャンペーン', 'Sparkling Cola', '01', '佐藤', 5000000, 1003, '2024-03-01 10:00:00', '2024-03-05 09:00:00'),
            (102, 'Autumn Tea CM', 'Green Tea', '02', 'Ito', 3000000, 1003, '2024-09-12 15:30:00', NULL),
            (103, 'Winter Coat Print', 'Down Coat', '03', NULL, NULL, 1003, '2024-11-20 08:00:00', NULL),
            (104, 'テスト案件', 'Dummy', '01', '佐藤', 0, 1003, '2024-12-01 00:00:00', NULL),
            (105, 'Other Team Project', 'Snack', '01', 'Kato', 100, 2001, '2024-12-02 00:00:00', NULL);

        INSERT INTO handy_casting.talent_lists (id, project_id, name, created) VALUES
            (201, 101, '一次候補', '2024-03-02 10:00:00'),
            (202, 101, '最終候補', '2024-03-10 10:00:00'),
            (203, 102, 'Shortlist', '2024-09-13 10:00:00');

        INSERT INTO handy_casting.talent_list_groups (id, talent_list_id, name) VALUES
            (301, 201, 'Lead'),
            (302, 201, 'Support'),
            (303, 202, 'Lead');

        INSERT INTO handy_casting.talents
            (id, name, birthday_for_search, hobby, skill, biography, fee_year_cm_lower, fee_year_cm_upper, memo)
        VALUES
            (401, '青井 葵', '1995-06-15', 'Ski', 'Piano', 'Drama debut 2015.', 1000, 2000, NULL),
            (402, '佐々木 蓮', '1988-11-02', NULL, 'Dance', NULL, NULL, 3000, 'Overseas until May'),
            (403, 'Mika Ono', NULL, 'Travel', NULL, NULL, NULL, NULL, NULL);

        INSERT INTO handy_casting.talents_talent_lists
            (id, talent_id, talent_list_id, talent_list_group_id, nego_level, price, memo, sort_no, created)
        VALUES
            (501, 401, 201, 301, 'Available', 1500, 'First choice', 1, '2024-03-02 11:00:00'),
            (502, 402, 201, 302, 'Checking', 0, NULL, 2, '2024-03-03 11:00:00'),
            (503, 403, 201, NULL, NULL, NULL, NULL, 3, '2024-03-04 11:00:00'),
            (504, 401, 202, 303, 'Confirmed', 1800, NULL, 1, '2024-03-10 11:00:00'),
            (505, 402, 203, NULL, 'Available', 2500, 'Tea fan', 1, '2024-09-13 11:00:00');
        ",
    )
}
