// tests/migration_tests.rs

mod common;

use common::temp_root;
use exam_archive::db::{self, migrations};

#[tokio::test]
async fn migrations_are_idempotent() {
    let root = temp_root();
    let url = format!("sqlite://{}", root.join("fresh.db").display());

    let pool = db::connect(&url).await.unwrap();
    let applied = migrations::run(&pool).await.unwrap();
    assert_eq!(applied, migrations::MIGRATIONS.len());

    let applied_again = migrations::run(&pool).await.unwrap();
    assert_eq!(applied_again, 0);

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(versions, migrations::MIGRATIONS.len() as i64);

    pool.close().await;
    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
async fn legacy_database_is_upgraded_in_place() {
    let root = temp_root();
    let url = format!("sqlite://{}", root.join("legacy.db").display());
    let pool = db::connect(&url).await.unwrap();

    // A database from before versioning: some later columns already exist,
    // solutions have no group_id yet.
    sqlx::raw_sql(
        r#"
        CREATE TABLE courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            sort_order INTEGER DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            title TEXT,
            image_path TEXT,
            notes TEXT,
            references_text TEXT,
            difficulty INTEGER DEFAULT 0,
            year INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        );
        CREATE TABLE solutions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL,
            image_path TEXT,
            content TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
        );
        INSERT INTO courses (code, title) VALUES ('OLD', 'Old course');
        INSERT INTO questions (course_id, title, image_path, year) VALUES (1, 'Scan', '/uploads/scan.png', 2019);
        INSERT INTO solutions (question_id, content) VALUES (1, 'first');
        INSERT INTO solutions (question_id, content) VALUES (1, 'second');
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    migrations::run(&pool).await.unwrap();

    let groups: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, group_id FROM solutions ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        groups,
        vec![(1, "legacy-1".to_string()), (2, "legacy-2".to_string())]
    );

    let (year, question_type): (Option<i64>, Option<String>) =
        sqlx::query_as("SELECT year, type FROM questions WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(year, Some(2019));
    assert_eq!(question_type, None);

    let detail = exam_archive::services::queries::question_detail(&pool, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.pages.len(), 1);
    assert!(detail.pages[0].is_legacy());
    assert_eq!(detail.solution_groups.len(), 2);
    assert_eq!(detail.solution_groups[0].id, "legacy-1");

    pool.close().await;
    std::fs::remove_dir_all(&root).unwrap();
}
