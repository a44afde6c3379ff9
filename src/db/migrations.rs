// src/db/migrations.rs

//! Versioned schema migrations.
//!
//! Each migration runs in its own transaction and is recorded in `schema_version`.
//! Databases created before versioning existed already carry some of the later
//! columns, so column additions check `pragma_table_info` first and skip when the
//! column is present.

use sqlx::{SqliteConnection, SqlitePool};

/// One schema change.
#[derive(Debug)]
pub enum Step {
    /// One or more statements executed as-is.
    Sql(&'static str),
    /// `ALTER TABLE <table> ADD COLUMN <column> <definition>`, skipped if the column exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
}

#[derive(Debug)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub steps: &'static [Step],
}

/// All migrations, in ascending version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "base tables",
        steps: &[Step::Sql(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                title TEXT,
                image_path TEXT,
                notes TEXT,
                references_text TEXT,
                difficulty INTEGER DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS solutions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_id INTEGER NOT NULL,
                image_path TEXT,
                content TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                color TEXT
            );

            CREATE TABLE IF NOT EXISTS question_tags (
                question_id INTEGER,
                tag_id INTEGER,
                PRIMARY KEY (question_id, tag_id),
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS question_pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_id INTEGER NOT NULL,
                image_path TEXT,
                content TEXT,
                page_order INTEGER DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );
            "#,
        )],
    },
    Migration {
        version: 2,
        description: "questions.year",
        steps: &[Step::AddColumn {
            table: "questions",
            column: "year",
            definition: "INTEGER",
        }],
    },
    Migration {
        version: 3,
        description: "solutions.page_order",
        steps: &[Step::AddColumn {
            table: "solutions",
            column: "page_order",
            definition: "INTEGER DEFAULT 0",
        }],
    },
    Migration {
        version: 4,
        description: "courses.sort_order",
        steps: &[Step::AddColumn {
            table: "courses",
            column: "sort_order",
            definition: "INTEGER DEFAULT 0",
        }],
    },
    Migration {
        version: 5,
        description: "solutions.title",
        steps: &[Step::AddColumn {
            table: "solutions",
            column: "title",
            definition: "TEXT",
        }],
    },
    Migration {
        version: 6,
        description: "questions.type",
        steps: &[Step::AddColumn {
            table: "questions",
            column: "type",
            definition: "TEXT",
        }],
    },
    Migration {
        version: 7,
        description: "questions.question_number",
        steps: &[Step::AddColumn {
            table: "questions",
            column: "question_number",
            definition: "INTEGER",
        }],
    },
    Migration {
        version: 8,
        description: "solutions.group_id with legacy backfill",
        steps: &[
            Step::AddColumn {
                table: "solutions",
                column: "group_id",
                definition: "TEXT",
            },
            Step::Sql("UPDATE solutions SET group_id = 'legacy-' || id WHERE group_id IS NULL"),
        ],
    },
    Migration {
        version: 9,
        description: "lookup indexes",
        steps: &[Step::Sql(
            r#"
            CREATE INDEX IF NOT EXISTS idx_questions_course_id ON questions(course_id);
            CREATE INDEX IF NOT EXISTS idx_question_pages_question_id ON question_pages(question_id);
            CREATE INDEX IF NOT EXISTS idx_solutions_question_id ON solutions(question_id);
            CREATE INDEX IF NOT EXISTS idx_question_tags_tag_id ON question_tags(tag_id);
            "#,
        )],
    },
];

/// Applies every migration not yet recorded in `schema_version`.
/// Returns the number of migrations applied by this call.
pub async fn run(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(pool)
        .await?;

    let mut count = 0;
    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        let mut tx = pool.begin().await?;
        for step in migration.steps {
            apply_step(&mut *tx, step).await?;
        }
        sqlx::query("INSERT INTO schema_version (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            version = migration.version,
            "Applied migration: {}",
            migration.description
        );
        count += 1;
    }

    Ok(count)
}

async fn apply_step(conn: &mut SqliteConnection, step: &Step) -> Result<(), sqlx::Error> {
    match step {
        Step::Sql(sql) => {
            sqlx::raw_sql(sql).execute(&mut *conn).await?;
        }
        Step::AddColumn {
            table,
            column,
            definition,
        } => {
            if column_exists(conn, table, column).await? {
                tracing::debug!("Column {}.{} already present, skipping", table, column);
                return Ok(());
            }
            let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition);
            sqlx::raw_sql(&sql).execute(&mut *conn).await?;
        }
    }
    Ok(())
}

async fn column_exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.first(), Some(&1));
    }
}
