use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: [&str; 5] = [
    r"
        CREATE TABLE IF NOT EXISTS Topic (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS Question (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topicId INTEGER REFERENCES Topic(id),
            text TEXT NOT NULL
        );
    ",
    r#"
        CREATE TABLE IF NOT EXISTS "Option" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            questionId INTEGER REFERENCES Question(id),
            text TEXT NOT NULL,
            isCorrect BOOLEAN DEFAULT false
        );
    "#,
    r"
        CREATE INDEX IF NOT EXISTS idx_question_topic ON Question(topicId);
    ",
    r#"
        CREATE INDEX IF NOT EXISTS idx_option_question ON "Option"(questionId);
    "#,
];

/// Applies the schema once, recording it in `schema_migrations`.
///
/// Version 1 creates `Topic`, `Question` and `Option`. Foreign keys are
/// declared without cascades; dependent rows are removed by the repositories.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
        ",
    )
    .execute(pool)
    .await?;

    let applied = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
        .bind(1_i64)
        .fetch_optional(pool)
        .await?
        .is_some();
    if applied {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for statement in SCHEMA_V1 {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(1_i64)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(version = 1, "applied schema migration");
    Ok(())
}
