pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question, QuestionRecord};

/// Path that selects a private in-memory database instead of a file.
pub const IN_MEMORY: &str = ":memory:";

pub async fn establish_connection(path: &str) -> Result<SqlitePool, Error> {
    if path == IN_MEMORY {
        // every connection to :memory: opens its own database, so keep exactly one alive
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePool::connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = establish_connection(IN_MEMORY).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_seed_categories() {
        let pool = test_pool().await;
        let categories = queries::categories::get_all_categories(&pool).await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(
            names,
            ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();
        let categories = queries::categories::get_all_categories(&pool).await.unwrap();
        assert_eq!(categories.len(), 6);
    }
}
