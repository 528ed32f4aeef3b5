use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use trivia_api::db::queries::categories::{get_all_categories, import_categories};
use trivia_api::db::queries::questions::{get_all_questions, import_questions};
use trivia_api::db::{establish_connection, run_migrations, Category, Question};
use trivia_api::telemetry::init_tracing;

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database path
    db_path: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories and questions from a directory of CSV files
    Import { path: PathBuf },
    /// Export categories and questions to a directory of CSV files
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let db_path = cli.db_path.to_string_lossy();
    let pool = establish_connection(&db_path)
        .await
        .context("Cannot connect to DB")?;
    run_migrations(&pool).await.context("Migrations failed")?;

    match cli.command {
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export")?,
        Commands::Import { path } => import_data(&pool, &path).await.context("Cannot import")?,
    }
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    rows.iter().try_for_each(|row| wtr.serialize(row))?;
    wtr.flush()?;
    tracing::debug!(rows = rows.len(), "Wrote {}", path.display());
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("Cannot open {}", path.display()))?;
    rdr.deserialize::<T>()
        .enumerate()
        .map(|(n, row)| row.with_context(|| format!("Bad row {} in {}", n + 1, path.display())))
        .collect()
}

async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        path.display()
    );
    write_csv(&path.join(CATEGORIES_FILE), &categories)?;
    write_csv(&path.join(QUESTIONS_FILE), &questions)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_csv(&path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_csv(&path.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        path.display()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_api::db::IN_MEMORY;

    #[tokio::test]
    async fn export_then_import_into_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let source = establish_connection(IN_MEMORY).await.unwrap();
        run_migrations(&source).await.unwrap();
        import_questions(
            &source,
            vec![Question {
                id: 17,
                question: "Which planet is largest?".to_owned(),
                answer: "Jupiter".to_owned(),
                category: 1,
                difficulty: 2,
            }],
        )
        .await
        .unwrap();
        export_data(&source, dir.path()).await.unwrap();

        let header = std::fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert!(header.starts_with("id,type"));

        let target = establish_connection(IN_MEMORY).await.unwrap();
        run_migrations(&target).await.unwrap();
        import_data(&target, dir.path()).await.unwrap();

        let questions = get_all_questions(&target).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 17);
        assert_eq!(questions[0].answer, "Jupiter");
        assert_eq!(get_all_categories(&target).await.unwrap().len(), 6);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv::<Category>(&dir.path().join(CATEGORIES_FILE)).unwrap_err();
        assert!(err.to_string().contains(CATEGORIES_FILE));
    }

    #[test]
    fn bad_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATEGORIES_FILE);
        std::fs::write(&path, "id,type\n1,Science\nx,Art\n").unwrap();
        let err = read_csv::<Category>(&path).unwrap_err();
        assert!(err.to_string().contains("Bad row 2"));
    }
}
