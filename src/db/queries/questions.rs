use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A question row as stored, with the category as a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// A question joined with its category, the shape clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestionRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: i64,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

const SELECT_RECORDS: &str = r#"
        SELECT questions.id, questions.question, questions.answer, categories.type AS category, questions.difficulty
        FROM questions JOIN categories ON questions.category = categories.id
        "#;

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<QuestionRecord>> {
    sqlx::query_as::<_, QuestionRecord>(&format!(
        "{SELECT_RECORDS} ORDER BY questions.id LIMIT ?1 OFFSET ?2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn get_question_record(pool: &SqlitePool, id: i64) -> sqlx::Result<QuestionRecord> {
    sqlx::query_as::<_, QuestionRecord>(&format!("{SELECT_RECORDS} WHERE questions.id = ?1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category_id: i64,
) -> sqlx::Result<Vec<QuestionRecord>> {
    sqlx::query_as::<_, QuestionRecord>(&format!(
        "{SELECT_RECORDS} WHERE questions.category = ?1 ORDER BY questions.id"
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await
}

pub async fn get_all_question_records(pool: &SqlitePool) -> sqlx::Result<Vec<QuestionRecord>> {
    sqlx::query_as::<_, QuestionRecord>(&format!("{SELECT_RECORDS} ORDER BY questions.id"))
        .fetch_all(pool)
        .await
}

/// Case-insensitive substring search over the question text.
///
/// SQLite `LIKE` and `lower()` only fold ASCII, so matching happens here with
/// Unicode lowercasing. The term is taken literally, `%` and `_` included.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<QuestionRecord>> {
    let needle = term.to_lowercase();
    let mut questions = get_all_question_records(pool).await?;
    questions.retain(|q| q.question.to_lowercase().contains(&needle));
    Ok(questions)
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Deletes a question, failing with `RowNotFound` when the id does not exist.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_question(question: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: question.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 2,
        }
    }

    #[tokio::test]
    async fn created_question_is_joined_with_category() {
        let pool = test_pool().await;
        let id = create_question(&pool, &new_question("What is H2O?", 1))
            .await
            .unwrap();

        let record = get_question_record(&pool, id).await.unwrap();
        assert_eq!(record.question, "What is H2O?");
        assert_eq!(record.category, "Science");
        assert_eq!(record.difficulty, 2);
    }

    #[tokio::test]
    async fn unknown_category_violates_foreign_key() {
        let pool = test_pool().await;
        let err = create_question(&pool, &new_question("Orphan?", 99))
            .await
            .unwrap_err();
        let db_err = err.as_database_error().expect("database error");
        assert!(db_err.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn pages_are_bounded_and_ordered() {
        let pool = test_pool().await;
        for n in 0..13 {
            create_question(&pool, &new_question(&format!("Question {n}"), 1 + n % 6))
                .await
                .unwrap();
        }

        let first = get_questions_page(&pool, 10, 0).await.unwrap();
        let second = get_questions_page(&pool, 10, 10).await.unwrap();
        let past_end = get_questions_page(&pool, 10, 30).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 3);
        assert!(past_end.is_empty());
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(count_questions(&pool).await.unwrap(), 13);
    }

    #[tokio::test]
    async fn search_ignores_case_and_matches_wildcards_literally() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Whose autobiography is entitled 'I Know Why'?", 4))
            .await
            .unwrap();
        create_question(&pool, &new_question("What is 100% of 3?", 1))
            .await
            .unwrap();
        create_question(&pool, &new_question("What is 50 of 3?", 1))
            .await
            .unwrap();

        let found = search_questions(&pool, "AUTOBIOGRAPHY").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "History");

        let percent = search_questions(&pool, "0%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].question, "What is 100% of 3?");

        assert_eq!(search_questions(&pool, "").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_missing_question_is_row_not_found() {
        let pool = test_pool().await;
        let id = create_question(&pool, &new_question("Short lived?", 2))
            .await
            .unwrap();

        delete_question(&pool, id).await.unwrap();
        let err = delete_question(&pool, id).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn filters_by_category() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Art one", 2)).await.unwrap();
        create_question(&pool, &new_question("Art two", 2)).await.unwrap();
        create_question(&pool, &new_question("Sport one", 6)).await.unwrap();

        let art = get_questions_for_category(&pool, 2).await.unwrap();
        assert_eq!(art.len(), 2);
        assert!(art.iter().all(|q| q.category == "Art"));
        assert!(get_questions_for_category(&pool, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Qui a écrit « Émile »?", 4))
            .await
            .unwrap();
        create_question(&pool, &new_question("Wer schrieb ÜBER das Meer?", 4))
            .await
            .unwrap();

        let found = search_questions(&pool, "émile").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "Qui a écrit « Émile »?");
        assert_eq!(search_questions(&pool, "über").await.unwrap().len(), 1);
    }
}
