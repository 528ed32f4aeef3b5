use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, QuestionRecord,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_lenient_page, LenientI64},
        error::{ApiError, ApiResponse},
    },
    settings::Settings,
    telemetry::QUESTION_CHANGES_CNTR,
};

const DIFFICULTIES: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_page")]
    page: Option<i64>,
}

#[derive(Deserialize)]
struct NewQuestionBody {
    question: String,
    answer: String,
    category: LenientI64,
    difficulty: LenientI64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<QuestionRecord>,
    total_questions: i64,
    current_category: Option<String>,
    categories: Vec<String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<QuestionRecord>,
    total_questions: usize,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    question: QuestionRecord,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

impl TryFrom<NewQuestionBody> for NewQuestion {
    type Error = ApiError;

    fn try_from(body: NewQuestionBody) -> Result<Self, Self::Error> {
        if body.question.trim().is_empty() || body.answer.trim().is_empty() {
            return Err(ApiError::Unprocessable(
                "question and answer must not be empty".to_owned(),
            ));
        }
        if !DIFFICULTIES.contains(&body.difficulty.0) {
            return Err(ApiError::Unprocessable(format!(
                "difficulty must be between {} and {}",
                DIFFICULTIES.start(),
                DIFFICULTIES.end()
            )));
        }
        Ok(NewQuestion {
            question: body.question,
            answer: body.answer,
            category: body.category.0,
            difficulty: body.difficulty.0,
        })
    }
}

async fn questions_page(
    State(pool): State<SqlitePool>,
    State(settings): State<Arc<Settings>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = query.ok().and_then(|Query(q)| q.page).unwrap_or(1);
    let per_page = i64::from(settings.questions_per_page);
    let offset = (page - 1).saturating_mul(per_page);

    Ok(Json(QuestionsPage {
        success: true,
        questions: questions::get_questions_page(&pool, per_page, offset).await?,
        total_questions: questions::count_questions(&pool).await?,
        current_category: None,
        categories: categories::get_category_types(&pool).await?,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<Created>)> {
    let Json(body) = body?;
    let new_question = NewQuestion::try_from(body)?;
    let id = questions::create_question(&pool, &new_question).await?;
    QUESTION_CHANGES_CNTR.with_label_values(&["created"]).inc();
    tracing::info!(id, category = new_question.category, "created question");

    Ok((
        StatusCode::CREATED,
        Json(Created {
            success: true,
            created: id,
            question: questions::get_question_record(&pool, id).await?,
        }),
    ))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Deleted>> {
    let Path(id) = id?;
    questions::delete_question(&pool, id).await?;
    QUESTION_CHANGES_CNTR.with_label_values(&["deleted"]).inc();
    tracing::info!(id, "deleted question");

    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<SearchResults>> {
    let Json(SearchBody { search_term }) = body?;
    let questions = questions::search_questions(&pool, &search_term).await?;

    Ok(Json(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search_questions))
        .with_state(state)
}
