use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        QuestionRecord,
    },
    quiz::{pick_question, QuizCategory},
    server::{
        app::AppState,
        deserializers::LenientI64,
        error::{ApiError, ApiResponse},
    },
    settings::Settings,
    telemetry::QUIZ_ROUNDS_CNTR,
};

#[derive(Deserialize)]
struct QuizBody {
    #[serde(default)]
    previous_questions: Option<Vec<LenientI64>>,
    quiz_category: Option<QuizCategoryBody>,
}

#[derive(Deserialize)]
struct QuizCategoryBody {
    #[serde(rename = "type", default)]
    kind: String,
    id: Option<LenientI64>,
}

#[derive(Serialize)]
struct QuizRound {
    success: bool,
    question: Option<QuestionRecord>,
}

impl From<Option<QuizCategoryBody>> for QuizCategory {
    fn from(body: Option<QuizCategoryBody>) -> Self {
        match body {
            Some(body) => QuizCategory::from_request(&body.kind, body.id.map(|id| id.0)),
            None => QuizCategory::All,
        }
    }
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    State(settings): State<Arc<Settings>>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Json<QuizRound>> {
    let Json(body) = body?;
    let previous: Vec<i64> = body
        .previous_questions
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.0)
        .collect();

    let (label, candidates) = match QuizCategory::from(body.quiz_category) {
        QuizCategory::All => (
            "all".to_owned(),
            questions::get_all_question_records(&pool).await?,
        ),
        QuizCategory::Index(index) => {
            let id = settings.category_id(index).ok_or_else(ApiError::not_found)?;
            let category = categories::get_category(&pool, id).await?;
            (
                category.kind,
                questions::get_questions_for_category(&pool, id).await?,
            )
        }
    };

    let question = pick_question(candidates, &previous, &mut rand::thread_rng());
    let outcome = if question.is_some() { "question" } else { "exhausted" };
    QUIZ_ROUNDS_CNTR
        .with_label_values(&[label.as_str(), outcome])
        .inc();
    tracing::debug!(category = %label, seen = previous.len(), outcome, "quiz round");

    Ok(Json(QuizRound {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
