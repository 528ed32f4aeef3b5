use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        QuestionRecord,
    },
    server::{app::AppState, error::{ApiError, ApiResponse}},
    settings::Settings,
};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: Vec<String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<QuestionRecord>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesBody>> {
    Ok(Json(CategoriesBody {
        success: true,
        categories: categories::get_category_types(&pool).await?,
    }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    State(settings): State<Arc<Settings>>,
    index: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let Path(index) = index?;
    let id = settings.category_id(index).ok_or_else(ApiError::not_found)?;
    let category = categories::get_category(&pool, id).await?;
    let questions = questions::get_questions_for_category(&pool, category.id).await?;

    Ok(Json(CategoryQuestionsBody {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{index}/questions", get(category_questions))
        .with_state(state)
}
