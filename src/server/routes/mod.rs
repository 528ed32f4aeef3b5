mod categories;
mod questions;
mod quizzes;
mod status;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;
pub use status::status_router;
