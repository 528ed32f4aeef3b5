use prometheus::{register_int_counter_vec, IntCounterVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_ROUNDS_CNTR: IntCounterVec = register_int_counter_vec!(
        "quiz_rounds_total",
        "Number of served quiz rounds",
        &["category", "outcome"]
    )
    .unwrap();
    pub static ref QUESTION_CHANGES_CNTR: IntCounterVec = register_int_counter_vec!(
        "questions_changed_total",
        "Number of created and deleted questions",
        &["action"]
    )
    .unwrap();
}

/// Directives used when `LOG_LEVEL` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info,trivia_api=debug,tower_http=debug,sqlx=warn";

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub fn init_tracing() {
    let span_events = std::env::var("INCLUDE_SPAN_EVENTS")
        .is_ok_and(|value| value.eq_ignore_ascii_case("true"));
    let fmt_layer = fmt::layer().with_target(true).with_span_events(if span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    });
    let level = std::env::var("LOG_LEVEL").ok();

    tracing_subscriber::registry()
        .with(log_filter(level.as_deref()))
        .with(fmt_layer)
        .init();
}
