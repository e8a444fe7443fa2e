//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for LogicError {
  fn into_response(self) -> Response {
    let status = match self {
      LogicError::UnknownLesson(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(ErrorOut { message: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_lessons(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(LessonsOut { lessons: list_lessons(&state) })
}

#[instrument(level = "info", skip(state), fields(%q.lesson_id))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonQuery>,
) -> Result<Json<LessonOut>, LogicError> {
  let lesson = lesson_view(&state, &q.lesson_id)?;
  info!(target: "lesson", id = %q.lesson_id, "HTTP lesson served");
  Ok(Json(lesson))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len(), timeout_secs = ?body.timeout_secs))]
pub async fn http_post_run(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RunIn>,
) -> impl IntoResponse {
  Json(run_code(&state, &body.code, body.timeout_secs).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.lesson_id, code_len = body.code.len()))]
pub async fn http_post_grade(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GradeIn>,
) -> Result<Json<GradeOut>, LogicError> {
  let out = grade_submission(&state, &body.lesson_id, &body.code).await?;
  info!(target: "lesson", id = %body.lesson_id, score = out.score, total = out.total, "HTTP grade evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%q.lesson_id))]
pub async fn http_get_solution(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonQuery>,
) -> Result<Json<SolutionOut>, LogicError> {
  Ok(Json(reveal_solution(&state, &q.lesson_id)?))
}
