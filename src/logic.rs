//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Listing lessons and rendering one for the learner
//!   - Running free-form code through the executor
//!   - Grading a submission against a lesson's challenge tests
//!   - Revealing the reference solution

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::grader::grade;
use crate::protocol::{to_out, to_summary, GradeOut, LessonOut, LessonSummary, RunOut, SolutionOut};
use crate::state::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogicError {
  #[error("Unknown lessonId: {0}")]
  UnknownLesson(String),
}

pub fn list_lessons(state: &AppState) -> Vec<LessonSummary> {
  state.lessons.iter().map(to_summary).collect()
}

pub fn lesson_view(state: &AppState, lesson_id: &str) -> Result<LessonOut, LogicError> {
  state
    .lesson(lesson_id)
    .map(to_out)
    .ok_or_else(|| LogicError::UnknownLesson(lesson_id.to_string()))
}

#[instrument(level = "info", skip(state, code), fields(code_len = code.len()))]
pub async fn run_code(state: &AppState, code: &str, timeout_secs: Option<u64>) -> RunOut {
  let timeout = state.executor.clamp_timeout(timeout_secs);
  let res = state.executor.run(code, Some(timeout)).await;
  info!(
    target: "code_teacher",
    timed_out = res.timed_out,
    launch_failed = res.launch_failed,
    stdout_len = res.stdout.len(),
    stderr_len = res.stderr.len(),
    "Run finished"
  );
  RunOut::from(res)
}

#[instrument(level = "info", skip(state, code), fields(%lesson_id, code_len = code.len()))]
pub async fn grade_submission(state: &AppState, lesson_id: &str, code: &str) -> Result<GradeOut, LogicError> {
  let lesson = state.lesson(lesson_id).ok_or_else(|| {
    warn!(target: "lesson", %lesson_id, "Grade requested for unknown lesson");
    LogicError::UnknownLesson(lesson_id.to_string())
  })?;
  let res = grade(&state.executor, code, &lesson.challenge.tests).await;
  Ok(GradeOut::from(res))
}

#[instrument(level = "info", skip(state), fields(%lesson_id))]
pub fn reveal_solution(state: &AppState, lesson_id: &str) -> Result<SolutionOut, LogicError> {
  let lesson = state
    .lesson(lesson_id)
    .ok_or_else(|| LogicError::UnknownLesson(lesson_id.to_string()))?;
  info!(target: "lesson", %lesson_id, "Solution revealed");
  Ok(SolutionOut { lesson_id: lesson.id.clone(), solution: lesson.challenge.solution.clone() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TeacherConfig;
  use crate::executor::Executor;
  use tempfile::TempDir;

  fn state() -> AppState {
    AppState::from_config(TeacherConfig::default())
  }

  #[test]
  fn lists_and_views_lessons() {
    let st = state();
    let titles: Vec<_> = list_lessons(&st).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Python Basics", "Logic Puzzles"]);

    let view = lesson_view(&st, "logic-puzzles").unwrap();
    assert_eq!(view.challenge.tests.len(), 3);
    assert!(view.challenge.starter.starts_with("def xor(a, b):"));

    assert_eq!(
      lesson_view(&st, "nope").unwrap_err(),
      LogicError::UnknownLesson("nope".into())
    );
  }

  #[test]
  fn reveals_solution() {
    let st = state();
    let out = reveal_solution(&st, "python-basics").unwrap();
    assert!(out.solution.contains("def is_prime(n):"));
    assert_eq!(reveal_solution(&st, "missing").unwrap_err().to_string(), "Unknown lessonId: missing");
  }

  #[tokio::test]
  async fn unknown_lesson_is_not_graded() {
    let st = state();
    assert!(grade_submission(&st, "missing", "x = 1").await.is_err());
  }

  #[tokio::test]
  async fn run_uses_configured_executor() {
    let dir = TempDir::new().unwrap();
    let st = state().with_executor(Executor::new("sh").with_scratch_dir(dir.path()));
    let out = run_code(&st, "echo hello", Some(2)).await;
    assert_eq!(out.stdout, "hello\n");
    assert!(!out.timed_out);
    assert!(out.warning.contains("Avoid untrusted code"));
  }
}
