//! Application state: the lesson registry and the executor.
//!
//! Both are built once at startup and never mutated afterwards, so handlers
//! share them through a plain `Arc<AppState>` with no locking. Every run or
//! grade request gets its own child process and temp file.

use tracing::{info, instrument, warn};

use crate::config::{load_config_from_env, TeacherConfig};
use crate::domain::{Lesson, LessonRegistry};
use crate::executor::Executor;
use crate::seeds::seed_lessons;

pub struct AppState {
    pub lessons: LessonRegistry,
    pub executor: Executor,
}

impl AppState {
    /// Build state from env: load config, then seed lessons followed by configured ones.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env())
    }

    pub fn from_config(cfg: TeacherConfig) -> Self {
        let seeds = seed_lessons();
        let seed_count = seeds.len();
        let configured: Vec<Lesson> = cfg.lessons.into_iter().map(Lesson::from).collect();
        let configured_count = configured.len();

        for l in &configured {
            if l.challenge.tests.is_empty() {
                warn!(target: "lesson", id = %l.id, "Configured lesson has no tests; grading will always score 0 / 0");
            }
        }

        let lessons = LessonRegistry::new(seeds.into_iter().chain(configured));
        info!(
            target: "lesson",
            total = lessons.len(),
            seeds = seed_count,
            configured = configured_count,
            "Startup lesson inventory"
        );

        let executor = Executor::from_config(&cfg.executor);
        info!(
            target: "code_teacher",
            interpreter = %executor.interpreter(),
            default_timeout_secs = executor.default_timeout().as_secs(),
            "Executor ready (process isolation + timeout only; no resource sandboxing)"
        );

        Self { lessons, executor }
    }

    #[cfg(test)]
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.get(id)
    }
}
