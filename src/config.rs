//! Loading service configuration (executor settings + optional extra lessons) from TOML.
//!
//! See `TeacherConfig` and `ExecutorCfg` for the expected schema.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{Challenge, Lesson, TestCase};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read { path: String, source: std::io::Error },
  #[error("failed to parse {path}: {source}")]
  Parse { path: String, source: toml::de::Error },
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TeacherConfig {
  #[serde(default)]
  pub executor: ExecutorCfg,
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

/// How submissions are executed. Defaults match the stock Python setup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExecutorCfg {
  pub interpreter: String,
  pub interpreter_args: Vec<String>,
  pub default_timeout_secs: u64,
  pub max_timeout_secs: u64,
  pub scratch_dir: Option<PathBuf>,
}

impl Default for ExecutorCfg {
  fn default() -> Self {
    Self {
      interpreter: "python3".into(),
      interpreter_args: Vec::new(),
      default_timeout_secs: 5,
      max_timeout_secs: 30,
      scratch_dir: None,
    }
  }
}

/// Lesson entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub content: String,
  pub challenge: ChallengeCfg,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  pub prompt: String,
  #[serde(default)]
  pub starter: String,
  /// `[expression, expected]` pairs, in grading order.
  pub tests: Vec<(String, String)>,
  #[serde(default)]
  pub solution: String,
}

impl From<LessonCfg> for Lesson {
  fn from(c: LessonCfg) -> Self {
    Lesson {
      id: c.id,
      title: c.title,
      content: c.content,
      challenge: Challenge {
        prompt: c.challenge.prompt,
        starter: c.challenge.starter,
        tests: c.challenge.tests.into_iter().map(|(e, x)| TestCase::new(e, x)).collect(),
        solution: c.challenge.solution,
      },
    }
  }
}

pub fn load_config(path: &Path) -> Result<TeacherConfig, ConfigError> {
  let shown = path.display().to_string();
  let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
  toml::from_str::<TeacherConfig>(&s).map_err(|source| ConfigError::Parse { path: shown, source })
}

/// Load config from TEACHER_CONFIG_PATH, then apply the PYTHON_BIN override.
/// A missing variable or a broken file yields defaults.
pub fn load_config_from_env() -> TeacherConfig {
  let mut cfg = match std::env::var("TEACHER_CONFIG_PATH") {
    Ok(path) => match load_config(Path::new(&path)) {
      Ok(cfg) => {
        info!(target: "code_teacher", %path, lessons = cfg.lessons.len(), "Loaded teacher config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "code_teacher", %path, error = %e, "Failed to load TOML config; using defaults");
        TeacherConfig::default()
      }
    },
    Err(_) => TeacherConfig::default(),
  };

  if let Ok(bin) = std::env::var("PYTHON_BIN") {
    if !bin.trim().is_empty() {
      cfg.executor.interpreter = bin;
    }
  }
  cfg
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  #[test]
  fn parses_full_config() {
    let mut f = NamedTempFile::new().unwrap();
    write!(
      f,
      r#"
[executor]
interpreter = "/usr/bin/python3"
interpreter_args = ["-B"]
default_timeout_secs = 3

[[lessons]]
id = "loops"
title = "Loops"

[lessons.challenge]
prompt = "Write total(n)."
tests = [["total(3)", "6"], ["total(0)", "0"]]
"#
    )
    .unwrap();

    let cfg = load_config(f.path()).unwrap();
    assert_eq!(cfg.executor.interpreter, "/usr/bin/python3");
    assert_eq!(cfg.executor.interpreter_args, vec!["-B".to_string()]);
    assert_eq!(cfg.executor.default_timeout_secs, 3);
    // Unset fields keep their defaults.
    assert_eq!(cfg.executor.max_timeout_secs, 30);

    let lesson: Lesson = cfg.lessons[0].clone().into();
    assert_eq!(lesson.id, "loops");
    assert_eq!(lesson.challenge.tests, vec![TestCase::new("total(3)", "6"), TestCase::new("total(0)", "0")]);
    assert!(lesson.challenge.solution.is_empty());
  }

  #[test]
  fn empty_file_gives_defaults() {
    let f = NamedTempFile::new().unwrap();
    let cfg = load_config(f.path()).unwrap();
    assert_eq!(cfg.executor.interpreter, "python3");
    assert_eq!(cfg.executor.default_timeout_secs, 5);
    assert!(cfg.lessons.is_empty());
  }

  #[test]
  fn reports_parse_and_read_errors() {
    let mut f = NamedTempFile::new().unwrap();
    write!(f, "[executor\n").unwrap();
    assert!(matches!(load_config(f.path()), Err(ConfigError::Parse { .. })));

    let missing = f.path().with_extension("does-not-exist");
    assert!(matches!(load_config(&missing), Err(ConfigError::Read { .. })));
  }
}
