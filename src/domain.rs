//! Domain models: lessons, their single challenge, and the test cases used for grading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One (expression, expected) pair. Matched positionally against driver output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
  pub expression: String,
  /// Literal text of the correct result, spelled the way the lesson language prints it.
  pub expected: String,
}

impl TestCase {
  pub fn new(expression: impl Into<String>, expected: impl Into<String>) -> Self {
    Self { expression: expression.into(), expected: expected.into() }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
  pub prompt: String,
  pub starter: String,
  pub tests: Vec<TestCase>,
  pub solution: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub id: String,
  pub title: String,
  pub content: String,
  pub challenge: Challenge,
}

/// Ordered, read-only set of lessons built once at startup.
///
/// Lookups go through an id index; iteration keeps insertion order so the
/// lesson picker shows lessons in the order they were authored.
#[derive(Clone, Debug, Default)]
pub struct LessonRegistry {
  lessons: Vec<Lesson>,
  index: HashMap<String, usize>,
}

impl LessonRegistry {
  /// Build a registry. The first lesson with a given id wins; later duplicates are skipped.
  pub fn new(lessons: impl IntoIterator<Item = Lesson>) -> Self {
    let mut reg = Self::default();
    for lesson in lessons {
      if reg.index.contains_key(&lesson.id) {
        warn!(target: "lesson", id = %lesson.id, "Skipping duplicate lesson id");
        continue;
      }
      reg.index.insert(lesson.id.clone(), reg.lessons.len());
      reg.lessons.push(lesson);
    }
    reg
  }

  pub fn get(&self, id: &str) -> Option<&Lesson> {
    self.index.get(id).map(|&i| &self.lessons[i])
  }

  pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
    self.lessons.iter()
  }

  pub fn len(&self) -> usize {
    self.lessons.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.lessons.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lesson(id: &str, title: &str) -> Lesson {
    Lesson {
      id: id.into(),
      title: title.into(),
      content: String::new(),
      challenge: Challenge {
        prompt: String::new(),
        starter: String::new(),
        tests: vec![TestCase::new("f()", "1")],
        solution: String::new(),
      },
    }
  }

  #[test]
  fn keeps_insertion_order() {
    let reg = LessonRegistry::new([lesson("b", "B"), lesson("a", "A"), lesson("c", "C")]);
    let ids: Vec<_> = reg.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
  }

  #[test]
  fn first_duplicate_wins() {
    let reg = LessonRegistry::new([lesson("a", "first"), lesson("a", "second")]);
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.get("a").map(|l| l.title.as_str()), Some("first"));
    assert!(reg.get("missing").is_none());
  }
}
