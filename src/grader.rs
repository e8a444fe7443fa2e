//! Scores a submission against a challenge's (expression, expected) pairs.
//!
//! The submission is extended with a driver block that evaluates each test
//! expression in order and prints its `repr()`, or a sentinel-prefixed line if
//! the expression raised. The augmented program goes through the [`Executor`]
//! and the captured stdout is matched line-by-line against the test cases.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::TestCase;
use crate::executor::Executor;
use crate::literal::Literal;
use crate::util::trunc_for_log;

/// Marks a driver line whose expression raised instead of returning.
pub const ERROR_SENTINEL: &str = "<<ERROR>>";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
  Pass,
  Fail,
  Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GradeResult {
  /// Number of PASS verdicts.
  pub score: usize,
  /// One line per graded test, in test order.
  pub feedback: Vec<String>,
  /// Trailing tests with no output line. They are neither passed nor failed.
  pub ungraded: usize,
  /// Whatever the augmented program wrote to stderr (tracebacks, timeout message).
  pub stderr: String,
}

impl GradeResult {
  pub fn total(&self) -> usize {
    self.feedback.len()
  }

  pub fn summary(&self) -> String {
    format!("Score: {} / {}", self.score, self.total())
  }
}

/// Append the driver block to `code`.
pub fn build_driver(code: &str, tests: &[TestCase]) -> String {
  let mut runner = format!("{code}\n\nif __name__ == '__main__':\n");
  if tests.is_empty() {
    runner.push_str("    pass\n");
  }
  for t in tests {
    runner.push_str(&format!(
      "    try:\n        _r = {expr}\n        print(repr(_r))\n    except Exception as e:\n        print('{ERROR_SENTINEL}' + str(e).replace('\\n', ' '))\n",
      expr = t.expression,
    ));
  }
  runner
}

/// Verdict for one output line, plus its feedback text.
pub fn judge_line(test: &TestCase, line: &str) -> (Verdict, String) {
  let expr = &test.expression;
  let expected = &test.expected;
  if line.starts_with(ERROR_SENTINEL) {
    (Verdict::Error, format!("{expr} -> ERROR ({expected})"))
  } else if line == expected || Literal::parse(expected).is_some_and(|lit| lit.repr() == line) {
    (Verdict::Pass, format!("{expr} -> PASS"))
  } else {
    (Verdict::Fail, format!("{expr} -> FAIL (got {line}, expected {expected})"))
  }
}

/// Zip driver output with the tests positionally. Surplus tests stay ungraded.
pub fn score_output(tests: &[TestCase], stdout: &str) -> GradeResult {
  let mut res = GradeResult::default();
  let mut graded = 0;
  for (test, line) in tests.iter().zip(stdout.trim().lines()) {
    let (verdict, text) = judge_line(test, line);
    if verdict == Verdict::Pass {
      res.score += 1;
    }
    res.feedback.push(text);
    graded += 1;
  }
  res.ungraded = tests.len() - graded;
  res
}

#[instrument(level = "info", skip(executor, code, tests), fields(code_len = code.len(), tests = tests.len()))]
pub async fn grade(executor: &Executor, code: &str, tests: &[TestCase]) -> GradeResult {
  let program = build_driver(code, tests);
  let run = executor.run(&program, None).await;
  if !run.stderr.is_empty() {
    debug!(target: "grader", stderr = %trunc_for_log(&run.stderr, 200), timed_out = run.timed_out, "Driver wrote to stderr");
  }

  let mut res = score_output(tests, &run.stdout);
  res.stderr = run.stderr;
  info!(target: "grader", score = res.score, total = res.total(), ungraded = res.ungraded, "Graded submission");
  res
}
