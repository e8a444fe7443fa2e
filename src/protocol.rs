//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Lesson, TestCase};
use crate::executor::{ExecutionResult, UNSAFE_WARNING};
use crate::grader::GradeResult;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListLessons,
    GetLesson {
        #[serde(rename = "lessonId")]
        lesson_id: String,
    },
    Run {
        code: String,
        #[serde(rename = "timeoutSecs", default)]
        timeout_secs: Option<u64>,
    },
    Grade {
        #[serde(rename = "lessonId")]
        lesson_id: String,
        code: String,
    },
    ShowSolution {
        #[serde(rename = "lessonId")]
        lesson_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Lessons { lessons: Vec<LessonSummary> },
    Lesson { lesson: LessonOut },
    RunResult(RunOut),
    GradeResult(GradeOut),
    Solution(SolutionOut),
    Error { message: String },
}

/// Entry in the lesson picker.
#[derive(Debug, Serialize)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
}

/// Lesson as shown to the learner. The reference solution is deliberately absent.
#[derive(Debug, Serialize)]
pub struct LessonOut {
    pub id: String,
    pub title: String,
    pub content: String,
    pub challenge: ChallengeOut,
}

#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub prompt: String,
    pub starter: String,
    pub tests: Vec<TestCase>,
}

pub fn to_summary(l: &Lesson) -> LessonSummary {
    LessonSummary { id: l.id.clone(), title: l.title.clone() }
}

/// Convert a full `Lesson` (internal) to the public DTO.
pub fn to_out(l: &Lesson) -> LessonOut {
    LessonOut {
        id: l.id.clone(),
        title: l.title.clone(),
        content: l.content.clone(),
        challenge: ChallengeOut {
            prompt: l.challenge.prompt.clone(),
            starter: l.challenge.starter.clone(),
            tests: l.challenge.tests.clone(),
        },
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
}

#[derive(Serialize)]
pub struct LessonsOut {
    pub lessons: Vec<LessonSummary>,
}

#[derive(Deserialize)]
pub struct RunIn {
    pub code: String,
    #[serde(rename = "timeoutSecs", default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOut {
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub launch_failed: bool,
    pub warning: String,
}

impl From<ExecutionResult> for RunOut {
    fn from(r: ExecutionResult) -> Self {
        RunOut {
            stdout: r.stdout,
            stderr: r.stderr,
            timed_out: r.timed_out,
            launch_failed: r.launch_failed,
            warning: UNSAFE_WARNING.into(),
        }
    }
}

#[derive(Deserialize)]
pub struct GradeIn {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct GradeOut {
    pub score: usize,
    pub total: usize,
    pub summary: String,
    pub feedback: Vec<String>,
    pub ungraded: usize,
    pub stderr: String,
}

impl From<GradeResult> for GradeOut {
    fn from(g: GradeResult) -> Self {
        GradeOut {
            score: g.score,
            total: g.total(),
            summary: g.summary(),
            ungraded: g.ungraded,
            feedback: g.feedback,
            stderr: g.stderr,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SolutionOut {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    pub solution: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_messages() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"run","code":"print(1)"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Run { timeout_secs: None, .. }));

        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"grade","lessonId":"logic-puzzles","code":"x"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Grade { ref lesson_id, .. } if lesson_id == "logic-puzzles"));

        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"list_lessons"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::ListLessons));
    }

    #[test]
    fn server_messages_are_tagged() {
        let msg = ServerWsMessage::RunResult(RunOut::from(ExecutionResult {
            stdout: "1\n".into(),
            ..ExecutionResult::default()
        }));
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "run_result");
        assert_eq!(v["stdout"], "1\n");
        assert_eq!(v["timedOut"], false);
        assert_eq!(v["warning"], UNSAFE_WARNING);
    }
}
