//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "code_teacher", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "code_teacher", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = handle_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "code_teacher", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "code_teacher", "WebSocket disconnected");
}

/// Parse, dispatch, serialize. Always yields exactly one reply.
async fn handle_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "code_teacher", kind = message_kind(&incoming), "WS received");
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

// Submitted code stays out of the logs; only the message kind is recorded.
fn message_kind(msg: &ClientWsMessage) -> &'static str {
  match msg {
    ClientWsMessage::Ping => "ping",
    ClientWsMessage::ListLessons => "list_lessons",
    ClientWsMessage::GetLesson { .. } => "get_lesson",
    ClientWsMessage::Run { .. } => "run",
    ClientWsMessage::Grade { .. } => "grade",
    ClientWsMessage::ShowSolution { .. } => "show_solution",
  }
}

#[instrument(level = "info", skip_all)]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListLessons => ServerWsMessage::Lessons { lessons: list_lessons(state) },

    ClientWsMessage::GetLesson { lesson_id } => match lesson_view(state, &lesson_id) {
      Ok(lesson) => ServerWsMessage::Lesson { lesson },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Run { code, timeout_secs } => {
      ServerWsMessage::RunResult(run_code(state, &code, timeout_secs).await)
    }

    ClientWsMessage::Grade { lesson_id, code } => match grade_submission(state, &lesson_id, &code).await {
      Ok(out) => {
        info!(target: "lesson", id = %lesson_id, score = out.score, total = out.total, "WS grade evaluated");
        ServerWsMessage::GradeResult(out)
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::ShowSolution { lesson_id } => match reveal_solution(state, &lesson_id) {
      Ok(out) => ServerWsMessage::Solution(out),
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TeacherConfig;

  fn state() -> AppState {
    AppState::from_config(TeacherConfig::default())
  }

  async fn reply(txt: &str) -> serde_json::Value {
    serde_json::from_str(&handle_text(txt, &state()).await).unwrap()
  }

  #[tokio::test]
  async fn invalid_json_gets_error_reply() {
    let v = reply("{not json").await;
    assert_eq!(v["type"], "error");
    assert!(v["message"].as_str().unwrap().starts_with("Invalid JSON:"));
  }

  #[tokio::test]
  async fn ping_and_listing() {
    assert_eq!(reply(r#"{"type":"ping"}"#).await["type"], "pong");

    let v = reply(r#"{"type":"list_lessons"}"#).await;
    assert_eq!(v["type"], "lessons");
    assert_eq!(v["lessons"][0]["id"], "python-basics");
  }

  #[tokio::test]
  async fn lesson_and_solution_lookups() {
    let v = reply(r#"{"type":"get_lesson","lessonId":"logic-puzzles"}"#).await;
    assert_eq!(v["type"], "lesson");
    assert_eq!(v["lesson"]["title"], "Logic Puzzles");
    assert!(v["lesson"].get("solution").is_none());
    assert!(v["lesson"]["challenge"].get("solution").is_none());

    let v = reply(r#"{"type":"show_solution","lessonId":"logic-puzzles"}"#).await;
    assert_eq!(v["type"], "solution");
    assert!(v["solution"].as_str().unwrap().contains("def xor"));

    let v = reply(r#"{"type":"grade","lessonId":"missing","code":""}"#).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["message"], "Unknown lessonId: missing");
  }
}
