// SPDX-License-Identifier: GPL-3.0-only

//! JSON messages exchanged on the WebSocket channels

use crate::errors::PostureError;
use crate::posture::{RatingSample, RatingSnapshot, round1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands accepted on the command channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Calibrate,
    Reset,
    Rating,
    Graph,
}

/// Why a client message was not a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Not a JSON object with a string `action`
    Malformed(String),
    /// Well-formed but not one of the four actions
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Malformed(msg) => write!(f, "malformed message: {}", msg),
            CommandError::Unknown(action) => write!(f, "unknown action: {}", action),
        }
    }
}

impl std::error::Error for CommandError {}

#[derive(Deserialize)]
struct CommandMessage {
    action: String,
}

impl Command {
    /// Parse `{"action": "..."}`
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let message: CommandMessage =
            serde_json::from_str(text).map_err(|e| CommandError::Malformed(e.to_string()))?;

        match message.action.as_str() {
            "calibrate" => Ok(Command::Calibrate),
            "reset" => Ok(Command::Reset),
            "rating" => Ok(Command::Rating),
            "graph" => Ok(Command::Graph),
            _ => Err(CommandError::Unknown(message.action)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Reply to `calibrate` and `reset`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    pub message: String,
}

impl StatusResponse {
    pub fn calibrated(result: Result<f64, PostureError>) -> Self {
        match result {
            Ok(baseline) => Self {
                status: ReplyStatus::Success,
                baseline: Some(round1(baseline)),
                message: "Baseline calibrated successfully".to_string(),
            },
            Err(PostureError::NoPoseDetected) => Self {
                status: ReplyStatus::Error,
                baseline: None,
                message: "No pose detected. Please ensure you're visible to the camera."
                    .to_string(),
            },
        }
    }

    pub fn reset() -> Self {
        Self {
            status: ReplyStatus::Success,
            baseline: None,
            message: "Baseline reset".to_string(),
        }
    }
}

/// Reply to `graph`: every rating sample, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphResponse {
    pub data: Vec<RatingSample>,
}

/// Any reply sent on the command channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Status(StatusResponse),
    Rating(RatingSnapshot),
    Graph(GraphResponse),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(r#"{"action":"calibrate"}"#), Ok(Command::Calibrate));
        assert_eq!(Command::parse(r#"{"action":"graph","extra":1}"#), Ok(Command::Graph));
        assert_eq!(
            Command::parse(r#"{"action":"dance"}"#),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert!(matches!(Command::parse("not json"), Err(CommandError::Malformed(_))));
        assert!(matches!(Command::parse(r#"{"act":"reset"}"#), Err(CommandError::Malformed(_))));
    }

    #[test]
    fn test_calibrate_replies() {
        let ok = serde_json::to_value(StatusResponse::calibrated(Ok(51.234))).unwrap();
        assert_eq!(
            ok,
            json!({"status": "success", "baseline": 51.2, "message": "Baseline calibrated successfully"})
        );

        let err = serde_json::to_value(StatusResponse::calibrated(Err(PostureError::NoPoseDetected)))
            .unwrap();
        assert_eq!(err["status"], "error");
        assert!(err.get("baseline").is_none());
    }

    #[test]
    fn test_graph_reply_shape() {
        let reply = Reply::Graph(GraphResponse {
            data: vec![RatingSample::new(1.5, 90), RatingSample::new(2.5, 40)],
        });
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"data":[[1.5,90],[2.5,40]]}"#
        );
    }
}
