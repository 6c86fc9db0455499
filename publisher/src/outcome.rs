//! 게시 결과: UI가 토스트로 그대로 표시하는 구조
//!
//! ```json
//! {
//!   "success": true,
//!   "message": {
//!     "message": "Your changes are in review!",
//!     "description": "...",
//!     "action": { "label": "View PR", "onClick": "OPEN_LINK", "href": "https://..." }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PublishError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: OutcomeMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMessage {
    pub message: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OutcomeAction>,
}

/// 토스트에 붙는 후속 동작 (PR 또는 커밋 기록 링크)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeAction {
    pub label: String,
    #[serde(rename = "onClick")]
    pub on_click: ActionKind,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    OpenLink,
}

impl OutcomeAction {
    pub fn open_link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_click: ActionKind::OpenLink,
            href: href.into(),
        }
    }
}

impl PublishOutcome {
    pub fn success(
        message: impl Into<String>,
        description: impl Into<String>,
        action: Option<OutcomeAction>,
    ) -> Self {
        Self {
            success: true,
            message: OutcomeMessage {
                message: message.into(),
                description: description.into(),
                action,
            },
        }
    }

    pub fn failure(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            success: false,
            message: OutcomeMessage {
                message: message.into(),
                description: description.into(),
                action: None,
            },
        }
    }

    /// PR/커밋 링크 (있으면)
    pub fn link(&self) -> Option<&str> {
        self.message.action.as_ref().map(|a| a.href.as_str())
    }
}

impl From<PublishError> for PublishOutcome {
    fn from(err: PublishError) -> Self {
        match &err {
            PublishError::Forge { step, source } => {
                let description = match source.status() {
                    Some(status) => format!(
                        "Had an HTTP error ({}) while {}. Please try again later.",
                        status,
                        step.failure_action()
                    ),
                    None => format!(
                        "Something went wrong while {} ({}). Please try again later.",
                        step.failure_action(),
                        source
                    ),
                };
                Self::failure(step.failure_title(), description)
            }
            PublishError::Registry(e) => Self::failure("Failed to update language list", e.to_string()),
            PublishError::Encode(e) => Self::failure(
                "Failed to prepare file",
                format!("Could not encode the file content: {}", e),
            ),
        }
    }
}
