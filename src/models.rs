use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message sender identity as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// Addressable conversation endpoint. The subscriber set is keyed by `id`;
/// usernames may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// One inbound chat message, consumed exactly once by the message loop.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: i64,
    pub sender: User,
    pub chat: Chat,
    pub text: String,
}

/// Alertmanager-style webhook payload. The dispatcher only renders it and
/// broadcasts the result; unknown fields are ignored on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Notification {
    /// Fixed plain-text rendering: one block per alert, firing/resolved
    /// marker plus alertname, followed by the summary annotation if present.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for alert in &self.alerts {
            let marker = if alert.status == "resolved" {
                "\u{2705} RESOLVED"
            } else {
                "\u{1f525} FIRING"
            };
            let name = alert
                .labels
                .get("alertname")
                .map_or("unknown alert", String::as_str);
            out.push_str(marker);
            out.push_str(": ");
            out.push_str(name);
            out.push('\n');
            if let Some(summary) = alert.annotations.get("summary") {
                out.push_str(summary);
                out.push('\n');
            }
        }
        out
    }
}
