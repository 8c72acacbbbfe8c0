//! Analysis findings and their effect on worker cards
//!
//! A findings payload is either a JSON array of objects carrying `worker_id`,
//! or free text that the analysis agent produced instead. Free text is handled
//! heuristically and never reported as an error.
//!
//! Only delay findings change cards. Safety findings feed the stage panel
//! counters and leave the cards alone.

use onground_sdk::value_to_text;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::cards::CardBoard;

fn worker_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"W[0-9]+").expect("worker token pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Delay,
    Safety,
}

impl FindingKind {
    pub fn agent_name(&self) -> &'static str {
        match self {
            FindingKind::Delay => "DelayAgent",
            FindingKind::Safety => "SafetyAgent",
        }
    }

    /// Count shown when free text mentions no `worker_id` at all.
    pub fn heuristic_minimum(&self) -> usize {
        match self {
            FindingKind::Delay => 1,
            FindingKind::Safety => 2,
        }
    }

    pub fn output_label(&self) -> &'static str {
        match self {
            FindingKind::Delay => "delay_findings",
            FindingKind::Safety => "safety_findings",
        }
    }

    /// Stage panel text, e.g. `Found: 2 delay`.
    pub fn count_label(&self, count: usize) -> String {
        match self {
            FindingKind::Delay => format!("Found: {} delay", count),
            FindingKind::Safety => format!("Found: {} safety alerts", count),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub worker_id: Option<String>,
    pub raw: Value,
}

impl Finding {
    fn from_value(raw: Value) -> Self {
        let worker_id = raw
            .get("worker_id")
            .filter(|v| v.is_string() || v.is_number())
            .map(value_to_text);
        Self { worker_id, raw }
    }
}

/// Parsed findings payload
#[derive(Debug, Clone, PartialEq)]
pub enum Findings {
    Structured(Vec<Finding>),
    Heuristic { text: String },
}

impl Findings {
    pub fn count(&self, kind: FindingKind) -> usize {
        match self {
            Findings::Structured(items) => items.len(),
            Findings::Heuristic { text } => match text.matches("worker_id").count() {
                0 => kind.heuristic_minimum(),
                n => n,
            },
        }
    }

    /// Worker ids this payload points at, in payload order.
    pub fn worker_ids(&self) -> Vec<String> {
        match self {
            Findings::Structured(items) => {
                items.iter().filter_map(|f| f.worker_id.clone()).collect()
            }
            Findings::Heuristic { text } => worker_token_re()
                .find(text)
                .map(|m| vec![m.as_str().to_string()])
                .unwrap_or_default(),
        }
    }
}

pub fn parse_findings(payload: &str) -> Findings {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(items)) => {
            Findings::Structured(items.into_iter().map(Finding::from_value).collect())
        }
        Ok(_) | Err(_) => {
            tracing::debug!("findings are not a JSON array, falling back to text extraction");
            Findings::Heuristic {
                text: payload.to_string(),
            }
        }
    }
}

/// Apply a findings payload to the board; returns the ids of cards that changed.
pub fn apply_findings(
    board: &mut CardBoard,
    payload: Option<&str>,
    kind: FindingKind,
) -> Vec<String> {
    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        return Vec::new();
    };

    if kind != FindingKind::Delay {
        return Vec::new();
    }

    let mut updated = Vec::new();
    for worker_id in parse_findings(payload).worker_ids() {
        if let Some(card) = board.get_mut(&worker_id) {
            tracing::info!(worker_id = %worker_id, "flagging worker as delayed");
            card.mark_delayed(kind.agent_name());
            if !updated.contains(&worker_id) {
                updated.push(worker_id);
            }
        }
    }
    updated
}
