//! Worker status cards
//!
//! Cards are built from the raw `/api/data` lists by a pure join. The board
//! keeps them keyed by worker id so findings can update a card in place.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use onground_sdk::{Message, Task, Worker};
use std::collections::HashMap;

pub const DELAYED_STATUS_TEXT: &str = "Delayed by 20min";

/// Status shown on a card; only ever moves from `OnTime` to `Delayed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    OnTime,
    Delayed,
}

/// Colour of the status dot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDot {
    Green,
    Red,
}

impl CardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::OnTime => "On time",
            CardStatus::Delayed => DELAYED_STATUS_TEXT,
        }
    }

    pub fn dot(&self) -> StatusDot {
        match self {
            CardStatus::OnTime => StatusDot::Green,
            CardStatus::Delayed => StatusDot::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerCard {
    pub worker_id: String,
    pub name: String,
    pub task: Option<Task>,
    pub last_message: Option<Message>,
    pub status: CardStatus,
    /// Latest automated action, `None` until an agent touches the card.
    pub action: Option<String>,
}

impl WorkerCard {
    pub fn new(worker: &Worker, task: Option<&Task>, last_message: Option<&Message>) -> Self {
        Self {
            worker_id: worker.worker_id.clone(),
            name: worker.name.clone(),
            task: task.cloned(),
            last_message: last_message.cloned(),
            status: CardStatus::OnTime,
            action: None,
        }
    }

    pub fn header_line(&self) -> String {
        format!("#{} {}", self.worker_id, self.name)
    }

    pub fn task_line(&self) -> String {
        match &self.task {
            Some(task) => format!("#{} {}", task.task_id, task.address),
            None => "#N/A No task assigned".to_string(),
        }
    }

    pub fn message_line(&self) -> Option<String> {
        self.last_message
            .as_ref()
            .map(|m| format!("Last Message: \"{}\"", m.text))
    }

    pub fn action_line(&self) -> String {
        format!("Agent Action: {}", self.action.as_deref().unwrap_or("-"))
    }

    /// Downgrade to delayed. Setting it again leaves the card unchanged.
    pub fn mark_delayed(&mut self, flagged_by: &str) {
        self.status = CardStatus::Delayed;
        self.action = Some(format!("Flagged by {}", flagged_by));
    }
}

/// Parse a message time into something orderable.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]` and bare
/// `HH:MM[:SS]` (placed on a fixed day). Anything else yields `None`, which
/// orders before every parsed time.
pub fn parse_message_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(raw, fmt) {
            return NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(time));
        }
    }

    None
}

/// Join workers with their task and most recent message, in worker order.
pub fn join_cards(workers: &[Worker], tasks: &[Task], messages: &[Message]) -> Vec<WorkerCard> {
    // Later tasks overwrite earlier ones for the same worker.
    let task_map: HashMap<&str, &Task> = tasks
        .iter()
        .map(|task| (task.worker_id.as_str(), task))
        .collect();

    let mut last_messages: HashMap<&str, (Option<NaiveDateTime>, &Message)> = HashMap::new();
    for msg in messages {
        let time = parse_message_time(&msg.time);
        match last_messages.get(msg.worker_id.as_str()) {
            Some((current, _)) if time < *current => {}
            _ => {
                last_messages.insert(msg.worker_id.as_str(), (time, msg));
            }
        }
    }

    workers
        .iter()
        .map(|worker| {
            let id = worker.worker_id.as_str();
            WorkerCard::new(
                worker,
                task_map.get(id).copied(),
                last_messages.get(id).map(|(_, msg)| *msg),
            )
        })
        .collect()
}

/// All rendered cards, in worker order.
#[derive(Debug, Clone, Default)]
pub struct CardBoard {
    cards: Vec<WorkerCard>,
}

impl CardBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every card with a fresh render.
    pub fn render(&mut self, workers: &[Worker], tasks: &[Task], messages: &[Message]) {
        self.cards = join_cards(workers, tasks, messages);
        tracing::info!(count = self.cards.len(), "rendered worker cards");
    }

    pub fn cards(&self) -> &[WorkerCard] {
        &self.cards
    }

    pub fn get(&self, worker_id: &str) -> Option<&WorkerCard> {
        self.cards.iter().find(|c| c.worker_id == worker_id)
    }

    pub fn get_mut(&mut self, worker_id: &str) -> Option<&mut WorkerCard> {
        self.cards.iter_mut().find(|c| c.worker_id == worker_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: &str, name: &str) -> Worker {
        Worker {
            worker_id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn task(task_id: &str, worker_id: &str, address: &str) -> Task {
        Task {
            task_id: task_id.to_string(),
            worker_id: worker_id.to_string(),
            address: address.to_string(),
        }
    }

    fn message(worker_id: &str, text: &str, time: &str) -> Message {
        Message {
            worker_id: worker_id.to_string(),
            text: text.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_one_card_per_worker_in_input_order() {
        let workers = vec![worker("W194", "Amit"), worker("W101", "Rajesh"), worker("W7", "Sara")];
        let cards = join_cards(&workers, &[], &[]);

        let ids: Vec<_> = cards.iter().map(|c| c.worker_id.as_str()).collect();
        assert_eq!(ids, vec!["W194", "W101", "W7"]);
        assert!(cards.iter().all(|c| c.status == CardStatus::OnTime));
        assert!(cards.iter().all(|c| c.status.dot() == StatusDot::Green));
    }

    #[test]
    fn test_last_task_wins() {
        let workers = vec![worker("W101", "Rajesh")];
        let tasks = vec![
            task("T1", "W101", "Sector 12"),
            task("T2", "W101", "Sector 14"),
        ];
        let cards = join_cards(&workers, &tasks, &[]);
        assert_eq!(cards[0].task_line(), "#T2 Sector 14");
    }

    #[test]
    fn test_missing_task_line() {
        let cards = join_cards(&[worker("W101", "Rajesh")], &[], &[]);
        assert_eq!(cards[0].task_line(), "#N/A No task assigned");
        assert!(cards[0].message_line().is_none());
        assert_eq!(cards[0].action_line(), "Agent Action: -");
    }

    #[test]
    fn test_latest_message_by_time() {
        let workers = vec![worker("W101", "Rajesh")];
        let messages = vec![
            message("W101", "on my way", "2025-11-20T09:05:00"),
            message("W101", "road closed", "2025-11-20T09:19:00"),
            message("W101", "earlier", "2025-11-20T08:55:00"),
        ];
        let cards = join_cards(&workers, &[], &messages);
        assert_eq!(
            cards[0].message_line().as_deref(),
            Some("Last Message: \"road closed\"")
        );
    }

    #[test]
    fn test_equal_times_prefer_later_message() {
        let workers = vec![worker("W101", "Rajesh")];
        let messages = vec![
            message("W101", "first", "09:19"),
            message("W101", "second", "09:19"),
        ];
        let cards = join_cards(&workers, &[], &messages);
        assert_eq!(cards[0].last_message.as_ref().unwrap().text, "second");
    }

    #[test]
    fn test_parse_message_time_formats() {
        assert!(parse_message_time("2025-11-20T09:19:00Z").is_some());
        assert!(parse_message_time("2025-11-20 09:19").is_some());
        assert!(parse_message_time("09:19:30").is_some());
        assert!(parse_message_time("yesterday").is_none());
        assert!(parse_message_time("09:19") > parse_message_time("yesterday"));
    }

    #[test]
    fn test_render_replaces_previous_cards() {
        let mut board = CardBoard::new();
        board.render(&[worker("W1", "A"), worker("W2", "B")], &[], &[]);
        board.get_mut("W1").unwrap().mark_delayed("DelayAgent");

        board.render(&[worker("W3", "C")], &[], &[]);
        assert_eq!(board.len(), 1);
        assert!(board.get("W1").is_none());
        assert_eq!(board.get("W3").unwrap().status, CardStatus::OnTime);
    }

    #[test]
    fn test_mark_delayed_is_idempotent() {
        let mut board = CardBoard::new();
        board.render(&[worker("W101", "Rajesh")], &[], &[]);

        board.get_mut("W101").unwrap().mark_delayed("DelayAgent");
        let once = board.get("W101").unwrap().clone();
        board.get_mut("W101").unwrap().mark_delayed("DelayAgent");

        assert_eq!(board.get("W101").unwrap(), &once);
        assert_eq!(once.status.label(), "Delayed by 20min");
        assert_eq!(once.status.dot(), StatusDot::Red);
        assert_eq!(once.action_line(), "Agent Action: Flagged by DelayAgent");
    }
}
