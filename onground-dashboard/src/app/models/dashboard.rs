//! Page model drawn by the terminal UI

use chrono::Local;
use onground_sdk::{DashboardData, DataCounts, Tool};

use super::StagePanels;
use crate::app::ChatTranscript;
use crate::cards::CardBoard;
use crate::execution_log::ExecutionLog;
use crate::findings::apply_findings;
use crate::tools::ToolRegistry;
use crate::workflow::{format_seconds, WorkflowEvent, DEFAULT_SESSION_ID};

/// Session, agent count and duration shown in the header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStats {
    pub session_id: String,
    pub agents_completed: u32,
    pub duration: Option<String>,
}

impl Default for HeaderStats {
    fn default() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.to_string(),
            agents_completed: 0,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub cards: CardBoard,
    pub tools: ToolRegistry,
    pub log: ExecutionLog,
    pub stages: StagePanels,
    pub chat: ChatTranscript,
    pub header: HeaderStats,
    /// Counts from the initial data fetch, when it succeeded.
    pub data_counts: Option<DataCounts>,
    /// Index of the first card drawn.
    pub cards_scroll: usize,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.log.append(text, Local::now());
    }

    pub fn load_data(&mut self, data: &DashboardData) {
        self.cards.render(&data.workers, &data.tasks, &data.messages);
        self.cards_scroll = 0;
        self.data_counts = Some(data.counts());
    }

    pub fn load_tools(&mut self, tools: &[Tool]) {
        self.tools.render(tools);
    }

    pub fn apply_workflow_event(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Reset { session_id } => {
                self.log.reset();
                self.stages.reset();
                self.header = HeaderStats {
                    session_id,
                    ..HeaderStats::default()
                };
            }
            WorkflowEvent::Log(entry) => self.log.push(entry),
            WorkflowEvent::StageStatus { stage, status } => self.stages.set_status(stage, status),
            WorkflowEvent::IngestCompleted { counts, duration } => {
                self.stages.ingest_completed(&counts, duration);
            }
            WorkflowEvent::FindingsReported {
                kind,
                count,
                payload,
                duration,
            } => {
                self.stages.findings_reported(kind, count, duration);
                apply_findings(&mut self.cards, payload.as_deref(), kind);
            }
            WorkflowEvent::ReportCompleted { duration } => self.stages.report_completed(duration),
            WorkflowEvent::HeaderStats {
                agents_completed,
                elapsed,
            } => {
                self.header.agents_completed = agents_completed;
                self.header.duration = Some(format_seconds(elapsed));
            }
            WorkflowEvent::AgentMessage(text) => {
                self.chat.push_agent(&text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardStatus;
    use crate::findings::FindingKind;
    use crate::workflow::{Stage, StageStatus};
    use onground_sdk::Worker;
    use std::time::Duration;

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new();
        dashboard.load_data(&DashboardData {
            success: true,
            workers: vec![
                Worker {
                    worker_id: "W101".to_string(),
                    name: "Rajesh".to_string(),
                },
                Worker {
                    worker_id: "W194".to_string(),
                    name: "Amit".to_string(),
                },
            ],
            ..Default::default()
        });
        dashboard
    }

    #[test]
    fn test_delay_findings_update_cards_and_panel() {
        let mut dashboard = loaded();
        dashboard.apply_workflow_event(WorkflowEvent::FindingsReported {
            kind: FindingKind::Delay,
            count: 1,
            payload: Some(r#"[{"worker_id": "W194"}]"#.to_string()),
            duration: Duration::from_millis(1200),
        });

        assert_eq!(dashboard.cards.get("W194").unwrap().status, CardStatus::Delayed);
        assert_eq!(dashboard.cards.get("W101").unwrap().status, CardStatus::OnTime);
        assert_eq!(
            dashboard.stages.get(Stage::Delay).findings.as_deref(),
            Some("Found: 1 delay")
        );
    }

    #[test]
    fn test_reset_clears_log_panels_and_counters() {
        let mut dashboard = loaded();
        dashboard.log("Dashboard loaded successfully");
        dashboard.apply_workflow_event(WorkflowEvent::StageStatus {
            stage: Stage::Report,
            status: StageStatus::Complete,
        });
        dashboard.apply_workflow_event(WorkflowEvent::HeaderStats {
            agents_completed: 3,
            elapsed: Duration::from_millis(5300),
        });
        assert_eq!(dashboard.header.duration.as_deref(), Some("5.3s"));

        dashboard.apply_workflow_event(WorkflowEvent::Reset {
            session_id: "abc".to_string(),
        });

        assert!(dashboard.log.is_empty());
        assert_eq!(dashboard.stages.get(Stage::Report).status, StageStatus::Pending);
        assert_eq!(dashboard.header.agents_completed, 0);
        assert_eq!(dashboard.header.session_id, "abc");
        // Cards are not part of a run reset.
        assert_eq!(dashboard.cards.len(), 2);
    }

    #[test]
    fn test_load_data_records_counts() {
        let dashboard = loaded();
        assert_eq!(dashboard.data_counts.map(|c| c.workers), Some(2));
    }
}
