//! Stage panels of the workflow view

use crate::findings::FindingKind;
use crate::workflow::{format_seconds, Stage, StageStatus};
use onground_sdk::DataCounts;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct StagePanel {
    pub stage: Stage,
    pub status: StageStatus,
    /// Status line once the stage reported its own completion.
    pub completion: Option<String>,
    pub tools: Option<String>,
    pub output: Option<String>,
    pub duration: Option<String>,
    pub findings: Option<String>,
    pub items: Vec<String>,
}

impl StagePanel {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Pending,
            completion: None,
            tools: None,
            output: None,
            duration: None,
            findings: None,
            items: Vec::new(),
        }
    }

    pub fn status_line(&self) -> String {
        match self.status {
            StageStatus::Pending => "Waiting".to_string(),
            StageStatus::Running => "Running...".to_string(),
            StageStatus::Complete => self
                .completion
                .clone()
                .unwrap_or_else(|| "✓ Complete".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagePanels {
    panels: Vec<StagePanel>,
}

impl Default for StagePanels {
    fn default() -> Self {
        Self {
            panels: Stage::ALL.iter().copied().map(StagePanel::new).collect(),
        }
    }
}

impl StagePanels {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagePanel> {
        self.panels.iter()
    }

    pub fn get(&self, stage: Stage) -> &StagePanel {
        let idx = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0);
        &self.panels[idx]
    }

    fn get_mut(&mut self, stage: Stage) -> &mut StagePanel {
        let idx = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0);
        &mut self.panels[idx]
    }

    pub fn set_status(&mut self, stage: Stage, status: StageStatus) {
        self.get_mut(stage).status = status;
    }

    pub fn ingest_completed(&mut self, counts: &DataCounts, duration: Duration) {
        let panel = self.get_mut(Stage::DataIngest);
        panel.completion = Some(format!("✓ Complete ({})", format_seconds(duration)));
        panel.tools = Some("3".to_string());
        panel.items = vec![
            format!("• load_messages → {} items", counts.messages),
            format!("• load_calendar → {} items", counts.calendar),
            format!("• load_tasks → {} items", counts.tasks),
        ];
    }

    pub fn findings_reported(&mut self, kind: FindingKind, count: usize, duration: Duration) {
        let panel = self.get_mut(Stage::from(kind));
        panel.findings = Some(kind.count_label(count));
        panel.output = Some(kind.output_label().to_string());
        panel.duration = Some(format!("({})", format_seconds(duration)));
    }

    pub fn report_completed(&mut self, duration: Duration) {
        let panel = self.get_mut(Stage::Report);
        panel.completion = Some(format!("✓ Complete ({})", format_seconds(duration)));
        panel.tools = Some("synthesize findings".to_string());
        panel.output = Some("final_report".to_string());
    }
}
