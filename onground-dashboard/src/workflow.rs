//! Simulated agent pipeline
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! IDLE -> INGEST -> PARALLEL_ANALYSIS (delay + safety) -> REPORT -> COMPLETE -> IDLE
//! ```
//!
//! The sequencer owns the [`RunState`] for the length of one run and reports
//! every visible change as a [`WorkflowEvent`]. It never touches the page
//! model directly; whoever receives the events applies them. Waits between
//! steps are artificial and come from [`StageTiming`].

use chrono::Local;
use onground_sdk::{AgentResponse, DataCounts, TextPayload};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::execution_log::ExecutionLogEntry;
use crate::findings::{parse_findings, FindingKind};

/// Session id used until the backend hands out its own.
pub const DEFAULT_SESSION_ID: &str = "workflow-session";

/// Item counts used when the initial data fetch produced nothing.
pub fn fallback_counts() -> DataCounts {
    DataCounts {
        workers: 0,
        tasks: 2,
        messages: 3,
        calendar: 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    DataIngest,
    Delay,
    Safety,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::DataIngest, Stage::Delay, Stage::Safety, Stage::Report];

    pub fn agent_name(&self) -> &'static str {
        match self {
            Stage::DataIngest => "DataIngestAgent",
            Stage::Delay => "DelayAgent",
            Stage::Safety => "SafetyAgent",
            Stage::Report => "ReportAgent",
        }
    }
}

impl From<FindingKind> for Stage {
    fn from(kind: FindingKind) -> Self {
        match kind {
            FindingKind::Delay => Stage::Delay,
            FindingKind::Safety => Stage::Safety,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Complete,
}

/// Artificial waits of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    /// Wait before each of the three ingest steps.
    pub ingest_step: Duration,
    pub delay_analysis: Duration,
    pub safety_analysis: Duration,
    pub report: Duration,
}

impl StageTiming {
    pub fn zero() -> Self {
        Self {
            ingest_step: Duration::ZERO,
            delay_analysis: Duration::ZERO,
            safety_analysis: Duration::ZERO,
            report: Duration::ZERO,
        }
    }

    pub fn analysis(&self, kind: FindingKind) -> Duration {
        match kind {
            FindingKind::Delay => self.delay_analysis,
            FindingKind::Safety => self.safety_analysis,
        }
    }

    pub fn ingest_total(&self) -> Duration {
        self.ingest_step * 3
    }
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            ingest_step: Duration::from_millis(400),
            delay_analysis: Duration::from_millis(1200),
            safety_analysis: Duration::from_millis(1500),
            report: Duration::from_millis(2100),
        }
    }
}

/// `1.2s`
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// Everything a run changes on the page
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// A new run begins: clear the log, stage panels and header counters.
    Reset { session_id: String },
    Log(ExecutionLogEntry),
    StageStatus { stage: Stage, status: StageStatus },
    IngestCompleted { counts: DataCounts, duration: Duration },
    FindingsReported {
        kind: FindingKind,
        count: usize,
        payload: Option<String>,
        duration: Duration,
    },
    ReportCompleted { duration: Duration },
    HeaderStats { agents_completed: u32, elapsed: Duration },
    AgentMessage(String),
}

/// State of the run in progress
#[derive(Debug, Clone)]
pub struct RunState {
    pub session_id: String,
    pub started_at: Instant,
    pub agents_completed: u32,
    pub backend_agents_completed: Option<u32>,
}

impl RunState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Instant::now(),
            agents_completed: 0,
            backend_agents_completed: None,
        }
    }

    pub fn complete_agent(&mut self) {
        self.agents_completed += 1;
    }

    /// The backend count wins when it is higher; the counter never goes down.
    pub fn adopt_backend_count(&mut self, count: u32) {
        self.backend_agents_completed = Some(count);
        self.agents_completed = self.agents_completed.max(count);
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Final state of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub state: RunState,
    pub elapsed: Duration,
}

type EventSink = Arc<dyn Fn(WorkflowEvent) + Send + Sync>;

pub struct WorkflowSequencer {
    timing: StageTiming,
    emit: EventSink,
}

impl fmt::Debug for WorkflowSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowSequencer")
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

impl WorkflowSequencer {
    pub fn new<F>(timing: StageTiming, emit: F) -> Self
    where
        F: Fn(WorkflowEvent) + Send + Sync + 'static,
    {
        Self {
            timing,
            emit: Arc::new(emit),
        }
    }

    fn send(&self, event: WorkflowEvent) {
        (self.emit)(event);
    }

    fn log(&self, text: impl Into<String>) {
        self.send(WorkflowEvent::Log(ExecutionLogEntry::new(text, Local::now())));
    }

    fn set_stage(&self, stage: Stage, status: StageStatus) {
        self.send(WorkflowEvent::StageStatus { stage, status });
    }

    fn header_stats(&self, state: &RunState) {
        self.send(WorkflowEvent::HeaderStats {
            agents_completed: state.agents_completed,
            elapsed: state.elapsed(),
        });
    }

    /// Run the whole pipeline for one triggering chat response.
    pub async fn run(
        &self,
        session_id: impl Into<String>,
        response: &AgentResponse,
        counts: Option<DataCounts>,
    ) -> RunSummary {
        let mut state = RunState::new(session_id);
        tracing::info!(session_id = %state.session_id, "workflow run started");

        self.send(WorkflowEvent::Reset {
            session_id: state.session_id.clone(),
        });
        self.log("WORKFLOW STARTED");

        self.ingest(&mut state, counts.unwrap_or_else(fallback_counts)).await;

        self.log("🔀 Starting DelayAgent & SafetyAgent in parallel...");
        futures::join!(
            self.analyze(FindingKind::Delay, response.delay_findings.as_ref()),
            self.analyze(FindingKind::Safety, response.safety_findings.as_ref()),
        );
        self.log("Parallel execution complete");
        state.complete_agent();
        self.header_stats(&state);

        self.report(&mut state, response).await;

        if let Some(count) = response.agents_completed {
            state.adopt_backend_count(count);
        }
        let elapsed = state.elapsed();
        self.send(WorkflowEvent::HeaderStats {
            agents_completed: state.agents_completed,
            elapsed,
        });
        self.log(format!("WORKFLOW COMPLETE - Total time: {}", format_seconds(elapsed)));

        tracing::info!(
            session_id = %state.session_id,
            agents_completed = state.agents_completed,
            elapsed_ms = elapsed.as_millis() as u64,
            "workflow run complete"
        );
        RunSummary { state, elapsed }
    }

    async fn ingest(&self, state: &mut RunState, counts: DataCounts) {
        self.set_stage(Stage::DataIngest, StageStatus::Running);
        self.log("DataIngestAgent → Started");

        let steps = [
            ("load_messages", counts.messages),
            ("load_calendar", counts.calendar),
            ("load_tasks", counts.tasks),
        ];
        for (tool, items) in steps {
            pause(self.timing.ingest_step).await;
            self.log(format!("{}() → Success ({} items)", tool, items));
        }

        self.send(WorkflowEvent::IngestCompleted {
            counts,
            duration: self.timing.ingest_total(),
        });
        self.set_stage(Stage::DataIngest, StageStatus::Complete);

        state.complete_agent();
        self.header_stats(state);
    }

    async fn analyze(&self, kind: FindingKind, payload: Option<&TextPayload>) {
        let stage = Stage::from(kind);
        self.set_stage(stage, StageStatus::Running);
        match kind {
            FindingKind::Delay => self.log("⏰ DelayAgent → Analyzing delays..."),
            FindingKind::Safety => self.log("🛡️ SafetyAgent → Checking safety issues..."),
        }

        let duration = self.timing.analysis(kind);
        pause(duration).await;

        let payload = payload.map(|p| p.as_str()).filter(|p| !p.is_empty());
        let count = match payload {
            Some(text) => parse_findings(text).count(kind),
            None => kind.heuristic_minimum(),
        };
        tracing::debug!(?kind, count, structured = payload.is_some(), "analysis finished");

        self.send(WorkflowEvent::FindingsReported {
            kind,
            count,
            payload: payload.map(str::to_string),
            duration,
        });

        let summary = match (kind, payload.is_some()) {
            (FindingKind::Delay, true) => format!("⏰ DelayAgent → Found {} delay(s)", count),
            (FindingKind::Delay, false) => "⏰ DelayAgent → Found 1 delay".to_string(),
            (FindingKind::Safety, true) => {
                format!("🛡️ SafetyAgent → Found {} safety alert(s)", count)
            }
            (FindingKind::Safety, false) => {
                "🛡️ SafetyAgent → Found 2 safety alerts".to_string()
            }
        };
        self.log(summary);
        self.set_stage(stage, StageStatus::Complete);
    }

    async fn report(&self, state: &mut RunState, response: &AgentResponse) {
        self.set_stage(Stage::Report, StageStatus::Running);
        self.log("📋 ReportAgent → Generating final report...");

        pause(self.timing.report).await;

        self.send(WorkflowEvent::ReportCompleted {
            duration: self.timing.report,
        });
        self.set_stage(Stage::Report, StageStatus::Complete);
        state.complete_agent();
        self.header_stats(state);

        self.log("📋 ReportAgent → Report generated");

        let report = response
            .final_report
            .as_ref()
            .map(|r| r.as_str().to_string())
            .filter(|r| !r.is_empty())
            .or_else(|| response.response.clone().filter(|r| !r.is_empty()));
        if let Some(text) = report {
            self.send(WorkflowEvent::AgentMessage(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(timing: StageTiming) -> (WorkflowSequencer, Arc<Mutex<Vec<WorkflowEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let sequencer = WorkflowSequencer::new(timing, move |event| {
            sink.lock().unwrap().push(event);
        });
        (sequencer, events)
    }

    fn log_texts(events: &[WorkflowEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::Log(entry) => Some(entry.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn reported(events: &[WorkflowEvent], wanted: FindingKind) -> usize {
        events
            .iter()
            .find_map(|e| match e {
                WorkflowEvent::FindingsReported { kind, count, .. } if *kind == wanted => {
                    Some(*count)
                }
                _ => None,
            })
            .expect("findings reported")
    }

    fn triggered(delay: Option<&str>, safety: Option<&str>) -> AgentResponse {
        AgentResponse {
            success: true,
            workflow_triggered: true,
            delay_findings: delay.map(TextPayload::from),
            safety_findings: safety.map(TextPayload::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_counts_findings_and_agents() {
        let (sequencer, events) = recorder(StageTiming::zero());
        let response = triggered(
            Some(r#"[{"worker_id": "W101"}, {"worker_id": "W194"}]"#),
            Some(r#"[{"worker_id": "W101"}, {"worker_id": "W194"}, {"worker_id": "W7"}]"#),
        );

        let summary = sequencer.run("workflow-session", &response, None).await;

        assert_eq!(summary.state.agents_completed, 3);
        let events = events.lock().unwrap();
        assert_eq!(reported(&events, FindingKind::Delay), 2);
        assert_eq!(reported(&events, FindingKind::Safety), 3);
        assert!(matches!(events[0], WorkflowEvent::Reset { .. }));
    }

    #[tokio::test]
    async fn test_backend_count_overrides_local() {
        let (sequencer, events) = recorder(StageTiming::zero());
        let mut response = triggered(None, None);
        response.agents_completed = Some(5);

        let summary = sequencer.run("s", &response, None).await;
        assert_eq!(summary.state.agents_completed, 5);
        assert_eq!(summary.state.backend_agents_completed, Some(5));

        let last_stats = events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|e| match e {
                WorkflowEvent::HeaderStats { agents_completed, .. } => Some(*agents_completed),
                _ => None,
            });
        assert_eq!(last_stats, Some(5));
    }

    #[tokio::test]
    async fn test_lower_backend_count_does_not_decrease() {
        let (sequencer, _) = recorder(StageTiming::zero());
        let mut response = triggered(None, None);
        response.agents_completed = Some(1);
        let summary = sequencer.run("s", &response, None).await;
        assert_eq!(summary.state.agents_completed, 3);
    }

    #[tokio::test]
    async fn test_malformed_findings_fall_back_to_text_count() {
        let (sequencer, events) = recorder(StageTiming::zero());
        let response = triggered(Some("worker_id worker_id worker_id"), Some("no ids here"));
        sequencer.run("s", &response, None).await;

        let events = events.lock().unwrap();
        assert_eq!(reported(&events, FindingKind::Delay), 3);
        assert_eq!(reported(&events, FindingKind::Safety), 2);
        assert!(log_texts(&events).contains(&"⏰ DelayAgent → Found 3 delay(s)".to_string()));
    }

    #[tokio::test]
    async fn test_missing_findings_use_fixed_counts() {
        let (sequencer, events) = recorder(StageTiming::zero());
        sequencer.run("s", &triggered(None, Some("")), None).await;

        let events = events.lock().unwrap();
        let logs = log_texts(&events);
        assert!(logs.contains(&"⏰ DelayAgent → Found 1 delay".to_string()));
        assert!(logs.contains(&"🛡️ SafetyAgent → Found 2 safety alerts".to_string()));
    }

    #[tokio::test]
    async fn test_ingest_steps_are_sequential_with_counts() {
        let (sequencer, events) = recorder(StageTiming::zero());
        let counts = DataCounts {
            workers: 2,
            tasks: 4,
            messages: 7,
            calendar: 1,
        };
        sequencer.run("s", &triggered(None, None), Some(counts)).await;

        let logs = log_texts(&events.lock().unwrap());
        assert_eq!(
            &logs[..5],
            &[
                "WORKFLOW STARTED",
                "DataIngestAgent → Started",
                "load_messages() → Success (7 items)",
                "load_calendar() → Success (1 items)",
                "load_tasks() → Success (4 items)",
            ]
        );
        assert!(logs.last().unwrap().starts_with("WORKFLOW COMPLETE - Total time: "));
    }

    #[tokio::test]
    async fn test_fallback_counts_when_data_missing() {
        let (sequencer, events) = recorder(StageTiming::zero());
        sequencer.run("s", &triggered(None, None), None).await;
        let logs = log_texts(&events.lock().unwrap());
        assert!(logs.contains(&"load_messages() → Success (3 items)".to_string()));
        assert!(logs.contains(&"load_calendar() → Success (2 items)".to_string()));
        assert!(logs.contains(&"load_tasks() → Success (2 items)".to_string()));
    }

    #[tokio::test]
    async fn test_parallel_branches_join_before_report() {
        let timing = StageTiming {
            ingest_step: Duration::ZERO,
            delay_analysis: Duration::from_millis(40),
            safety_analysis: Duration::from_millis(5),
            report: Duration::ZERO,
        };
        let (sequencer, events) = recorder(timing);
        sequencer.run("s", &triggered(Some("[]"), Some("[]")), None).await;

        let logs = log_texts(&events.lock().unwrap());
        let pos = |text: &str| logs.iter().position(|l| l.starts_with(text)).unwrap();

        assert!(pos("🛡️ SafetyAgent → Found") < pos("⏰ DelayAgent → Found"));
        assert!(pos("⏰ DelayAgent → Found") < pos("Parallel execution complete"));
        assert!(pos("Parallel execution complete") < pos("📋 ReportAgent → Generating"));
    }

    #[tokio::test]
    async fn test_final_report_preferred_over_response() {
        let (sequencer, events) = recorder(StageTiming::zero());
        let mut response = triggered(None, None);
        response.response = Some("fallback text".to_string());
        response.final_report = Some(TextPayload::from("FINAL REPORT"));
        sequencer.run("s", &response, None).await;

        let messages: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::AgentMessage(text) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["FINAL REPORT".to_string()]);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_millis(1200)), "1.2s");
        assert_eq!(format_seconds(StageTiming::default().ingest_total()), "1.2s");
    }
}
