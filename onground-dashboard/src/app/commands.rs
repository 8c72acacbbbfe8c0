//! Command pattern for App communication
//!
//! Background tasks never touch the page model. They report back with an
//! [`AppCommand`] which the UI loop applies on its own thread.

use onground_sdk::{AgentResponse, DashboardData, ToolsResponse};
use uuid::Uuid;

use crate::workflow::{RunSummary, WorkflowEvent};

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// `/api/data` answered.
    DataLoaded(DashboardData),

    /// `/api/tools` answered.
    ToolsLoaded(ToolsResponse),

    /// The initial load task is done; `error` is set when a request failed.
    LoadFinished { error: Option<String> },

    /// `/run_agent` answered for the request behind `thinking_id`.
    AgentReplied {
        thinking_id: Uuid,
        response: AgentResponse,
    },

    /// `/run_agent` could not be reached or decoded.
    AgentFailed { thinking_id: Uuid, error: String },

    Workflow(WorkflowEvent),

    RunFinished(RunSummary),
}
