//! Command handler implementations for App

use anyhow::{bail, Result};
use onground_sdk::AgentResponse;
use uuid::Uuid;

use super::chat::{
    CONNECTION_ERROR_TEXT, NO_RESPONSE_TEXT, RUN_IN_PROGRESS_TEXT, UNKNOWN_ERROR_TEXT,
    WORKFLOW_STARTING_TEXT,
};
use super::{App, AppCommand};

impl App {
    /// Process a single command
    pub fn handle_command(&mut self, cmd: AppCommand) -> Result<()> {
        match cmd {
            AppCommand::DataLoaded(data) => {
                if data.success {
                    self.dashboard.load_data(&data);
                } else {
                    tracing::error!(error = ?data.error, "data fetch failed");
                }
            }

            AppCommand::ToolsLoaded(tools) => {
                if tools.success {
                    self.dashboard.load_tools(&tools.tools);
                } else {
                    tracing::error!(error = ?tools.error, "tools fetch failed");
                }
            }

            AppCommand::LoadFinished { error } => {
                self.finish_task();
                match error {
                    None => self.dashboard.log("Dashboard loaded successfully"),
                    Some(error) => {
                        tracing::error!(%error, "error initializing dashboard");
                        self.dashboard.log(format!("Error loading dashboard: {}", error));
                    }
                }
            }

            AppCommand::AgentReplied {
                thinking_id,
                response,
            } => {
                self.finish_task();
                self.dashboard.chat.remove(thinking_id);
                self.handle_agent_response(response);
            }

            AppCommand::AgentFailed { thinking_id, error } => {
                self.finish_task();
                self.dashboard.chat.remove(thinking_id);
                tracing::error!(%error, "error sending message");
                self.dashboard.chat.push_agent(CONNECTION_ERROR_TEXT);
                self.dashboard.log(format!("Error sending message: {}", error));
            }

            AppCommand::Workflow(event) => {
                self.dashboard.apply_workflow_event(event);
            }

            AppCommand::RunFinished(summary) => {
                self.finish_task();
                if !self.run_active {
                    bail!("run {} finished but no run was active", summary.state.session_id);
                }
                self.run_active = false;
                self.last_run = Some(summary);
            }
        }

        Ok(())
    }

    fn handle_agent_response(&mut self, response: AgentResponse) {
        if !response.success {
            let error = response.error.as_deref().unwrap_or(UNKNOWN_ERROR_TEXT);
            tracing::warn!(%error, "agent endpoint reported failure");
            self.dashboard.chat.push_agent(&format!("Error: {}", error));
            return;
        }

        if !response.workflow_triggered {
            let text = response
                .response
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(NO_RESPONSE_TEXT);
            self.dashboard.chat.push_agent(text);
            return;
        }

        if self.run_active {
            tracing::warn!("workflow trigger ignored, a run is already in progress");
            self.dashboard.chat.push_agent(RUN_IN_PROGRESS_TEXT);
            self.dashboard
                .log("Workflow trigger ignored: a run is already in progress");
            return;
        }

        if let Some(session_id) = response.session_id.as_deref().filter(|s| !s.is_empty()) {
            self.dashboard.header.session_id = session_id.to_string();
        }
        self.dashboard.chat.push_agent(WORKFLOW_STARTING_TEXT);
        self.start_run(response);
    }

    pub(super) fn spawn_agent_request(&mut self, message: String, thinking_id: Uuid) {
        let backend = self.backend.clone();
        let tx = self.command_tx.clone();
        self.begin_task();
        self.tokio_runtime.spawn(async move {
            let cmd = match backend.run_agent(&message).await {
                Ok(response) => AppCommand::AgentReplied {
                    thinking_id,
                    response,
                },
                Err(e) => AppCommand::AgentFailed {
                    thinking_id,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(cmd);
        });
    }
}
