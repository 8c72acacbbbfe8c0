//! Application state and module organization
//!
//! [`App`] owns the page model, the tokio runtime that backend calls and
//! workflow runs execute on, and the receiving end of the command channel
//! those tasks report through.

use anyhow::{Context, Result};
use onground_sdk::{AgentResponse, DashboardBackend};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::DashboardConfig;
use crate::workflow::{RunSummary, StageTiming, WorkflowSequencer};

mod chat;
mod command_handlers;
mod commands;
mod models;

pub use chat::*;
pub use commands::*;
pub use models::*;

pub struct App {
    pub dashboard: Dashboard,
    pub input_buffer: String,
    pub focus: Focus,
    pub should_quit: bool,

    /// Summary of the most recent finished run.
    pub last_run: Option<RunSummary>,

    timing: StageTiming,
    backend: Arc<dyn DashboardBackend>,
    run_active: bool,
    /// Background tasks whose final command has not been handled yet.
    pending_tasks: usize,

    command_tx: mpsc::UnboundedSender<AppCommand>,
    command_rx: mpsc::UnboundedReceiver<AppCommand>,

    // Tokio runtime for async operations
    tokio_runtime: tokio::runtime::Runtime,
}

impl App {
    pub fn new(config: &DashboardConfig, backend: Arc<dyn DashboardBackend>) -> Result<Self> {
        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Ok(Self {
            dashboard: Dashboard::new(),
            input_buffer: String::new(),
            focus: Focus::default(),
            should_quit: false,
            last_run: None,
            timing: config.stage_timing(),
            backend,
            run_active: false,
            pending_tasks: 0,
            command_tx,
            command_rx,
            tokio_runtime,
        })
    }

    pub fn is_run_active(&self) -> bool {
        self.run_active
    }

    pub fn is_idle(&self) -> bool {
        self.pending_tasks == 0 && !self.run_active
    }

    fn begin_task(&mut self) {
        self.pending_tasks += 1;
    }

    fn finish_task(&mut self) {
        self.pending_tasks = self.pending_tasks.saturating_sub(1);
    }

    /// Kick off the initial load: `/api/data`, then `/api/tools`.
    pub fn start(&mut self) {
        tracing::info!("loading dashboard data");
        let backend = self.backend.clone();
        let tx = self.command_tx.clone();
        self.begin_task();
        self.tokio_runtime.spawn(async move {
            let error = async {
                let data = backend.fetch_data().await?;
                let _ = tx.send(AppCommand::DataLoaded(data));
                let tools = backend.fetch_tools().await?;
                let _ = tx.send(AppCommand::ToolsLoaded(tools));
                Ok::<(), onground_sdk::BackendError>(())
            }
            .await
            .err()
            .map(|e| e.to_string());
            let _ = tx.send(AppCommand::LoadFinished { error });
        });
    }

    /// Send the input buffer to the agent. Returns false when there was nothing to send.
    pub fn submit_chat(&mut self) -> bool {
        let message = self.input_buffer.trim().to_string();
        if message.is_empty() {
            return false;
        }

        tracing::info!(%message, "sending chat message");
        self.dashboard.chat.push_user(&message);
        self.input_buffer.clear();
        let thinking_id = self.dashboard.chat.push_loading();
        self.spawn_agent_request(message, thinking_id);
        true
    }

    fn start_run(&mut self, response: AgentResponse) {
        self.run_active = true;
        self.begin_task();

        let session_id = self.dashboard.header.session_id.clone();
        let counts = self.dashboard.data_counts;
        let timing = self.timing;
        let tx = self.command_tx.clone();

        self.tokio_runtime.spawn(async move {
            let events = tx.clone();
            let sequencer = WorkflowSequencer::new(timing, move |event| {
                let _ = events.send(AppCommand::Workflow(event));
            });
            let summary = sequencer.run(session_id, &response, counts).await;
            let _ = tx.send(AppCommand::RunFinished(summary));
        });
    }

    /// Apply every command that has already arrived.
    pub fn process_pending(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            self.dispatch(cmd);
        }
    }

    fn dispatch(&mut self, cmd: AppCommand) {
        if let Err(e) = self.handle_command(cmd) {
            tracing::warn!(error = %e, "command failed");
        }
    }

    /// Block until `done` holds or `timeout` passes, applying commands as they arrive.
    pub fn wait_for<F>(&mut self, timeout: Duration, done: F) -> bool
    where
        F: Fn(&App) -> bool,
    {
        // No deadline when `timeout` is too large to add to the clock.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            self.process_pending();
            if done(self) {
                return true;
            }

            let rx = &mut self.command_rx;
            let next = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    self.tokio_runtime
                        .block_on(async { tokio::time::timeout(remaining, rx.recv()).await })
                }
                None => Ok(self.tokio_runtime.block_on(rx.recv())),
            };
            match next {
                Ok(Some(cmd)) => self.dispatch(cmd),
                Ok(None) | Err(_) => return done(self),
            }
        }
    }

    /// Wait for all background work, including a running workflow, to finish.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.wait_for(timeout, App::is_idle)
    }

    pub fn scroll_up(&mut self) {
        let dashboard = &mut self.dashboard;
        match self.focus {
            Focus::Chat => {
                dashboard.chat.scroll_back = dashboard.chat.scroll_back.saturating_add(1)
            }
            Focus::ExecutionLog => dashboard.log.scroll_up(),
            Focus::Cards => dashboard.cards_scroll = dashboard.cards_scroll.saturating_sub(1),
        }
    }

    pub fn scroll_down(&mut self) {
        let dashboard = &mut self.dashboard;
        match self.focus {
            Focus::Chat => {
                dashboard.chat.scroll_back = dashboard.chat.scroll_back.saturating_sub(1)
            }
            Focus::ExecutionLog => dashboard.log.scroll_down(),
            Focus::Cards => {
                if dashboard.cards_scroll + 1 < dashboard.cards.len() {
                    dashboard.cards_scroll += 1;
                }
            }
        }
    }
}
