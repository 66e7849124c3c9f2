//! Waiting for OneView asynchronous tasks.
//!
//! Mutating calls that cannot finish synchronously hand back a task. The
//! [`TaskMonitor`] polls that task until it reaches a terminal state or the
//! caller's timeout elapses.
//!
//! # Polling
//!
//! The delay between polls starts at the configured interval and doubles
//! after each poll, up to the configured maximum. A timeout only stops this
//! client from waiting; the task keeps running on the appliance.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::config::{Config, DEFAULT_TASK_MAX_POLL_MS, DEFAULT_TASK_POLL_MS};
use crate::connection::Connection;
use crate::error::{OneViewError, Result};
use crate::models::{Task, TaskRef, TaskState};

/// Polls tasks until completion.
#[derive(Clone)]
pub struct TaskMonitor {
    connection: Arc<dyn Connection>,
    poll_interval: Duration,
    max_poll_interval: Duration,
}

impl TaskMonitor {
    /// Creates a monitor with the default polling schedule.
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            poll_interval: Duration::from_millis(DEFAULT_TASK_POLL_MS),
            max_poll_interval: Duration::from_millis(DEFAULT_TASK_MAX_POLL_MS),
        }
    }

    /// Creates a monitor using the polling schedule from configuration.
    pub fn from_config(connection: Arc<dyn Connection>, config: &Config) -> Self {
        Self::new(connection).with_poll_interval(config.task_poll_interval, config.task_max_poll_interval)
    }

    /// Sets the initial and maximum delay between polls.
    ///
    /// A zero initial interval is raised to one millisecond so the loop
    /// always yields between polls.
    pub fn with_poll_interval(mut self, initial: Duration, max: Duration) -> Self {
        self.poll_interval = initial.max(Duration::from_millis(1));
        self.max_poll_interval = max.max(self.poll_interval);
        self
    }

    /// Waits for a task to reach a terminal state and returns its final body.
    ///
    /// A snapshot that is already terminal is returned without polling.
    ///
    /// # Arguments
    ///
    /// * `task` - The task to wait for
    /// * `timeout` - How long to wait; `None` waits indefinitely
    ///
    /// # Errors
    ///
    /// - `OneViewError::TaskFailed` if the task ends in `Error`, `Terminated`
    ///   or `Killed`; the task's `taskErrors` are carried in the error
    /// - `OneViewError::TaskTimeout` if the task is still running when the
    ///   timeout elapses
    /// - Any transport error from polling, unchanged
    pub async fn wait_for_task(&self, task: &TaskRef, timeout: Option<Duration>) -> Result<Value> {
        if let Some(snapshot) = &task.snapshot {
            let state = Task::state_of(snapshot);
            if state.is_terminal() {
                tracing::debug!(task_uri = %task.uri, state = state.as_str(), "Task already finished");
                return self.finish(task, state, snapshot.clone());
            }
        }

        let started = Instant::now();
        let mut delay = self.poll_interval;
        let mut polls = 0u32;
        let mut warned_unknown = false;

        loop {
            let body = self.connection.get(&task.uri).await?;
            polls += 1;
            let state = Task::state_of(&body);

            tracing::debug!(
                task_uri = %task.uri,
                state = state.as_str(),
                poll = polls,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Polled task"
            );

            if state.is_terminal() {
                return self.finish(task, state, body);
            }

            if state == TaskState::Unknown && !warned_unknown {
                warned_unknown = true;
                tracing::warn!(
                    task_uri = %task.uri,
                    "Task reports no recognized taskState, polling continues until timeout"
                );
            }

            let elapsed = started.elapsed();
            let sleep_for = match timeout {
                Some(limit) if elapsed >= limit => {
                    tracing::debug!(task_uri = %task.uri, polls, "Gave up waiting for task");
                    return Err(OneViewError::task_timeout(&task.uri, elapsed));
                }
                Some(limit) => delay.min(limit - elapsed),
                None => delay,
            };

            tokio::time::sleep(sleep_for).await;
            delay = (delay * 2).min(self.max_poll_interval);
        }
    }

    /// Waits for a task and returns it as a typed [`Task`].
    pub async fn get_completed_task(&self, task: &TaskRef, timeout: Option<Duration>) -> Result<Task> {
        let body = self.wait_for_task(task, timeout).await?;
        serde_json::from_value(body).map_err(OneViewError::Serialization)
    }

    /// Fetches the resource a completed task acted on.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::InvalidArgument` if the task carries no
    /// `associatedResource.resourceUri`.
    pub async fn get_associated_resource(&self, task: &Task) -> Result<Value> {
        let uri = task.associated_resource_uri().ok_or_else(|| {
            OneViewError::invalid_argument("task has no associated resource")
        })?;
        self.connection.get(uri).await
    }

    fn finish(&self, task: &TaskRef, state: TaskState, body: Value) -> Result<Value> {
        if state.is_failure() {
            let first = serde_json::from_value::<Task>(body.clone())
                .ok()
                .and_then(|typed| typed.first_error().cloned())
                .unwrap_or_default();

            tracing::debug!(task_uri = %task.uri, state = state.as_str(), "Task failed");

            return Err(OneViewError::TaskFailed {
                task_uri: task.uri.clone(),
                state: state.as_str().to_string(),
                message: first
                    .message
                    .unwrap_or_else(|| format!("task finished in state {}", state.as_str())),
                error_code: first.error_code,
                recommended_actions: first.recommended_actions,
                details: body.get("taskErrors").cloned().unwrap_or(Value::Null),
            });
        }

        if state == TaskState::Warning {
            tracing::warn!(task_uri = %task.uri, "Task completed with warnings");
        }

        Ok(body)
    }
}
