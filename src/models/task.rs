//! Task models for OneView asynchronous operations.
//!
//! Mutating calls that cannot finish synchronously return a task resource.
//! These types give a typed view of the fields the task monitor inspects;
//! the raw JSON is always kept alongside.

use serde::Deserialize;
use serde_json::Value;

/// Reference to a task started by a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRef {
    /// Address used to poll the task.
    pub uri: String,

    /// Task body returned with the call that started it, if any.
    pub snapshot: Option<Value>,
}

impl TaskRef {
    /// Creates a task reference from its address.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            snapshot: None,
        }
    }

    /// Attaches the task body returned by the initiating call.
    pub fn with_snapshot(mut self, snapshot: Value) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// State of a task as reported in `taskState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TaskState {
    /// Created but not yet scheduled.
    New,
    /// Waiting to run.
    Pending,
    /// Being started.
    Starting,
    /// In progress.
    Running,
    /// Being stopped.
    Stopping,
    /// Paused.
    Suspended,
    /// Interrupted; may resume.
    Interrupted,
    /// Finished successfully.
    Completed,
    /// Finished with warnings.
    Warning,
    /// Finished with errors.
    Error,
    /// Stopped before finishing.
    Terminated,
    /// Forcibly stopped.
    Killed,
    /// Any state this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Parses a `taskState` value; unrecognized values map to `Unknown`.
    pub fn parse(state: &str) -> Self {
        serde_json::from_value(Value::String(state.to_string())).unwrap_or(TaskState::Unknown)
    }

    /// Returns true once the task will not change state again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed
                | TaskState::Warning
                | TaskState::Error
                | TaskState::Terminated
                | TaskState::Killed
        )
    }

    /// Returns true for terminal states that represent a failure.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            TaskState::Error | TaskState::Terminated | TaskState::Killed
        )
    }

    /// Wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::New => "New",
            TaskState::Pending => "Pending",
            TaskState::Starting => "Starting",
            TaskState::Running => "Running",
            TaskState::Stopping => "Stopping",
            TaskState::Suspended => "Suspended",
            TaskState::Interrupted => "Interrupted",
            TaskState::Completed => "Completed",
            TaskState::Warning => "Warning",
            TaskState::Error => "Error",
            TaskState::Terminated => "Terminated",
            TaskState::Killed => "Killed",
            TaskState::Unknown => "Unknown",
        }
    }
}

/// One element of a task's `taskErrors` list.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskError {
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,

    /// Appliance error code.
    #[serde(default)]
    pub error_code: Option<String>,

    /// Suggested resolution.
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

/// The resource a task acted on.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedResource {
    /// Address of the resource.
    #[serde(default)]
    pub resource_uri: Option<String>,

    /// Display name of the resource.
    #[serde(default)]
    pub resource_name: Option<String>,

    /// Category of the resource, e.g. `fc-networks`.
    #[serde(default)]
    pub resource_category: Option<String>,
}

/// Typed view of a task resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Address of the task.
    #[serde(default)]
    pub uri: Option<String>,

    /// Task name, e.g. `Create`, `Delete`, `Update`.
    #[serde(default)]
    pub name: Option<String>,

    /// Current state.
    #[serde(default = "unknown_state")]
    pub task_state: TaskState,

    /// Progress percentage.
    #[serde(default)]
    pub percent_complete: Option<u32>,

    /// Errors reported by the task.
    #[serde(default)]
    pub task_errors: Vec<TaskError>,

    /// The resource the task acted on.
    #[serde(default)]
    pub associated_resource: Option<AssociatedResource>,
}

fn unknown_state() -> TaskState {
    TaskState::Unknown
}

impl Task {
    /// Returns true if the raw body looks like a task resource.
    pub fn is_task_body(body: &Value) -> bool {
        body.get("category").and_then(Value::as_str) == Some("tasks")
    }

    /// Reads the `taskState` of a raw task body.
    pub fn state_of(body: &Value) -> TaskState {
        body.get("taskState")
            .and_then(Value::as_str)
            .map(TaskState::parse)
            .unwrap_or(TaskState::Unknown)
    }

    /// Address of the associated resource, if the task reported one.
    pub fn associated_resource_uri(&self) -> Option<&str> {
        self.associated_resource
            .as_ref()
            .and_then(|r| r.resource_uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }

    /// First error message, if any.
    pub fn first_error(&self) -> Option<&TaskError> {
        self.task_errors.first()
    }
}
