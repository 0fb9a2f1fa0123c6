/// Notification dispatch
///
/// TaskHive sends two kinds of email: an assignment notification when a
/// task is created, and a reminder when a task's reminder deadline passes.
/// Both go through the [`Notifier`] trait so the API server and the
/// scheduler never depend on a concrete delivery channel.
///
/// # Failure semantics
///
/// A [`DispatchError`] never propagates into the mutation or sweep that
/// triggered it: callers log it and move on. For reminders this means the
/// task's `reminder_sent` flag stays false and the next daily sweep
/// retries naturally.
///
/// # Implementations
///
/// - [`gateway::GatewayNotifier`]: POSTs the message to an HTTP email
///   gateway (production)
/// - [`mock::MockNotifier`]: records messages in memory (tests, local dev)

pub mod gateway;
pub mod mock;

use async_trait::async_trait;

use crate::models::task::Task;

/// A rendered, ready-to-send email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Rendered HTML body
    pub html_body: String,
}

/// Error type for notification dispatch
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The channel could not be reached
    #[error("Notification channel unreachable: {0}")]
    ChannelUnreachable(String),

    /// The channel rejected the message
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Notification channel contract
///
/// Implementations must be safe to call concurrently; delivery order
/// across messages is not guaranteed and nothing may depend on it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    /// Delivers one message
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

/// Renders the email sent when a task is assigned
///
/// `assigned_by` is the display name of the creator.
pub fn render_assignment(task: &Task, recipient_email: &str, assigned_by: &str) -> EmailMessage {
    let html_body = format!(
        "<h2>New Task Assignment</h2>\
         <p>You have been assigned a new task by {assigned_by}:</p>\
         <ul>\
         <li><strong>Title:</strong> {title}</li>\
         <li><strong>Description:</strong> {description}</li>\
         <li><strong>Due Date:</strong> {due_at}</li>\
         <li><strong>Priority:</strong> {priority}</li>\
         <li><strong>Reminder Date:</strong> {remind_at}</li>\
         </ul>\
         <p>Please review and start working on this task.</p>",
        title = task.title,
        description = task.description,
        due_at = task.due_at.format("%Y-%m-%d %H:%M UTC"),
        priority = task.priority.as_str(),
        remind_at = task.remind_at.format("%Y-%m-%d %H:%M UTC"),
    );

    EmailMessage {
        to: recipient_email.to_string(),
        subject: format!("New Task Assigned: {}", task.title),
        html_body,
    }
}

/// Renders the email sent when a task's reminder deadline passes
pub fn render_reminder(task: &Task, recipient_email: &str) -> EmailMessage {
    let html_body = format!(
        "<h2>Task Reminder</h2>\
         <p>You have a task due soon:</p>\
         <ul>\
         <li><strong>Title:</strong> {title}</li>\
         <li><strong>Description:</strong> {description}</li>\
         <li><strong>Due Date:</strong> {due_at}</li>\
         <li><strong>Priority:</strong> {priority}</li>\
         <li><strong>Status:</strong> {status}</li>\
         </ul>\
         <p>Please make sure to complete this task on time.</p>",
        title = task.title,
        description = task.description,
        due_at = task.due_at.format("%Y-%m-%d %H:%M UTC"),
        priority = task.priority.as_str(),
        status = task.status.as_str(),
    );

    EmailMessage {
        to: recipient_email.to_string(),
        subject: format!("Task Reminder: {}", task.title),
        html_body,
    }
}
