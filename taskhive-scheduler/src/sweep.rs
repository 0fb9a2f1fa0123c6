/// The reminder sweep
///
/// One sweep = select every task whose reminder deadline falls inside a
/// bounded two-day window, dispatch at most one email per task, and flip
/// the monotonic `reminder_sent` flag. The window deliberately spans
/// yesterday through tomorrow, so a task stays visible to consecutive
/// sweeps until its flag flips; idempotence comes from the flag, never
/// from the window arithmetic.
///
/// # Per-task failure semantics
///
/// A dispatch failure (or a missing assignee) is logged, leaves the flag
/// false, and never blocks the rest of the sweep; the task is naturally
/// retried by the next daily pass while it remains inside the window.
///
/// # Example
///
/// ```no_run
/// use taskhive_scheduler::store::PgReminderStore;
/// use taskhive_scheduler::sweep::run_sweep;
/// use taskhive_shared::notify::mock::MockNotifier;
/// use chrono::Utc;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let store = PgReminderStore::new(pool);
/// let notifier = MockNotifier::new();
///
/// let stats = run_sweep(&store, &notifier, Utc::now()).await?;
/// println!("dispatched {} reminders", stats.dispatched);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, NaiveTime, Utc};

use taskhive_shared::models::task::TaskStatus;
use taskhive_shared::notify::{render_reminder, Notifier};

use crate::store::{ReminderStore, StoreError};

/// The sweep's selection window
///
/// `[midnight of (now − 1 day), 23:59:59.999 of (now + 1 day)]` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReminderWindow {
    /// Computes the window around the moment a sweep runs
    pub fn around(now: DateTime<Utc>) -> Self {
        let start = (now - Duration::days(1))
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();

        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .expect("23:59:59.999 is a valid wall-clock time");
        let end = (now + Duration::days(1))
            .date_naive()
            .and_time(end_of_day)
            .and_utc();

        ReminderWindow { start, end }
    }

    /// Whether an instant falls inside the window (inclusive)
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Counters from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Tasks selected by the window query
    pub examined: usize,

    /// Reminders dispatched and marked delivered
    pub dispatched: usize,

    /// Deadlines still in the future; left for a later sweep
    pub deferred: usize,

    /// Tasks that no longer qualified on the mid-sweep re-check
    /// (completed, already marked, or deleted)
    pub skipped: usize,

    /// Dispatch failures and missing recipients; retried next sweep
    pub failed: usize,
}

/// Runs one sweep at the given instant
///
/// # Errors
///
/// Only the initial window select can fail the sweep; per-task store or
/// dispatch problems are logged and counted, never propagated.
pub async fn run_sweep(
    store: &dyn ReminderStore,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<SweepStats, StoreError> {
    let window = ReminderWindow::around(now);

    tracing::info!(
        window_start = %window.start,
        window_end = %window.end,
        "Checking for tasks that need reminders"
    );

    let due = store.due_reminders(&window).await?;
    let mut stats = SweepStats {
        examined: due.len(),
        ..SweepStats::default()
    };

    tracing::info!(count = due.len(), "Found tasks inside the reminder window");

    for candidate in due {
        let task_id = candidate.task.id;

        // Re-check: the task may have been completed, marked, or deleted
        // since the window select.
        let task = match store.refresh(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::debug!(task_id = %task_id, "Task deleted mid-sweep, skipping");
                stats.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Failed to re-read task, skipping");
                stats.failed += 1;
                continue;
            }
        };

        if task.reminder_sent || task.status == TaskStatus::Completed {
            tracing::debug!(task_id = %task_id, "Task no longer qualifies, skipping");
            stats.skipped += 1;
            continue;
        }

        if task.remind_at > now {
            // Inside the window but the instant has not passed yet; a
            // later sweep picks it up.
            tracing::debug!(task_id = %task_id, remind_at = %task.remind_at, "Reminder not yet due");
            stats.deferred += 1;
            continue;
        }

        let Some(ref email) = candidate.assignee_email else {
            tracing::warn!(task_id = %task_id, "Assignee no longer exists, no recipient for reminder");
            stats.failed += 1;
            continue;
        };

        match notifier.send(&render_reminder(&task, email)).await {
            Ok(()) => {
                match store.mark_reminder_sent(task_id).await {
                    Ok(true) => {
                        tracing::info!(task_id = %task_id, to = %email, "Reminder dispatched");
                        stats.dispatched += 1;
                    }
                    Ok(false) => {
                        // Lost a race with a concurrent mark; the flag is
                        // already true, so nothing more to do.
                        stats.skipped += 1;
                    }
                    Err(e) => {
                        tracing::warn!(task_id = %task_id, error = %e, "Failed to persist reminder flag");
                        stats.failed += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    task_id = %task_id,
                    channel = notifier.name(),
                    error = %e,
                    "Reminder dispatch failed, will retry next sweep"
                );
                stats.failed += 1;
            }
        }
    }

    tracing::info!(
        examined = stats.examined,
        dispatched = stats.dispatched,
        deferred = stats.deferred,
        skipped = stats.skipped,
        failed = stats.failed,
        "Sweep complete"
    );

    Ok(stats)
}
