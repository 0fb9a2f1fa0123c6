/// Daily trigger loop
///
/// Fires the sweep once every 24 hours at a fixed UTC wall-clock hour
/// (default midnight, matching the original deployment's schedule). The
/// sweep runs inline in the loop, so a new sweep can never start while
/// the previous one is still in flight. Shutdown is cooperative via a
/// `CancellationToken`.
///
/// # Example
///
/// ```no_run
/// use taskhive_scheduler::service::{ReminderService, ServiceConfig};
/// use taskhive_scheduler::store::PgReminderStore;
/// use taskhive_shared::notify::mock::MockNotifier;
/// use std::sync::Arc;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) {
/// let service = ReminderService::new(
///     Arc::new(PgReminderStore::new(pool)),
///     Arc::new(MockNotifier::new()),
///     ServiceConfig::default(),
/// );
///
/// let shutdown = service.shutdown_token();
/// service.run().await;
/// # }
/// ```

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use taskhive_shared::notify::Notifier;

use crate::store::ReminderStore;
use crate::sweep::run_sweep;

/// Reminder service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// UTC hour (0-23) at which the daily sweep fires
    pub fire_hour_utc: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig { fire_hour_utc: 0 }
    }
}

/// The daily reminder service
pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
    config: ServiceConfig,
    shutdown: CancellationToken,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        ReminderService {
            store,
            notifier,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until the shutdown token is cancelled
    pub async fn run(&self) {
        tracing::info!(
            fire_hour_utc = self.config.fire_hour_utc,
            "Reminder service started, sweeping once daily"
        );

        loop {
            let now = Utc::now();
            let next = next_fire_instant(now, self.config.fire_hour_utc);
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);

            tracing::info!(next_sweep = %next, "Sleeping until next sweep");

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reminder service shutting down");
                    break;
                }
                _ = sleep(wait) => {
                    match run_sweep(self.store.as_ref(), self.notifier.as_ref(), Utc::now()).await {
                        Ok(stats) => {
                            tracing::info!(
                                dispatched = stats.dispatched,
                                failed = stats.failed,
                                "Daily sweep finished"
                            );
                        }
                        Err(e) => {
                            // The next day's sweep re-examines everything
                            // still inside the window.
                            tracing::error!(error = %e, "Daily sweep aborted");
                        }
                    }
                }
            }
        }
    }
}

/// Next instant at which the daily trigger fires
///
/// Today at `fire_hour_utc:00:00` if that is still ahead of `now`,
/// otherwise the same time tomorrow. `fire_hour_utc` must be 0-23;
/// configuration loading rejects anything else before a service exists.
pub fn next_fire_instant(now: DateTime<Utc>, fire_hour_utc: u32) -> DateTime<Utc> {
    debug_assert!(fire_hour_utc <= 23, "fire hour out of range");
    let fire_time =
        NaiveTime::from_hms_opt(fire_hour_utc, 0, 0).expect("fire hour must be 0-23");

    let today = now.date_naive().and_time(fire_time).and_utc();
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_next_fire_later_today() {
        let now = utc(2024, 6, 9, 10, 0, 0);
        assert_eq!(next_fire_instant(now, 23), utc(2024, 6, 9, 23, 0, 0));
    }

    #[test]
    fn test_next_fire_rolls_to_tomorrow() {
        let now = utc(2024, 6, 9, 10, 0, 0);
        assert_eq!(next_fire_instant(now, 0), utc(2024, 6, 10, 0, 0, 0));
        assert_eq!(next_fire_instant(now, 10), utc(2024, 6, 10, 10, 0, 0));
    }

    #[test]
    #[should_panic(expected = "fire hour")]
    fn test_next_fire_rejects_out_of_range_hour() {
        next_fire_instant(utc(2024, 6, 9, 10, 0, 0), 99);
    }

    #[test]
    fn test_interval_between_fires_is_24_hours() {
        let first = next_fire_instant(utc(2024, 6, 9, 0, 0, 1), 0);
        let second = next_fire_instant(first, 0);
        assert_eq!(second - first, ChronoDuration::days(1));
    }
}
