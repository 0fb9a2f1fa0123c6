//! # TaskHive Scheduler
//!
//! The unattended reminder subsystem: once a day it sweeps the task store
//! for reminder deadlines inside a two-day window, dispatches exactly one
//! email per qualifying task, and flips the task's monotonic
//! `reminder_sent` flag so no later sweep ever resends it.
//!
//! ## Modules
//!
//! - `sweep`: window arithmetic and a single idempotent sweep pass
//! - `store`: the `ReminderStore` trait and its PostgreSQL implementation
//! - `service`: the fixed daily trigger loop
//! - `config`: environment configuration for the scheduler binary

pub mod config;
pub mod service;
pub mod store;
pub mod sweep;
