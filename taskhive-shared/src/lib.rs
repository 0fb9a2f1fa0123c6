//! # TaskHive Shared Library
//!
//! This crate contains the types and business logic shared by the TaskHive
//! API server and the reminder scheduler.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, tasks)
//! - `db`: Connection pool and migration runner
//! - `auth`: Password hashing, JWT tokens, and the request actor context
//! - `policy`: The pure role/ownership access policy engine
//! - `notify`: Notification dispatch (email gateway + mock)

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;
pub mod policy;

/// Current version of the TaskHive shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
