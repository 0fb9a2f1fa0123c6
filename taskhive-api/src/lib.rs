//! # TaskHive API Server
//!
//! REST API for the TaskHive task tracker: authentication, role-scoped
//! task lifecycle operations, and user administration. All access
//! decisions are delegated to the pure policy engine in
//! `taskhive_shared::policy`; handlers resolve the entities a decision
//! needs and map the outcome onto HTTP.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
