//! The projection and authorization layer of the platform's control-plane API.
//!
//! Everything the API serves about applications is read from resources that a separate operator reconciles.
//! Those resources arrive as flat, unordered lists; the modules here turn them into the views clients see:
//!
//! * [`access`] narrows application registrations down to those the user may see.
//! * [`deployments`] rebuilds per environment deployment history from immutable snapshots.
//! * [`promotion`] derives a new deployment for another environment from an existing one.
//! * [`jobs`] derives pipeline job and step status.
//!
//! None of these perform I/O of their own; remote checks are injected by the HTTP handlers that call them.

pub mod access;
pub mod conf;
pub mod deployments;
pub mod errors;
pub mod jobs;
pub mod metrics;
pub mod models;
pub mod promotion;
pub mod telemetry;
