//! # ProjectDesk Shared Library
//!
//! Types, storage access, and business rules shared by the ProjectDesk API
//! server and its integration tests.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, projects, memberships, tasks)
//! - `auth`: Password hashing, JWT, auth context, and the project authorization policy
//! - `service`: Transport-agnostic project, membership, and task operations

pub mod auth;
pub mod db;
pub mod models;
pub mod service;

/// Current version of the ProjectDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
