//! # ProjectDesk API Server Library
//!
//! HTTP surface over the project, membership, and task services in
//! `projectdesk-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
