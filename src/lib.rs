//! Customer Records Service Library
//!
//! A small record-management service: a REST API and two browser pages for
//! creating, listing, viewing, editing and deleting customer records stored in
//! PostgreSQL.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Lazily-established, shared database connection.
//! - `db_storage`: Storage backends for customer records.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Customer record and validation.
//! - `openapi`: OpenAPI document.
//! - `services`: Collection and item operations.
//! - `ui`: Browser pages.

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod ui;
