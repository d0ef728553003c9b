//! School report entry and printing service.
//!
//! Scores are submitted through an HTML form, stored in SQLite and shown as
//! a printable report with computed grades and an overall status.

pub mod auth;
pub mod calc;
pub mod config;
pub mod db;
pub mod http;
pub mod render;
pub mod submission;
