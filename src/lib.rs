//! Personal task tracker: daily (recurring) and overall (deadline-bound)
//! tasks kept in a single JSON file.
//!
//! [`services::tasks::TaskStore`] is the only way to change the file. Front-ends
//! build a [`models::task::Task`], hand it to the store, and re-query it to
//! render results.

pub mod config;
pub mod logging;
pub mod menu;
pub mod models;
pub mod services;
pub mod storage;
pub mod ui;
