//! API module
//!
//! Contains HTTP request handlers for the control surface endpoints

pub mod agent;
pub mod logs;
pub mod tasks;
