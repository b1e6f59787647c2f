// src/lib.rs
//! Teaching-assistant application shortlisting: the HTTP API, its domain
//! core and the dashboard client.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod logging_middleware;
pub mod selections;
