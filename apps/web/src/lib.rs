//! Web frontend for the CV / project-report evaluation service.
//!
//! Collects a job title and two PDFs, relays them to the evaluation backend,
//! then polls the job until it finishes and renders the result.

pub mod backend_client;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod polling;
pub mod proxy;
pub mod render;
pub mod routes;
pub mod state;
pub mod submission;
