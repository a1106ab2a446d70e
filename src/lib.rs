//! Avatar generation service
//!
//! Accepts face-swap requests, records each one as a durable job in
//! PostgreSQL, runs the call to the external generation provider in a
//! background task, and writes the job's terminal status back to the store.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
