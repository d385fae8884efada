//! Hangar heater supervisor library.
//!
//! Exposes the orchestration core and the host adapters for integration
//! testing.  The binary in `main.rs` wires them together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod safety;
pub mod scheduler;
