//! Application core — command handling and orchestration, zero direct I/O.
//!
//! This module contains the business rules of the heater controller:
//! authorisation, command dispatch and execution, the inbound message
//! batch, status text and the per-cycle orchestrator.  All interaction
//! with the modem, relay, sensors and display happens through **port
//! traits** defined in [`ports`], keeping this layer testable without
//! real peripherals.

pub mod auth;
pub mod batch;
pub mod commands;
pub mod dispatch;
pub mod events;
pub mod executor;
pub mod messages;
pub mod notify;
pub mod pipeline;
pub mod ports;
pub mod service;
pub mod status;
