//! Best-effort forwarding of stored readings to an Ubidots-style device API.
//!
//! Ingestion hands each committed reading to a bounded queue and returns
//! immediately; a background task drains the queue. Nothing here can change
//! what the ingestion caller sees.

mod client;
mod controller;
mod loop_worker;

pub use client::UbidotsClient;
pub use controller::{ForwarderHandle, ForwardingController};
