//! hanami-node library entry point.
//!
//! The binary in `main.rs` and the integration tests in `tests/` share this
//! module tree.
//!
//! - **`config`** – TOML configuration: listen address, logging, named
//!   outbound groups.
//! - **`bootstrap`** – Process start-up: load + validate config, install the
//!   tracing subscriber.
//! - **`network`** – Stream framing for Hanami messages and the TCP
//!   server/client built on it.

pub mod bootstrap;
pub mod config;
pub mod network;
