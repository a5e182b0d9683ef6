//! X Eyes: opens X/Twitter status links in a clean internal viewer.
//!
//! The background core intercepts status navigations, redirects them to
//! the viewer exactly once per tab, and owns the persisted reading stats
//! that viewer pages read and write over an async message protocol.
//!
//! This library crate exposes all modules for use by the host binary and
//! integration tests.

pub mod app;
#[cfg(feature = "sqlite")]
pub mod database;
pub mod host;
pub mod managers;
pub mod messaging;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod tracing_setup;
pub mod types;
