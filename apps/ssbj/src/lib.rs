//! # SSBJ Readiness Application
//!
//! Library half of the `ssbj` binary: the HTTP API, the CLI commands and
//! configuration loading. Exposed as a library so integration tests can
//! build the router without binding a socket.

pub mod api;
pub mod cli;
pub mod config;
