//! Shared utilities for the Lobby workspace: logging setup and time handling.

pub mod logger;
pub mod time;
