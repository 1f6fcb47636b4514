//! Real-time room chat hub.
//!
//! Clients connect over WebSocket, join a single room, and receive every
//! message broadcast to that room plus the room's history on join.

pub mod config;
pub mod domain;
pub mod hub;
pub mod infrastructure;
pub mod ui;
