//! Infrastructure layer: wire DTOs, collaborator implementations and the
//! WebSocket connection adapter.

pub mod connection;
pub mod dto;
pub mod repository;
