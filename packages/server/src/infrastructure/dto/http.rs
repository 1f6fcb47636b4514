//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One room as listed by `/api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub members: Vec<String>,
    pub member_count: usize,
}
