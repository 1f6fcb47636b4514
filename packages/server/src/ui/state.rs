//! Server state shared by the handlers.

use crate::hub::{HubHandle, PumpOptions};

/// Shared application state
pub struct AppState {
    /// Hub（ルームとクライアントの管理）
    pub hub: HubHandle,
    /// 新規クライアントのメールボックス容量
    pub mailbox_capacity: usize,
    pub pump_options: PumpOptions,
}
