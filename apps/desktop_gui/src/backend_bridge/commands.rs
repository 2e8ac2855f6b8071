//! Backend commands queued from UI to the backend worker.

use shared::domain::{OrderId, OrderStatus, PurchaseOrder};

/// Where a save originated, so the UI knows whether a staged draft is
/// waiting on the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// Accepting a staged draft; success removes it from the session,
    /// failure keeps it staged.
    Draft,
    /// Manual entry or an edit of a committed order.
    Form,
}

pub enum BackendCommand {
    RefreshOrders,
    SaveOrder {
        order: PurchaseOrder,
        origin: SaveOrigin,
    },
    UpdateStatus {
        id: OrderId,
        status: OrderStatus,
    },
    DeleteOrder {
        id: OrderId,
    },
    DeleteOrders {
        ids: Vec<OrderId>,
    },
    ParseEmail {
        email_text: String,
    },
}
