//! UI events and error modeling for the desktop controller.

use shared::{
    domain::{OrderId, PurchaseOrder},
    protocol::EmailParsingResponse,
};

use crate::backend_bridge::commands::SaveOrigin;

pub enum UiEvent {
    OrdersChanged { orders: Vec<PurchaseOrder> },
    LoadingChanged { loading: bool },
    /// Transient success notification from the store.
    Notice(String),
    ParseFinished(EmailParsingResponse),
    ParseFailed(String),
    OrderSaved { id: OrderId, origin: SaveOrigin },
    SaveFailed {
        id: OrderId,
        origin: SaveOrigin,
        message: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Parse,
    Save,
    General,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("dns")
            || lower.contains("network")
            || lower.contains("unreachable")
            || lower.contains("request failed")
        {
            UiErrorCategory::Transport
        } else if lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("malformed")
            || lower.contains("400")
            || lower.contains("404")
            || lower.contains("422")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Startup and transport failures get the persistent banner; everything
    /// else only touches the status line.
    pub fn wants_banner(&self) -> bool {
        self.context == UiErrorContext::BackendStartup || self.category == UiErrorCategory::Transport
    }
}
