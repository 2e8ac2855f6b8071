use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Purchase-order identifier. Assigned by the user or the parsing service,
/// never generated server-side. The sole identity for equality, selection
/// membership, and overwrite detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Product Delays")]
    ProductDelays,
    #[serde(rename = "Shipment Delay")]
    ShipmentDelay,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::OnTrack,
        OrderStatus::Shipped,
        OrderStatus::ProductDelays,
        OrderStatus::ShipmentDelay,
    ];

    /// The backend's exact enum literal for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::OnTrack => "On Track",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::ProductDelays => "Product Delays",
            OrderStatus::ShipmentDelay => "Shipment Delay",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

fn default_supplier() -> String {
    "Unknown Supplier".to_string()
}

fn default_items() -> String {
    "Items not specified".to_string()
}

fn default_last_updated() -> String {
    "Unknown".to_string()
}

/// One supplier purchase order as the backend stores it. Dates are display
/// strings, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,
    #[serde(default = "default_supplier")]
    pub supplier: String,
    #[serde(default = "default_items")]
    pub items: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "default_last_updated")]
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_backend_literals() {
        for (status, literal) in [
            (OrderStatus::OnTrack, "\"On Track\""),
            (OrderStatus::Shipped, "\"Shipped\""),
            (OrderStatus::ProductDelays, "\"Product Delays\""),
            (OrderStatus::ShipmentDelay, "\"Shipment Delay\""),
        ] {
            assert_eq!(serde_json::to_string(&status).expect("serialize"), literal);
            let parsed: OrderStatus = serde_json::from_str(literal).expect("deserialize");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_parses_from_user_input() {
        assert_eq!(
            "shipment delay".parse::<OrderStatus>().expect("parse"),
            OrderStatus::ShipmentDelay
        );
        assert!("In Transit".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn sparse_order_payload_fills_backend_defaults() {
        let order: PurchaseOrder =
            serde_json::from_str(r#"{"id": "PO-1"}"#).expect("deserialize");
        assert_eq!(order.supplier, "Unknown Supplier");
        assert_eq!(order.items, "Items not specified");
        assert_eq!(order.last_updated, "Unknown");
        assert_eq!(order.status, OrderStatus::OnTrack);
        assert_eq!(order.expected_date, None);
        assert_eq!(order.additional_context, None);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let order = PurchaseOrder {
            id: OrderId::new("PO-1"),
            supplier: "Acme Corp".to_string(),
            items: "100x Widget A".to_string(),
            expected_date: None,
            status: OrderStatus::OnTrack,
            last_updated: "Jan 2, 2024".to_string(),
            additional_context: None,
        };
        let json = serde_json::to_string(&order).expect("serialize");
        assert!(!json.contains("expected_date"));
        assert!(!json.contains("additional_context"));
    }
}
