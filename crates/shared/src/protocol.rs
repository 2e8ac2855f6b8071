use serde::{Deserialize, Serialize};

use crate::domain::{OrderId, PurchaseOrder};

/// Body for `POST /orders/parse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailParsingRequest {
    pub email_text: String,
}

/// Result of parsing one pasted blob of supplier email text. Zero or
/// partial extraction is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailParsingResponse {
    /// Candidate order drafts, one per email/PO found in the text.
    #[serde(default)]
    pub parsed_data: Vec<PurchaseOrder>,
    /// Human-readable warnings for spans that failed extraction.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Ids already present in the backend at parse time; accepting one of
    /// these overwrites the stored order. Absent on older backend builds.
    #[serde(default)]
    pub existing_ids: Vec<OrderId>,
}

/// Response of `POST /orders/delete-many`. The backend also returns a
/// human-readable `message`, which clients ignore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteManyResponse {
    pub deleted_count: u64,
}
