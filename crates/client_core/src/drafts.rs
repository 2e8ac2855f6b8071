//! Review session for parsed order drafts: staging, accept/edit/discard,
//! and the duplicate-id overwrite flow. Pure state; commits go through the
//! order store, owned by whoever drives the session.

use std::collections::HashSet;

use shared::{
    domain::{OrderId, PurchaseOrder},
    protocol::EmailParsingResponse,
};

/// Lifecycle of one parse batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePhase {
    #[default]
    Idle,
    Parsing,
    /// Drafts and warnings from the last parse are available for review;
    /// either list may be empty.
    Ready,
    /// The parse call itself failed; any previously staged batch is kept.
    Failed,
}

/// What accepting a given draft requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptDisposition {
    /// No known id collision; commit immediately.
    Commit(PurchaseOrder),
    /// The id already exists in the backend; an explicit overwrite
    /// confirmation is required first.
    NeedsConfirmation(OrderId),
}

/// Partition produced by accept-all. Non-duplicates commit independently;
/// duplicates stay staged. There is deliberately no batch overwrite: each
/// duplicate must be confirmed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptAllPlan {
    pub commit_now: Vec<PurchaseOrder>,
    pub duplicates: Vec<OrderId>,
}

#[derive(Debug, Default)]
pub struct DraftSession {
    phase: ParsePhase,
    staged: Vec<PurchaseOrder>,
    warnings: Vec<String>,
    known_existing: HashSet<OrderId>,
    pending_overwrite: Option<OrderId>,
    last_failure: Option<String>,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ParsePhase {
        self.phase
    }

    pub fn staged(&self) -> &[PurchaseOrder] {
        &self.staged
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn pending_overwrite(&self) -> Option<&OrderId> {
        self.pending_overwrite.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.warnings.is_empty()
    }

    /// Whether accepting this id would overwrite a stored order.
    pub fn is_duplicate(&self, id: &OrderId) -> bool {
        self.known_existing.contains(id)
    }

    pub fn begin_parse(&mut self) {
        self.phase = ParsePhase::Parsing;
        self.last_failure = None;
    }

    /// Stage the results of a successful parse call, replacing any
    /// previous batch.
    pub fn parse_succeeded(&mut self, response: EmailParsingResponse) {
        self.staged = response.parsed_data;
        self.warnings = response.errors;
        self.known_existing = response.existing_ids.into_iter().collect();
        self.pending_overwrite = None;
        self.last_failure = None;
        self.phase = ParsePhase::Ready;
    }

    pub fn parse_failed(&mut self, message: impl Into<String>) {
        self.last_failure = Some(message.into());
        self.phase = ParsePhase::Failed;
    }

    /// Dispose an accept request for the staged draft with `id`. A
    /// duplicate id becomes the pending overwrite prompt instead of a
    /// commit. Returns `None` when no such draft is staged.
    pub fn request_accept(&mut self, id: &OrderId) -> Option<AcceptDisposition> {
        let draft = self.staged.iter().find(|draft| draft.id == *id)?;
        if self.known_existing.contains(id) {
            self.pending_overwrite = Some(id.clone());
            Some(AcceptDisposition::NeedsConfirmation(id.clone()))
        } else {
            Some(AcceptDisposition::Commit(draft.clone()))
        }
    }

    /// Confirm the pending overwrite, yielding the draft to commit.
    pub fn confirm_overwrite(&mut self) -> Option<PurchaseOrder> {
        let id = self.pending_overwrite.take()?;
        self.staged.iter().find(|draft| draft.id == id).cloned()
    }

    /// Dismiss the overwrite prompt; the draft stays staged.
    pub fn cancel_overwrite(&mut self) {
        self.pending_overwrite = None;
    }

    /// Record a successful commit: the draft leaves the staged list and its
    /// id is no longer a known duplicate.
    pub fn mark_committed(&mut self, id: &OrderId) {
        self.staged.retain(|draft| draft.id != *id);
        self.known_existing.remove(id);
        if self.pending_overwrite.as_ref() == Some(id) {
            self.pending_overwrite = None;
        }
    }

    /// Drop a draft without any backend call.
    pub fn discard(&mut self, id: &OrderId) {
        self.staged.retain(|draft| draft.id != *id);
        if self.pending_overwrite.as_ref() == Some(id) {
            self.pending_overwrite = None;
        }
    }

    /// Replace the draft that previously had `original_id`; an edit may
    /// change the id itself, which re-evaluates duplicate detection on the
    /// next accept.
    pub fn replace(&mut self, original_id: &OrderId, updated: PurchaseOrder) {
        if let Some(slot) = self
            .staged
            .iter_mut()
            .find(|draft| draft.id == *original_id)
        {
            *slot = updated;
        }
    }

    /// Partition the staged drafts for accept-all. When exactly one
    /// duplicate remains it becomes the pending overwrite prompt; with
    /// more than one, each must be resolved individually.
    pub fn plan_accept_all(&mut self) -> AcceptAllPlan {
        let mut plan = AcceptAllPlan::default();
        for draft in &self.staged {
            if self.known_existing.contains(&draft.id) {
                plan.duplicates.push(draft.id.clone());
            } else {
                plan.commit_now.push(draft.clone());
            }
        }
        if let [only] = plan.duplicates.as_slice() {
            self.pending_overwrite = Some(only.clone());
        }
        plan
    }

    /// Empty the whole session without touching the backend.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "tests/drafts_tests.rs"]
mod tests;
