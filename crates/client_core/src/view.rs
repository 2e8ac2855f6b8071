//! Client-side filtering and selection for the committed order table.
//! Pure view logic; mutations stay in the store.

use std::collections::HashSet;

use shared::domain::{OrderId, OrderStatus, PurchaseOrder};

/// Status side of the table filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn accepts(self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(only) => only == status,
        }
    }
}

/// An order matches iff the search string hits its id or supplier
/// (case-insensitive, empty search matches everything) and the status
/// filter accepts its status.
pub fn order_matches(order: &PurchaseOrder, search: &str, filter: StatusFilter) -> bool {
    let needle = search.trim().to_lowercase();
    let text_hit = needle.is_empty()
        || order.id.as_str().to_lowercase().contains(&needle)
        || order.supplier.to_lowercase().contains(&needle);
    text_hit && filter.accepts(order.status)
}

pub fn filter_orders<'a>(
    orders: &'a [PurchaseOrder],
    search: &str,
    filter: StatusFilter,
) -> Vec<&'a PurchaseOrder> {
    orders
        .iter()
        .filter(|order| order_matches(order, search, filter))
        .collect()
}

/// Multi-select over the filtered view, keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<OrderId>,
}

impl Selection {
    pub fn contains(&self, id: &OrderId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn toggle(&mut self, id: &OrderId) {
        if !self.ids.remove(id) {
            self.ids.insert(id.clone());
        }
    }

    pub fn remove(&mut self, id: &OrderId) {
        self.ids.remove(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in a stable order, for bulk operations and display.
    pub fn ids(&self) -> Vec<OrderId> {
        let mut ids: Vec<OrderId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn all_selected(&self, filtered: &[&PurchaseOrder]) -> bool {
        !filtered.is_empty() && filtered.iter().all(|order| self.ids.contains(&order.id))
    }

    /// Select-all toggles between none and every currently-filtered row;
    /// a partial selection promotes to all-filtered first. Selection
    /// tracks the filtered view, never the whole list.
    pub fn toggle_all(&mut self, filtered: &[&PurchaseOrder]) {
        if self.all_selected(filtered) {
            self.ids.clear();
        } else {
            self.ids = filtered.iter().map(|order| order.id.clone()).collect();
        }
    }

    /// Drop selected ids that no longer exist in the committed list, so a
    /// later bulk delete cannot reference stale rows.
    pub fn retain_known(&mut self, orders: &[PurchaseOrder]) {
        let known: HashSet<OrderId> = orders.iter().map(|order| order.id.clone()).collect();
        self.ids.retain(|id| known.contains(id));
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
