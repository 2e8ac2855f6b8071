//! egui application: email parser panel, order table, edit dialog, and the
//! confirmation modals around destructive actions.

use std::collections::HashSet;

use client_core::{
    drafts::{AcceptDisposition, DraftSession, ParsePhase},
    view::{filter_orders, Selection, StatusFilter},
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{OrderId, OrderStatus, PurchaseOrder};

use crate::backend_bridge::commands::{BackendCommand, SaveOrigin};
use crate::controller::events::{err_label, UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::settings::PersistedSettings;

fn status_color(status: OrderStatus) -> egui::Color32 {
    match status {
        OrderStatus::OnTrack => egui::Color32::from_rgb(34, 197, 94),
        OrderStatus::Shipped => egui::Color32::from_rgb(59, 130, 246),
        OrderStatus::ProductDelays => egui::Color32::from_rgb(245, 158, 11),
        OrderStatus::ShipmentDelay => egui::Color32::from_rgb(239, 68, 68),
    }
}

fn truncate_items(items: &str, max_chars: usize) -> String {
    if items.chars().count() <= max_chars {
        return items.to_string();
    }
    let truncated: String = items.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

fn today_display_date() -> String {
    chrono::Local::now().format("%b %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditTarget {
    /// Editing a staged draft; saving replaces it in the session.
    Draft { original_id: OrderId },
    /// Editing a committed order; saving goes through the upsert endpoint.
    Committed,
    /// Manual entry; saving commits directly, bypassing the staged list.
    New,
}

#[derive(Debug, Clone)]
struct EditDialog {
    title: String,
    target: EditTarget,
    id_input: String,
    supplier_input: String,
    items_input: String,
    expected_input: String,
    status: OrderStatus,
    context_input: String,
}

impl EditDialog {
    fn for_order(title: &str, target: EditTarget, order: &PurchaseOrder) -> Self {
        Self {
            title: title.to_string(),
            target,
            id_input: order.id.as_str().to_string(),
            supplier_input: order.supplier.clone(),
            items_input: order.items.clone(),
            expected_input: order.expected_date.clone().unwrap_or_default(),
            status: order.status,
            context_input: order.additional_context.clone().unwrap_or_default(),
        }
    }

    fn blank() -> Self {
        Self {
            title: "New Order".to_string(),
            target: EditTarget::New,
            id_input: String::new(),
            supplier_input: String::new(),
            items_input: String::new(),
            expected_input: String::new(),
            status: OrderStatus::OnTrack,
            context_input: String::new(),
        }
    }

    fn is_valid(&self) -> bool {
        !self.id_input.trim().is_empty() && !self.supplier_input.trim().is_empty()
    }

    fn to_order(&self) -> PurchaseOrder {
        let optional = |input: &str| {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        PurchaseOrder {
            id: OrderId::new(self.id_input.trim()),
            supplier: self.supplier_input.trim().to_string(),
            items: self.items_input.trim().to_string(),
            expected_date: optional(&self.expected_input),
            status: self.status,
            last_updated: today_display_date(),
            additional_context: optional(&self.context_input),
        }
    }
}

#[derive(Debug, Clone)]
enum ConfirmAction {
    DeleteOne(OrderId),
    DeleteMany(Vec<OrderId>),
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

enum DraftRowAction {
    Accept(OrderId),
    Edit(OrderId),
    Discard(OrderId),
}

enum TableRowAction {
    ToggleSelect(OrderId),
    SetStatus(OrderId, OrderStatus),
    Edit(OrderId),
    Delete(OrderId),
}

pub struct PoManagerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    orders: Vec<PurchaseOrder>,
    is_loading: bool,

    email_input: String,
    drafts: DraftSession,
    accepts_in_flight: HashSet<OrderId>,
    is_parsing: bool,

    search: String,
    status_filter: StatusFilter,
    selection: Selection,

    edit_dialog: Option<EditDialog>,
    confirm: Option<ConfirmAction>,

    status: String,
    banner: Option<StatusBanner>,

    settings: PersistedSettings,
    saved_settings: PersistedSettings,
    settings_open: bool,
    applied_text_scale: Option<f32>,
}

impl PoManagerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: PersistedSettings,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            orders: Vec::new(),
            is_loading: true,
            email_input: String::new(),
            drafts: DraftSession::new(),
            accepts_in_flight: HashSet::new(),
            is_parsing: false,
            search: String::new(),
            status_filter: StatusFilter::All,
            selection: Selection::default(),
            edit_dialog: None,
            confirm: None,
            status: "Backend worker starting...".to_string(),
            banner: None,
            saved_settings: settings.clone(),
            settings,
            settings_open: false,
            applied_text_scale: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::OrdersChanged { orders } => {
                    self.orders = orders;
                    self.selection.retain_known(&self.orders);
                }
                UiEvent::LoadingChanged { loading } => {
                    self.is_loading = loading;
                }
                UiEvent::Notice(message) => {
                    self.status = message;
                }
                UiEvent::ParseFinished(response) => {
                    self.is_parsing = false;
                    let drafts = response.parsed_data.len();
                    let warnings = response.errors.len();
                    self.drafts.parse_succeeded(response);
                    self.status = format!("Parsed {drafts} draft(s), {warnings} warning(s)");
                }
                UiEvent::ParseFailed(message) => {
                    self.is_parsing = false;
                    let err = UiError::from_message(UiErrorContext::Parse, message.clone());
                    self.drafts.parse_failed(message);
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    if err.wants_banner() {
                        self.banner = Some(StatusBanner {
                            message: self.status.clone(),
                        });
                    }
                }
                UiEvent::OrderSaved { id, origin } => {
                    self.accepts_in_flight.remove(&id);
                    if origin == SaveOrigin::Draft {
                        self.drafts.mark_committed(&id);
                    }
                }
                UiEvent::SaveFailed {
                    id,
                    origin: _,
                    message,
                } => {
                    // A failed draft accept stays staged for another try.
                    self.accepts_in_flight.remove(&id);
                    let err = UiError::from_message(UiErrorContext::Save, message);
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    if err.wants_banner() {
                        self.banner = Some(StatusBanner {
                            message: self.status.clone(),
                        });
                    }
                }
                UiEvent::Error(err) => {
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    if err.wants_banner() {
                        self.banner = Some(StatusBanner {
                            message: self.status.clone(),
                        });
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn queue_save(&mut self, order: PurchaseOrder, origin: SaveOrigin) {
        if origin == SaveOrigin::Draft {
            self.accepts_in_flight.insert(order.id.clone());
        }
        self.dispatch(BackendCommand::SaveOrder { order, origin });
    }

    fn accept_draft(&mut self, id: &OrderId) {
        match self.drafts.request_accept(id) {
            Some(AcceptDisposition::Commit(order)) => self.queue_save(order, SaveOrigin::Draft),
            // The overwrite prompt renders from the session's pending id.
            Some(AcceptDisposition::NeedsConfirmation(_)) | None => {}
        }
    }

    fn accept_all_drafts(&mut self) {
        let plan = self.drafts.plan_accept_all();
        let committing = plan.commit_now.len();
        for order in plan.commit_now {
            self.queue_save(order, SaveOrigin::Draft);
        }
        if plan.duplicates.len() > 1 {
            self.status = format!(
                "Accepting {committing} draft(s); {} duplicate(s) need individual confirmation",
                plan.duplicates.len()
            );
        }
    }

    fn submit_parse(&mut self) {
        let email_text = self.email_input.trim().to_string();
        if email_text.is_empty() {
            return;
        }
        self.is_parsing = true;
        self.drafts.begin_parse();
        self.dispatch(BackendCommand::ParseEmail { email_text });
    }

    fn load_email_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Email text", &["txt", "eml"])
            .pick_file()
        else {
            return;
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                self.email_input = contents;
                self.status = format!("Loaded {}", path.display());
            }
            Err(err) => {
                self.status = format!("Failed to read {}: {err}", path.display());
            }
        }
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.banner = None;
                            }
                        });
                    });
                });
            ui.add_space(6.0);
        }
    }

    fn show_parser_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Email Parser");
        ui.weak("Paste a supplier email to extract PO details.");
        ui.add_space(6.0);

        let input_enabled = !self.is_parsing;
        ui.add_enabled(
            input_enabled,
            egui::TextEdit::multiline(&mut self.email_input)
                .hint_text("Paste email content here...")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let can_parse = !self.is_parsing && !self.email_input.trim().is_empty();
            let parse_clicked = ui
                .add_enabled(can_parse, egui::Button::new("Parse email"))
                .clicked();
            if parse_clicked {
                self.submit_parse();
            }
            if self.is_parsing {
                ui.add(egui::Spinner::new());
                ui.weak("Parsing...");
            }
            if ui.button("Load file...").clicked() {
                self.load_email_file();
            }
            if ui.button("New order").clicked() {
                self.edit_dialog = Some(EditDialog::blank());
            }
        });

        if self.drafts.phase() == ParsePhase::Failed {
            if let Some(failure) = self.drafts.last_failure() {
                ui.add_space(4.0);
                ui.colored_label(
                    egui::Color32::from_rgb(239, 68, 68),
                    format!("Parse failed: {failure}"),
                );
            }
        }

        if !self.drafts.warnings().is_empty() {
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Warnings").strong());
            for warning in self.drafts.warnings() {
                ui.small(
                    egui::RichText::new(warning).color(egui::Color32::from_rgb(245, 158, 11)),
                );
            }
        }

        if !self.drafts.staged().is_empty() {
            ui.add_space(8.0);
            ui.separator();
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "Extracted drafts ({})",
                        self.drafts.staged().len()
                    ))
                    .strong(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Discard all").clicked() {
                        self.drafts.clear();
                        self.status = "Drafts discarded".to_string();
                    }
                    if self.drafts.staged().len() > 1 && ui.button("Accept all").clicked() {
                        self.accept_all_drafts();
                    }
                });
            });
            ui.add_space(4.0);
            self.show_staged_drafts(ui);
        }
    }

    fn show_staged_drafts(&mut self, ui: &mut egui::Ui) {
        let staged: Vec<PurchaseOrder> = self.drafts.staged().to_vec();
        let mut actions: Vec<DraftRowAction> = Vec::new();

        for draft in &staged {
            let in_flight = self.accepts_in_flight.contains(&draft.id);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(draft.id.as_str()).strong());
                    if self.drafts.is_duplicate(&draft.id) {
                        ui.colored_label(egui::Color32::from_rgb(245, 158, 11), "already exists");
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.colored_label(status_color(draft.status), draft.status.as_str());
                    });
                });
                ui.label(&draft.supplier);
                ui.small(truncate_items(&draft.items, 120));
                if let Some(expected) = &draft.expected_date {
                    ui.small(format!("Expected: {expected}"));
                }
                if let Some(context) = &draft.additional_context {
                    ui.small(egui::RichText::new(context).weak());
                }
                ui.horizontal(|ui| {
                    let accept = ui
                        .add_enabled(!in_flight, egui::Button::new("Accept"))
                        .clicked();
                    if accept {
                        actions.push(DraftRowAction::Accept(draft.id.clone()));
                    }
                    if in_flight {
                        ui.add(egui::Spinner::new());
                    }
                    if ui.button("Edit").clicked() {
                        actions.push(DraftRowAction::Edit(draft.id.clone()));
                    }
                    if ui.button("Discard").clicked() {
                        actions.push(DraftRowAction::Discard(draft.id.clone()));
                    }
                });
            });
            ui.add_space(4.0);
        }

        for action in actions {
            match action {
                DraftRowAction::Accept(id) => self.accept_draft(&id),
                DraftRowAction::Edit(id) => {
                    if let Some(draft) = staged.iter().find(|d| d.id == id) {
                        self.edit_dialog = Some(EditDialog::for_order(
                            "Edit Draft",
                            EditTarget::Draft {
                                original_id: id.clone(),
                            },
                            draft,
                        ));
                    }
                }
                DraftRowAction::Discard(id) => self.drafts.discard(&id),
            }
        }
    }

    fn show_table_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("id or supplier")
                    .desired_width(200.0),
            );

            let filter_label = match self.status_filter {
                StatusFilter::All => "All statuses".to_string(),
                StatusFilter::Only(status) => status.to_string(),
            };
            egui::ComboBox::from_id_salt("status_filter")
                .selected_text(filter_label)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.status_filter, StatusFilter::All, "All statuses");
                    for status in OrderStatus::ALL {
                        ui.selectable_value(
                            &mut self.status_filter,
                            StatusFilter::Only(status),
                            status.as_str(),
                        );
                    }
                });

            let refresh_clicked = ui
                .add_enabled(!self.is_loading, egui::Button::new("Refresh"))
                .clicked();
            if refresh_clicked {
                self.dispatch(BackendCommand::RefreshOrders);
            }
            if self.is_loading {
                ui.add(egui::Spinner::new());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !self.selection.is_empty() {
                    let label = format!("Delete selected ({})", self.selection.len());
                    if ui.button(label).clicked() {
                        self.confirm = Some(ConfirmAction::DeleteMany(self.selection.ids()));
                    }
                }
            });
        });
    }

    fn show_orders_table(&mut self, ui: &mut egui::Ui) {
        let filtered: Vec<PurchaseOrder> =
            filter_orders(&self.orders, &self.search, self.status_filter)
                .into_iter()
                .cloned()
                .collect();
        let filtered_refs: Vec<&PurchaseOrder> = filtered.iter().collect();
        let mut actions: Vec<TableRowAction> = Vec::new();
        let mut toggle_all = false;

        if filtered.is_empty() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                if self.orders.is_empty() {
                    ui.weak("No orders found. Parse an email to get started.");
                } else {
                    ui.weak("No orders match the current filter.");
                }
            });
        } else {
            egui::ScrollArea::vertical()
                .id_salt("orders_table")
                .show(ui, |ui| {
                    egui::Grid::new("orders_grid")
                        .striped(true)
                        .num_columns(8)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            let mut all_selected = self.selection.all_selected(&filtered_refs);
                            if ui.checkbox(&mut all_selected, "").changed() {
                                toggle_all = true;
                            }
                            ui.label(egui::RichText::new("PO ID").strong());
                            ui.label(egui::RichText::new("Supplier").strong());
                            ui.label(egui::RichText::new("Items").strong());
                            ui.label(egui::RichText::new("Expected").strong());
                            ui.label(egui::RichText::new("Status").strong());
                            ui.label(egui::RichText::new("Updated").strong());
                            ui.label("");
                            ui.end_row();

                            for order in &filtered {
                                let mut selected = self.selection.contains(&order.id);
                                if ui.checkbox(&mut selected, "").changed() {
                                    actions.push(TableRowAction::ToggleSelect(order.id.clone()));
                                }
                                ui.label(egui::RichText::new(order.id.as_str()).strong());
                                ui.label(&order.supplier);
                                ui.label(truncate_items(&order.items, 48))
                                    .on_hover_text(&order.items);
                                ui.label(order.expected_date.as_deref().unwrap_or("N/A"));

                                let mut status = order.status;
                                egui::ComboBox::from_id_salt(("row_status", order.id.as_str()))
                                    .selected_text(
                                        egui::RichText::new(status.as_str())
                                            .color(status_color(status)),
                                    )
                                    .show_ui(ui, |ui| {
                                        for candidate in OrderStatus::ALL {
                                            ui.selectable_value(
                                                &mut status,
                                                candidate,
                                                candidate.as_str(),
                                            );
                                        }
                                    });
                                if status != order.status {
                                    actions.push(TableRowAction::SetStatus(
                                        order.id.clone(),
                                        status,
                                    ));
                                }

                                ui.label(&order.last_updated);
                                ui.horizontal(|ui| {
                                    if ui.button("Edit").clicked() {
                                        actions.push(TableRowAction::Edit(order.id.clone()));
                                    }
                                    if ui.button("Delete").clicked() {
                                        actions.push(TableRowAction::Delete(order.id.clone()));
                                    }
                                });
                                ui.end_row();
                            }
                        });
                });
        }

        if toggle_all {
            self.selection.toggle_all(&filtered_refs);
        }
        for action in actions {
            match action {
                TableRowAction::ToggleSelect(id) => self.selection.toggle(&id),
                TableRowAction::SetStatus(id, status) => {
                    self.dispatch(BackendCommand::UpdateStatus { id, status });
                }
                TableRowAction::Edit(id) => {
                    if let Some(order) = self.orders.iter().find(|o| o.id == id) {
                        self.edit_dialog =
                            Some(EditDialog::for_order("Edit Order", EditTarget::Committed, order));
                    }
                }
                TableRowAction::Delete(id) => {
                    self.confirm = Some(ConfirmAction::DeleteOne(id));
                }
            }
        }
    }

    fn show_edit_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.edit_dialog.take() else {
            return;
        };
        let mut open = true;
        let mut saved = false;

        egui::Window::new(dialog.title.clone())
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.weak("Make changes to the purchase order details below.");
                ui.add_space(6.0);
                egui::Grid::new("edit_order_form")
                    .num_columns(2)
                    .spacing([10.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("PO ID");
                        ui.add(
                            egui::TextEdit::singleline(&mut dialog.id_input)
                                .desired_width(240.0),
                        );
                        ui.end_row();

                        ui.label("Supplier");
                        ui.add(
                            egui::TextEdit::singleline(&mut dialog.supplier_input)
                                .desired_width(240.0),
                        );
                        ui.end_row();

                        ui.label("Status");
                        egui::ComboBox::from_id_salt("edit_order_status")
                            .selected_text(dialog.status.as_str())
                            .show_ui(ui, |ui| {
                                for status in OrderStatus::ALL {
                                    ui.selectable_value(&mut dialog.status, status, status.as_str());
                                }
                            });
                        ui.end_row();

                        ui.label("Items");
                        ui.add(
                            egui::TextEdit::multiline(&mut dialog.items_input)
                                .desired_rows(2)
                                .desired_width(240.0),
                        );
                        ui.end_row();

                        ui.label("Expected");
                        ui.add(
                            egui::TextEdit::singleline(&mut dialog.expected_input)
                                .hint_text("e.g. Jan 15, 2024")
                                .desired_width(240.0),
                        );
                        ui.end_row();

                        ui.label("Context");
                        ui.add(
                            egui::TextEdit::multiline(&mut dialog.context_input)
                                .hint_text("Optional notes...")
                                .desired_rows(2)
                                .desired_width(240.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let save = ui
                        .add_enabled(dialog.is_valid(), egui::Button::new("Save changes"))
                        .clicked();
                    if save {
                        saved = true;
                    }
                });
            });

        if saved {
            let order = dialog.to_order();
            match dialog.target {
                EditTarget::Draft { ref original_id } => {
                    self.drafts.replace(original_id, order);
                    self.status = "Draft updated".to_string();
                }
                EditTarget::Committed | EditTarget::New => {
                    self.queue_save(order, SaveOrigin::Form);
                }
            }
        } else if open {
            self.edit_dialog = Some(dialog);
        }
    }

    fn show_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(confirm) = self.confirm.clone() else {
            return;
        };
        let message = match &confirm {
            ConfirmAction::DeleteOne(id) => {
                format!("Delete order {id}? This cannot be undone.")
            }
            ConfirmAction::DeleteMany(ids) => {
                format!("Delete {} selected order(s)? This cannot be undone.", ids.len())
            }
        };

        let mut keep_open = true;
        egui::Window::new("Confirm deletion")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        match confirm.clone() {
                            ConfirmAction::DeleteOne(id) => {
                                self.selection.remove(&id);
                                self.dispatch(BackendCommand::DeleteOrder { id });
                            }
                            ConfirmAction::DeleteMany(ids) => {
                                self.selection.clear();
                                self.dispatch(BackendCommand::DeleteOrders { ids });
                            }
                        }
                        keep_open = false;
                    }
                    if ui.button("Cancel").clicked() {
                        keep_open = false;
                    }
                });
            });

        if !keep_open {
            self.confirm = None;
        }
    }

    fn show_overwrite_dialog(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.drafts.pending_overwrite().cloned() else {
            return;
        };

        egui::Window::new("Overwrite existing order?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(format!(
                    "Order {pending} already exists in the store. Accepting this draft will \
                     overwrite the stored order."
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Overwrite").clicked() {
                        if let Some(order) = self.drafts.confirm_overwrite() {
                            self.queue_save(order, SaveOrigin::Draft);
                        }
                    }
                    if ui.button("Keep existing").clicked() {
                        self.drafts.cancel_overwrite();
                    }
                });
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }
        let mut open = self.settings_open;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Backend API");
                ui.small(&self.settings.api_url);
                ui.small("Restart the app (or pass --api-url) to change the backend.");
                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.settings.text_scale, 0.8..=1.4)
                        .text("Text scale")
                        .step_by(0.05),
                );
            });
        self.settings_open = open;

        if self.settings != self.saved_settings {
            self.settings.save();
            self.saved_settings = self.settings.clone();
        }
    }
}

impl eframe::App for PoManagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let scale = self.settings.clamped_text_scale();
        if self.applied_text_scale != Some(scale) {
            ctx.set_zoom_factor(scale);
            self.applied_text_scale = Some(scale);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("PO Manager");
                ui.weak("Track and manage supplier orders.");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.settings_open = true;
                    }
                });
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
            });
        });

        egui::SidePanel::left("parser_panel")
            .resizable(true)
            .default_width(380.0)
            .min_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("parser_scroll")
                    .show(ui, |ui| {
                        self.show_parser_panel(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_banner(ui);
            ui.heading("Purchase Orders");
            ui.add_space(4.0);
            self.show_table_controls(ui);
            ui.add_space(6.0);
            ui.separator();
            self.show_orders_table(ui);
        });

        self.show_edit_dialog(ctx);
        self.show_confirm_dialog(ctx);
        self.show_overwrite_dialog(ctx);
        self.show_settings_window(ctx);

        // Backend events arrive from the worker thread; poll for them even
        // when the user is idle.
        ctx.request_repaint_after(std::time::Duration::from_millis(200));
    }
}
