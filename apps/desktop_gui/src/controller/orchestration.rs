//! Command orchestration from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::RefreshOrders => "refresh_orders",
        BackendCommand::SaveOrder { .. } => "save_order",
        BackendCommand::UpdateStatus { .. } => "update_status",
        BackendCommand::DeleteOrder { .. } => "delete_order",
        BackendCommand::DeleteOrders { .. } => "delete_orders",
        BackendCommand::ParseEmail { .. } => "parse_email",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "Command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker disconnected; restart the app".to_string();
        }
    }
}
