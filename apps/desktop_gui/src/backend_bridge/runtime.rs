//! Backend worker: a dedicated thread running its own tokio runtime, owning
//! the order store and pumping store events back to the UI thread.

use std::thread;

use client_core::{OrderStore, OrdersApi, StoreEvent};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(api_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let api = match OrdersApi::new(&api_url) {
                Ok(api) => api,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("invalid backend URL {api_url:?}: {err:#}"),
                    )));
                    tracing::error!("invalid backend URL {api_url:?}: {err:#}");
                    return;
                }
            };
            let store = OrderStore::new(api);

            let mut events = store.subscribe();
            let event_ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    let event = match event {
                        StoreEvent::OrdersChanged { orders } => UiEvent::OrdersChanged { orders },
                        StoreEvent::LoadingChanged { loading } => {
                            UiEvent::LoadingChanged { loading }
                        }
                        StoreEvent::Notice(message) => UiEvent::Notice(message),
                        StoreEvent::Failure(message) => {
                            UiEvent::Error(UiError::from_message(UiErrorContext::General, message))
                        }
                    };
                    if event_ui_tx.send(event).is_err() {
                        break;
                    }
                }
            });

            let _ = ui_tx.try_send(UiEvent::Notice("Backend worker ready".to_string()));

            // Initial load; failure is surfaced through the event pump.
            let _ = store.refresh().await;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::RefreshOrders => {
                        let _ = store.refresh().await;
                    }
                    BackendCommand::SaveOrder { order, origin } => {
                        let id = order.id.clone();
                        match store.save_order(order).await {
                            Ok(saved) => {
                                let _ = ui_tx.send(UiEvent::OrderSaved {
                                    id: saved.id,
                                    origin,
                                });
                            }
                            Err(err) => {
                                let _ = ui_tx.send(UiEvent::SaveFailed {
                                    id,
                                    origin,
                                    message: format!("{err:#}"),
                                });
                            }
                        }
                    }
                    BackendCommand::UpdateStatus { id, status } => {
                        store.update_status(&id, status).await;
                    }
                    BackendCommand::DeleteOrder { id } => {
                        store.delete_order(&id).await;
                    }
                    BackendCommand::DeleteOrders { ids } => {
                        store.delete_orders(&ids).await;
                    }
                    BackendCommand::ParseEmail { email_text } => {
                        match store.parse_email(&email_text).await {
                            Ok(response) => {
                                let _ = ui_tx.send(UiEvent::ParseFinished(response));
                            }
                            Err(err) => {
                                let _ = ui_tx.send(UiEvent::ParseFailed(format!("{err:#}")));
                            }
                        }
                    }
                }
            }
        });
    });
}
