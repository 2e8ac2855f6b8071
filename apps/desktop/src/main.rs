use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::OrdersApi;
use shared::domain::{OrderId, OrderStatus};

#[derive(Parser, Debug)]
#[command(about = "Purchase-order manager command line")]
struct Args {
    /// Backend API prefix, e.g. http://127.0.0.1:8000/api
    #[arg(long, default_value = "http://127.0.0.1:8000/api")]
    api_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored orders.
    List,
    /// Parse an email text file into order drafts (nothing is saved).
    Parse {
        /// Path to a file holding raw supplier email text.
        file: PathBuf,
    },
    /// Set the status of one order.
    SetStatus {
        id: String,
        /// One of: On Track, Shipped, Product Delays, Shipment Delay.
        status: String,
    },
    /// Delete one order.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let api = OrdersApi::new(&args.api_url)?;

    match args.command {
        Command::List => {
            let orders = api.list().await?;
            if orders.is_empty() {
                println!("No orders stored.");
            }
            for order in orders {
                println!(
                    "{}\t{}\t{}\t{}",
                    order.id, order.status, order.supplier, order.items
                );
            }
        }
        Command::Parse { file } => {
            let email_text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let response = api.parse_email(&email_text).await?;
            for warning in &response.errors {
                eprintln!("warning: {warning}");
            }
            for draft in &response.parsed_data {
                let marker = if response.existing_ids.contains(&draft.id) {
                    " (already exists)"
                } else {
                    ""
                };
                println!("{}{}\t{}\t{}", draft.id, marker, draft.supplier, draft.items);
            }
            println!(
                "{} draft(s), {} warning(s)",
                response.parsed_data.len(),
                response.errors.len()
            );
        }
        Command::SetStatus { id, status } => {
            let status: OrderStatus = status.parse()?;
            let updated = api.update_status(&OrderId::new(id), status).await?;
            println!("{} -> {}", updated.id, updated.status);
        }
        Command::Delete { id } => {
            let id = OrderId::new(id);
            api.delete(&id).await?;
            println!("Order {id} deleted");
        }
    }

    Ok(())
}
