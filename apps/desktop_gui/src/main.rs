use clap::Parser;

mod backend_bridge;
mod controller;
mod settings;
mod ui;

#[derive(Parser, Debug)]
#[command(about = "Purchase-order manager desktop app")]
struct Args {
    /// Backend API prefix, e.g. http://127.0.0.1:8000/api. Overrides the
    /// persisted setting for this launch.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut persisted = settings::PersistedSettings::load();
    if let Some(api_url) = args.api_url {
        persisted.api_url = api_url;
    }

    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(64);
    let (ui_tx, ui_rx) = crossbeam_channel::bounded(256);
    backend_bridge::runtime::launch(persisted.api_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PO Manager")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "PO Manager",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::PoManagerApp::new(cmd_tx, ui_rx, persisted)))),
    )
}
