mod app;
mod catalog;
mod controller;
mod event;
mod history;
mod rewrite;
mod settings;
mod theme;

use app::PromptsmithApp;
use controller::Controller;
use eframe::egui;
use history::store::HistoryStore;
use rewrite::{GeminiService, RewriteClient};
use settings::Settings;
use std::sync::{mpsc, Arc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env();
    let store = HistoryStore::load(&settings.history_path);
    log::info!(
        "history file {} ({} entries)",
        store.path().display(),
        store.history().len()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("promptsmith-runtime")
        .build()?;

    let (tx, rx) = mpsc::channel();
    let service = Arc::new(GeminiService::new(settings.api_key, settings.api_base));
    let rewriter = RewriteClient::new(service, runtime.handle().clone(), tx);
    let controller = Controller::new(rewriter, store);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PromptMaster")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PromptMaster",
        native_options,
        Box::new(move |creation_context| {
            Ok(Box::new(PromptsmithApp::new(
                rx,
                controller,
                &creation_context.egui_ctx,
            )))
        }),
    )?;

    Ok(())
}
