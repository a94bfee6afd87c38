//! Main application entry point.

use workslate_core::config::EditorConfig;

fn main() {
    env_logger::init();
    log::info!("Starting Workslate");

    let config = EditorConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {e}");
        EditorConfig::default()
    });
    workslate_app::ShortcutRegistry::print_all();

    if let Err(e) = workslate_app::App::run(&config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
