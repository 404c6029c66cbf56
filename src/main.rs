mod app_logic;
mod core;
mod ui;

use crate::app_logic::SessionLogic;
use crate::core::{
    ConfigManagerOperations, CoreConfigManager, CoreImagePoolProvider, CoreSessionStore,
    DefaultLibrary,
};
use crate::ui::i18n::Locale;
use crate::ui::CreativeWriterApp;

use simplelog::{ColorChoice, Config, LevelFilter, SimpleLogger, TermLogger, TerminalMode};
use std::sync::Arc;

const APP_NAME: &str = "CreativeWriter";

fn init_logging() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(level, Config::default());
    }
}

fn main() -> eframe::Result<()> {
    init_logging();
    log::info!("{APP_NAME} starting");

    let config: Arc<dyn ConfigManagerOperations> = Arc::new(CoreConfigManager::new());
    let locale = match config.load_preferences(APP_NAME) {
        Ok(prefs) => prefs
            .language
            .as_deref()
            .and_then(Locale::from_tag)
            .unwrap_or_default(),
        Err(e) => {
            log::warn!("Could not load preferences, using defaults: {e}");
            Locale::default()
        }
    };

    let library = Arc::new(DefaultLibrary::bundled());
    let logic = SessionLogic::new(
        APP_NAME.to_string(),
        Arc::new(CoreSessionStore::new()),
        Arc::new(CoreImagePoolProvider::new(library)),
        config,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title(locale.strings().window_title),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(CreativeWriterApp::new(logic, locale)))),
    )
}
