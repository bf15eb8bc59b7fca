use eframe::NativeOptions;
use log::{error, info, warn};

use course_tracker::app::CourseTrackerApp;
use course_tracker::config::AppConfig;

fn main() -> Result<(), eframe::Error> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Course Tracker");

    let config = match AppConfig::locate() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not resolve the config directory: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.ensure_exists() {
        // Saves re-attempt directory creation, so this is not fatal.
        warn!("Could not create the config directory: {}", e);
    }

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("Course Tracker"),
        ..Default::default()
    };

    eframe::run_native(
        "Course Tracker",
        options,
        Box::new(|cc| Box::new(CourseTrackerApp::new(cc, config))),
    )
}
