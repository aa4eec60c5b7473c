use eframe::egui;
use social_charts::app::SocialChartsApp;
use social_charts::config::AppConfig;
use social_charts::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(AppConfig::from_env());
    state.load_startup_files();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 560.0])
            .with_min_inner_size([600.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Social Charts – Likes by Age, Platform and Day",
        options,
        Box::new(|_cc| Ok(Box::new(SocialChartsApp::new(state)))),
    )
}
