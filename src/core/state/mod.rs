mod app_state;
mod settings;

pub use app_state::AppState;
pub use settings::Settings;
