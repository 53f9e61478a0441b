pub mod loader;
pub mod schema;

pub use loader::{load_settings, load_settings_from_str, ENV_DEPENDENCY_TABLE, ENV_WORKING_DIR};
pub use schema::Settings;
