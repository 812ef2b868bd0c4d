use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Radiolens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "radiolens=info".to_string()
}

/// Get the application data directory
/// ~/Radiolens/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Radiolens")
}

/// Analysis history database path.
pub fn database_path() -> PathBuf {
    app_data_dir().join("analyses.db")
}
