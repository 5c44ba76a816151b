use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Saúde Mais";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Age at or above which a patient is admitted as a priority (elderly) case.
/// Fixed at registration; never recomputed afterwards.
pub const PRIORITY_AGE: u32 = 60;

/// Minimum digit count for a registration phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Default log filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    "triagem=info".to_string()
}

/// Get the application data directory
/// ~/SaudeMais/ on all platforms (user-visible, kiosk operators back it up by hand)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("SaudeMais")
}

/// Path of the intake database
pub fn database_path() -> PathBuf {
    app_data_dir().join("triagem.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("SaudeMais"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("triagem.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn priority_threshold_is_sixty() {
        assert_eq!(PRIORITY_AGE, 60);
    }
}
