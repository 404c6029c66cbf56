/*
 * Utility for locating the application's configuration directory. Kept in
 * one place so every part of the core resolves the same platform-specific
 * location.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Returns the platform-specific local configuration directory for the
 * application, creating it when missing. `None` means no suitable location
 * could be determined or created.
 */
pub fn get_app_config_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathUtils: Failed to create config directory {:?}: {}",
                    config_path,
                    e
                );
                return None;
            }
            log::debug!("PathUtils: Created config directory {:?}", config_path);
        }
        Some(config_path.to_path_buf())
    })
}
