pub mod command;
pub mod config;
pub mod eligibility;
pub mod handler;
pub mod keys;
pub mod launcher;
pub mod logging;
pub mod menu;
pub mod module;
pub mod selection;

#[cfg(windows)]
mod dll_export;
#[cfg(windows)]
pub mod shellext;

#[cfg(all(windows, not(target_pointer_width = "64")))]
compile_error!("blinkenlights-shellext must be built for 64-bit targets");

// Re-export commonly used types
pub use command::{MenuCommand, TargetFormat};
pub use config::{ConfigError, ConfigStore, ConverterConfig};
pub use handler::SelectionMenuHandler;
pub use launcher::{ConverterLauncher, LaunchError, Notifier, ProcessSpawner};
pub use logging::LogConfig;
pub use selection::{CaptureError, Selection};

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

/// Pick the UI language once per process from the user's locale.
pub fn init_locale() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let supported = available_locales!();
    let chosen = supported
        .iter()
        .find(|l| l.eq_ignore_ascii_case(&locale))
        .or_else(|| {
            let language = locale.split(['-', '_']).next().unwrap_or_default();
            supported
                .iter()
                .find(|l| l.split('-').next().unwrap_or_default().eq_ignore_ascii_case(language))
        })
        .map(|l| l.to_string())
        .unwrap_or_else(|| "en".to_string());

    rust_i18n::set_locale(&chosen);
    tracing::debug!(target: "main", system = %locale, chosen = %chosen, "UI locale selected");
}
