//! Fixed identity of the extension: COM class id, registry locations and names.
//! Shared by the handler, the DLL exports and self-registration.

/// CLSID of the context menu handler as written into the registry.
pub const CLSID_CONVERT_MENU_STR: &str = "{6F4B3E2A-9C1D-4E58-A7B2-3D0C5E8F1A94}";

/// Same CLSID as a GUID (for the DLL implementation).
#[cfg(windows)]
pub const CLSID_CONVERT_MENU: windows::core::GUID =
    windows::core::GUID::from_u128(0x6f4b3e2a_9c1d_4e58_a7b2_3d0c5e8f1a94);

/// Key written by the converter's installer (under HKEY_LOCAL_MACHINE).
pub const CONVERTER_KEY: &str = "Software\\Blinkenlights Image Converter";

/// Value under [`CONVERTER_KEY`] holding the converter executable path.
pub const EXECUTABLE_PATH_VALUE: &str = "ExecutablePath";

/// Friendly name shown in registry under CLSID.
pub const FRIENDLY_NAME: &str = "Blinkenlights Image Converter Context Menu";

/// Subkey name under `*\shellex\ContextMenuHandlers`.
pub const HANDLER_NAME: &str = "BlinkenlightsImageConverter";

/// Root of per-machine class registrations.
pub const CLASSES_ROOT: &str = "Software\\Classes";

/// Shell extensions explorer is allowed to load when the approval list is enforced.
pub const APPROVED_EXTENSIONS_KEY: &str =
    "Software\\Microsoft\\Windows\\CurrentVersion\\Shell Extensions\\Approved";

/// `Software\Classes\CLSID\{CLSID}` (under HKEY_LOCAL_MACHINE).
pub fn clsid_key_path() -> String {
    format!("{}\\CLSID\\{}", CLASSES_ROOT, CLSID_CONVERT_MENU_STR)
}

/// Binding that makes explorer load the handler for every file type.
pub fn handler_key_path() -> String {
    format!(
        "{}\\*\\shellex\\ContextMenuHandlers\\{}",
        CLASSES_ROOT, HANDLER_NAME
    )
}
