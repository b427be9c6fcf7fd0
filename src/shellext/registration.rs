use crate::keys::{
    APPROVED_EXTENSIONS_KEY, CLSID_CONVERT_MENU_STR, FRIENDLY_NAME, clsid_key_path,
    handler_key_path,
};
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;
use winreg::RegKey;
use winreg::enums::HKEY_LOCAL_MACHINE;

/// Register the handler machine-wide for every file type.
///
/// - HKLM\Software\Classes\CLSID\{CLSID}\(Default) = friendly name
/// - HKLM\Software\Classes\CLSID\{CLSID}\InprocServer32\(Default) = DLL path
/// - HKLM\Software\Classes\*\shellex\ContextMenuHandlers\<handler> = {CLSID}
/// - HKLM\...\Shell Extensions\Approved\{CLSID} = friendly name
pub fn register(dll_path: &Path) -> Result<()> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);

    let (clsid, _) = hklm
        .create_subkey(clsid_key_path())
        .context("Failed to create CLSID key")?;
    clsid.set_value("", &FRIENDLY_NAME)?;

    let (server, _) = clsid
        .create_subkey("InprocServer32")
        .context("Failed to create InprocServer32 key")?;
    server.set_value("", &dll_path.as_os_str())?;
    server.set_value("ThreadingModel", &"Apartment")?;

    let (handler, _) = hklm
        .create_subkey(handler_key_path())
        .context("Failed to create context menu handler key")?;
    handler.set_value("", &CLSID_CONVERT_MENU_STR)?;

    let (approved, _) = hklm
        .create_subkey(APPROVED_EXTENSIONS_KEY)
        .context("Failed to open approved shell extensions key")?;
    approved.set_value(CLSID_CONVERT_MENU_STR, &FRIENDLY_NAME)?;

    tracing::info!(target: "dll", path = %dll_path.display(), "Context menu handler registered");
    Ok(())
}

/// Remove everything [`register`] wrote. Missing keys are not an error.
pub fn unregister() -> Result<()> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);

    ignore_missing(hklm.delete_subkey_all(handler_key_path()))
        .context("Failed to delete context menu handler key")?;
    ignore_missing(hklm.delete_subkey_all(clsid_key_path())).context("Failed to delete CLSID key")?;

    if let Ok(approved) = hklm.open_subkey_with_flags(APPROVED_EXTENSIONS_KEY, winreg::enums::KEY_SET_VALUE) {
        ignore_missing(approved.delete_value(CLSID_CONVERT_MENU_STR))
            .context("Failed to delete approval entry")?;
    }

    tracing::info!(target: "dll", "Context menu handler unregistered");
    Ok(())
}

fn ignore_missing(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
