// Context menu handler for Windows Explorer
// Implements IShellExtInit + IContextMenu over the platform-neutral SelectionMenuHandler
use std::sync::{Mutex, MutexGuard};

use windows::{
    Win32::{
        Foundation::*,
        System::{Com::*, Registry::HKEY},
        UI::{
            Shell::{Common::ITEMIDLIST, *},
            WindowsAndMessaging::HMENU,
        },
    },
    core::*,
};

use super::{DialogQueue, NativeMenu, capture_selection};
use crate::config::RegistryStore;
use crate::handler::{AdmissionError, SelectionMenuHandler};
use crate::launcher::{ConverterLauncher, DetachedSpawner};
use crate::menu::MenuError;
use crate::module::ObjectGuard;
use crate::selection::CaptureError;

#[implement(IShellExtInit, IContextMenu)]
pub struct ConvertContextMenu {
    handler: Mutex<SelectionMenuHandler>,
    _guard: ObjectGuard,
}

impl ConvertContextMenu {
    pub fn new() -> Self {
        let launcher = ConverterLauncher::new(Box::new(RegistryStore), Box::new(DetachedSpawner));
        Self {
            handler: Mutex::new(SelectionMenuHandler::new(launcher)),
            _guard: ObjectGuard::new(),
        }
    }

    fn handler(&self) -> Result<MutexGuard<'_, SelectionMenuHandler>> {
        self.handler.lock().map_err(|_| Error::from(E_UNEXPECTED))
    }
}

impl Default for ConvertContextMenu {
    fn default() -> Self {
        Self::new()
    }
}

/// The slot count is the code field of a success HRESULT. The generated
/// signature only lets a non-S_OK value out through Err, and the vtable shim
/// returns its code unchanged.
fn slots_result(used: u32) -> Result<()> {
    if used == 0 {
        Ok(())
    } else {
        Err(Error::from(HRESULT(used as i32)))
    }
}

impl IShellExtInit_Impl for ConvertContextMenu_Impl {
    fn Initialize(
        &self,
        _pidlfolder: *const ITEMIDLIST,
        pdtobj: Option<&IDataObject>,
        _hkeyprogid: HKEY,
    ) -> Result<()> {
        let captured = match pdtobj {
            Some(data_object) => capture_selection(data_object),
            None => Err(CaptureError::MissingDataObject),
        };

        // Any failure here keeps the menu hidden.
        match self.handler()?.initialize(captured) {
            Ok(()) => Ok(()),
            Err(AdmissionError::Capture(CaptureError::MissingDataObject))
            | Err(AdmissionError::Rejected(_)) => Err(Error::from(E_INVALIDARG)),
            Err(e) => {
                tracing::debug!(target: "shellext::context_menu", error = %e, "Initialize failed");
                Err(Error::from(E_FAIL))
            }
        }
    }
}

impl IContextMenu_Impl for ConvertContextMenu_Impl {
    fn QueryContextMenu(
        &self,
        hmenu: HMENU,
        indexmenu: u32,
        idcmdfirst: u32,
        idcmdlast: u32,
        uflags: u32,
    ) -> Result<()> {
        tracing::trace!(target: "shellext::context_menu", indexmenu, idcmdfirst, idcmdlast, uflags, "QueryContextMenu called");

        let mut menu = NativeMenu::new(hmenu);
        let used = self
            .handler()?
            .query_menu(&mut menu, indexmenu, idcmdfirst, idcmdlast, uflags)
            .map_err(|MenuError::Native(code)| Error::from(HRESULT(code as i32)))?;

        slots_result(used)
    }

    fn InvokeCommand(&self, pici: *const CMINVOKECOMMANDINFO) -> Result<()> {
        let Some(info) = (unsafe { pici.as_ref() }) else {
            return Err(Error::from(E_INVALIDARG));
        };

        // A verb is either a pointer to a string or an offset in the low word.
        let verb = info.lpVerb.0 as usize;
        if verb >> 16 != 0 {
            tracing::debug!(target: "shellext::context_menu", "String verbs are not supported");
            return Err(Error::from(E_FAIL));
        }

        let dialogs = DialogQueue::default();
        let result = self.handler()?.invoke((verb & 0xFFFF) as u32, &dialogs);
        dialogs.show(info.hwnd);

        result.map_err(|e| {
            tracing::debug!(target: "shellext::context_menu", error = %e, "InvokeCommand rejected");
            Error::from(E_FAIL)
        })
    }

    fn GetCommandString(
        &self,
        _idcmd: usize,
        _utype: u32,
        _preserved: *const u32,
        _pszname: PSTR,
        _cchmax: u32,
    ) -> Result<()> {
        // No help text or canonical verb is exposed.
        Err(Error::from(E_INVALIDARG))
    }
}
