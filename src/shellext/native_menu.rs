use crate::menu::{MenuError, MenuHost};
use windows::Win32::Foundation::TRUE;
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, HMENU, InsertMenuItemW, MENUITEMINFOW, MF_STRING,
    MFS_ENABLED, MFT_STRING, MIIM_FTYPE, MIIM_STATE, MIIM_STRING, MIIM_SUBMENU,
};
use windows::core::{HSTRING, PWSTR};

/// The context menu explorer handed to `QueryContextMenu`.
pub struct NativeMenu {
    menu: HMENU,
}

impl NativeMenu {
    pub fn new(menu: HMENU) -> Self {
        Self { menu }
    }
}

fn native(e: windows::core::Error) -> MenuError {
    MenuError::Native(e.code().0 as u32)
}

impl MenuHost for NativeMenu {
    type Submenu = HMENU;

    fn create_submenu(&mut self) -> Result<HMENU, MenuError> {
        unsafe { CreatePopupMenu() }.map_err(native)
    }

    fn append_item(&mut self, submenu: HMENU, id: u32, label: &str) -> Result<(), MenuError> {
        let text = HSTRING::from(label);
        unsafe { AppendMenuW(submenu, MF_STRING, id as usize, &text) }.map_err(native)
    }

    fn insert_parent(&mut self, position: u32, label: &str, submenu: HMENU) -> Result<(), MenuError> {
        // The menu copies the text during the call.
        let text = HSTRING::from(label);
        let item = MENUITEMINFOW {
            cbSize: std::mem::size_of::<MENUITEMINFOW>() as u32,
            fMask: MIIM_SUBMENU | MIIM_STRING | MIIM_FTYPE | MIIM_STATE,
            fType: MFT_STRING,
            fState: MFS_ENABLED,
            hSubMenu: submenu,
            dwTypeData: PWSTR(text.as_ptr() as *mut u16),
            ..Default::default()
        };

        unsafe { InsertMenuItemW(self.menu, position, TRUE, &item) }.map_err(native)
    }

    fn destroy_submenu(&mut self, submenu: HMENU) {
        if let Err(e) = unsafe { DestroyMenu(submenu) } {
            tracing::warn!(target: "shellext::context_menu", error = %e, "Failed to destroy submenu");
        }
    }
}
