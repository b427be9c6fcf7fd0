use std::ffi::c_void;
use std::path::PathBuf;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use windows::Win32::Foundation::{
    BOOL, CLASS_E_CLASSNOTAVAILABLE, E_NOINTERFACE, E_POINTER, HINSTANCE, HMODULE, S_FALSE, S_OK,
    TRUE,
};
use windows::Win32::System::Com::IClassFactory;
use windows::Win32::System::LibraryLoader::GetModuleFileNameW;
use windows::Win32::System::SystemServices::DLL_PROCESS_ATTACH;
use windows::core::{GUID, HRESULT, IUnknown, Interface};

use crate::keys::CLSID_CONVERT_MENU;
use crate::logging;
use crate::module;
use crate::shellext::{ConvertContextMenuFactory, registration};

const SELFREG_E_CLASS: HRESULT = HRESULT(0x80040201u32 as i32);

static MODULE_HANDLE: AtomicPtr<c_void> = AtomicPtr::new(null_mut());

fn module_path() -> Option<PathBuf> {
    let handle = MODULE_HANDLE.load(Ordering::SeqCst);
    if handle.is_null() {
        return None;
    }

    let handle = HMODULE(handle);
    let mut buffer = vec![0u16; 32 * 1024];
    let len = unsafe { GetModuleFileNameW(handle, &mut buffer) } as usize;
    if len == 0 || len >= buffer.len() {
        return None;
    }
    Some(PathBuf::from(String::from_utf16_lossy(&buffer[..len])))
}

// ---- DLL exports ----
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(module: HINSTANCE, reason: u32, _reserved: *mut c_void) -> BOOL {
    if reason == DLL_PROCESS_ATTACH {
        MODULE_HANDLE.store(module.0, Ordering::SeqCst);
    }
    TRUE
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllGetClassObject(
    rclsid: *const GUID,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    unsafe {
        if ppv.is_null() {
            return E_POINTER;
        }
        *ppv = null_mut();

        if rclsid.is_null() || *rclsid != CLSID_CONVERT_MENU {
            return CLASS_E_CLASSNOTAVAILABLE;
        }

        logging::init_once();
        tracing::trace!(target: "dll", "DllGetClassObject called");

        let cf: IClassFactory = ConvertContextMenuFactory.into();

        if riid.is_null() {
            return E_POINTER;
        }
        if *riid == IClassFactory::IID || *riid == IUnknown::IID {
            *ppv = cf.into_raw();
            S_OK
        } else {
            E_NOINTERFACE
        }
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllCanUnloadNow() -> HRESULT {
    if module::can_unload() { S_OK } else { S_FALSE }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllRegisterServer() -> HRESULT {
    logging::init_once();
    let Some(path) = module_path() else {
        tracing::error!(target: "dll", "Cannot resolve module path");
        return SELFREG_E_CLASS;
    };

    match registration::register(&path) {
        Ok(()) => S_OK,
        Err(e) => {
            tracing::error!(target: "dll", error = ?e, "Registration failed");
            SELFREG_E_CLASS
        }
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllUnregisterServer() -> HRESULT {
    logging::init_once();
    match registration::unregister() {
        Ok(()) => S_OK,
        Err(e) => {
            tracing::error!(target: "dll", error = ?e, "Unregistration failed");
            SELFREG_E_CLASS
        }
    }
}
