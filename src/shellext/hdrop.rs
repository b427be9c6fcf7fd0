use crate::selection::{CaptureError, Selection};
use std::path::PathBuf;
use widestring::U16Str;
use windows::Win32::System::Com::{DVASPECT_CONTENT, FORMATETC, IDataObject, STGMEDIUM, TYMED_HGLOBAL};
use windows::Win32::System::Memory::{GlobalLock, GlobalUnlock};
use windows::Win32::System::Ole::{CF_HDROP, ReleaseStgMedium};
use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

/// Pull the `CF_HDROP` file list out of the shell's data object.
/// Any unreadable entry fails the whole capture.
pub fn capture_selection(data_object: &IDataObject) -> Result<Selection, CaptureError> {
    let format = FORMATETC {
        cfFormat: CF_HDROP.0,
        ptd: std::ptr::null_mut(),
        dwAspect: DVASPECT_CONTENT.0 as u32,
        lindex: -1,
        tymed: TYMED_HGLOBAL.0 as u32,
    };

    let mut medium = unsafe { data_object.GetData(&format) }.map_err(|e| {
        tracing::debug!(target: "selection", error = %e, "No CF_HDROP in data object");
        CaptureError::NoFileDrop
    })?;

    let paths = read_drop_list(&medium);
    unsafe { ReleaseStgMedium(&mut medium) };

    Selection::new(paths?)
}

fn read_drop_list(medium: &STGMEDIUM) -> Result<Vec<PathBuf>, CaptureError> {
    let hglobal = unsafe { medium.u.hGlobal };
    let locked = unsafe { GlobalLock(hglobal) };
    if locked.is_null() {
        return Err(CaptureError::NoFileDrop);
    }

    let paths = enumerate(HDROP(locked));
    let _ = unsafe { GlobalUnlock(hglobal) };
    paths
}

fn enumerate(hdrop: HDROP) -> Result<Vec<PathBuf>, CaptureError> {
    let count = unsafe { DragQueryFileW(hdrop, u32::MAX, None) };
    tracing::trace!(target: "selection", count, "Enumerating dropped files");

    (0..count)
        .map(|index| {
            // Length excludes the terminator.
            let len = unsafe { DragQueryFileW(hdrop, index, None) };
            if len == 0 {
                return Err(CaptureError::UnresolvedEntry { index });
            }

            let mut buffer = vec![0u16; len as usize + 1];
            let copied = unsafe { DragQueryFileW(hdrop, index, Some(&mut buffer)) };
            if copied == 0 {
                return Err(CaptureError::UnresolvedEntry { index });
            }

            Ok(PathBuf::from(U16Str::from_slice(&buffer[..copied as usize]).to_os_string()))
        })
        .collect()
}
