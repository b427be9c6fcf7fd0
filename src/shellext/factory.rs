use super::ConvertContextMenu;
use crate::module;
use windows::{
    Win32::{Foundation::*, System::Com::*},
    core::*,
};

// Class factory for creating instances of our context menu handler
#[implement(IClassFactory)]
pub struct ConvertContextMenuFactory;

impl IClassFactory_Impl for ConvertContextMenuFactory_Impl {
    fn CreateInstance(
        &self,
        outer: Option<&IUnknown>,
        iid: *const GUID,
        result: *mut *mut core::ffi::c_void,
    ) -> Result<()> {
        if result.is_null() {
            return Err(Error::from(E_POINTER));
        }
        unsafe { *result = std::ptr::null_mut() };

        if outer.is_some() {
            return Err(Error::from(CLASS_E_NOAGGREGATION));
        }

        tracing::trace!(target: "shellext::factory", "CreateInstance called");
        let handler: IUnknown = ConvertContextMenu::new().into();

        unsafe { handler.query(iid, result).ok() }
    }

    fn LockServer(&self, lock: BOOL) -> Result<()> {
        module::lock_server(lock.as_bool());
        Ok(())
    }
}
