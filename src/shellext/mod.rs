// Explorer integration: the COM objects and the Win32 pieces they drive.
// Everything the shell does not see lives in the platform-neutral modules.

mod context_menu;
mod dialog;
mod factory;
mod hdrop;
mod native_menu;
pub mod registration;

pub use context_menu::ConvertContextMenu;
pub use dialog::DialogQueue;
pub use factory::ConvertContextMenuFactory;
pub use hdrop::capture_selection;
pub use native_menu::NativeMenu;
