use crate::launcher::Notifier;
use std::cell::RefCell;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MessageBoxW};
use windows::core::HSTRING;

/// Collects error messages while the handler is locked, then shows them as
/// modal boxes once it is released (a modal loop may re-enter the object).
#[derive(Default)]
pub struct DialogQueue {
    messages: RefCell<Vec<String>>,
}

impl Notifier for DialogQueue {
    fn error(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl DialogQueue {
    pub fn show(self, owner: HWND) {
        let title = HSTRING::from(t!("app.title").as_ref());
        for message in self.messages.into_inner() {
            let text = HSTRING::from(message.as_str());
            unsafe {
                MessageBoxW(owner, &text, &title, MB_OK | MB_ICONERROR);
            }
        }
    }
}
