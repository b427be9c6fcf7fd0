use crate::command::MenuCommand;
use crate::eligibility::{self, Rejection};
use crate::launcher::{ConverterLauncher, Notifier};
use crate::menu::{self, CMF_DEFAULTONLY, MenuError, MenuHost, MenuPlan};
use crate::selection::{CaptureError, Selection};
use thiserror::Error;

/// Why `Initialize` refused the selection. The shell then shows nothing.
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("handler was already initialized")]
    AlreadyInitialized,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no menu has been built by this handler")]
    NoMenu,

    #[error("command offset {0} was not offered")]
    UnknownOffset(u32),

    #[error("a command was already invoked")]
    AlreadyInvoked,
}

#[derive(Debug)]
enum State {
    Created,
    Rejected,
    Initialized(Selection),
    MenuQueried { selection: Selection, plan: MenuPlan },
    Invoked,
}

/// One right-click: admit the selection, contribute the submenu, run the
/// chosen conversion. Each step happens at most once, in that order.
pub struct SelectionMenuHandler {
    state: State,
    launcher: ConverterLauncher,
}

impl SelectionMenuHandler {
    pub fn new(launcher: ConverterLauncher) -> Self {
        Self {
            state: State::Created,
            launcher,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.state {
            State::Initialized(selection) | State::MenuQueried { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// Take the captured selection and decide admission. A failure leaves the
    /// handler permanently unable to show a menu.
    pub fn initialize(&mut self, captured: Result<Selection, CaptureError>) -> Result<(), AdmissionError> {
        if !matches!(self.state, State::Created) {
            return Err(AdmissionError::AlreadyInitialized);
        }

        let admitted = captured
            .map_err(AdmissionError::from)
            .and_then(|selection| {
                eligibility::check(&selection)?;
                Ok(selection)
            });

        match admitted {
            Ok(selection) => {
                tracing::debug!(target: "shellext::context_menu", files = selection.len(), "Selection admitted");
                self.state = State::Initialized(selection);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(target: "shellext::context_menu", error = %e, "Selection not admitted");
                self.state = State::Rejected;
                Err(e)
            }
        }
    }

    /// Contribute the submenu. Returns the number of command IDs consumed;
    /// zero when nothing was added.
    pub fn query_menu<H: MenuHost>(
        &mut self,
        host: &mut H,
        position: u32,
        id_first: u32,
        id_last: u32,
        flags: u32,
    ) -> Result<u32, MenuError> {
        if flags & CMF_DEFAULTONLY != 0 {
            return Ok(0);
        }

        let selection = match std::mem::replace(&mut self.state, State::Invoked) {
            State::Initialized(selection) => selection,
            other => {
                tracing::debug!(target: "shellext::context_menu", state = ?other, "Menu not offered in this state");
                self.state = other;
                return Ok(0);
            }
        };

        let plan = MenuPlan::for_selection(&selection);
        let fits = id_first
            .checked_add(plan.slots_used() - 1)
            .is_some_and(|last| last <= id_last);
        if !fits {
            tracing::warn!(target: "shellext::context_menu", id_first, id_last, "Command ID range too small");
            self.state = State::Initialized(selection);
            return Ok(0);
        }

        match menu::install(host, &plan, &t!("menu.title"), position, id_first) {
            Ok(used) => {
                tracing::debug!(target: "shellext::context_menu", used, "Submenu added");
                self.state = State::MenuQueried { selection, plan };
                Ok(used)
            }
            Err(e) => {
                self.state = State::Initialized(selection);
                Err(e)
            }
        }
    }

    /// Run the command at `offset` from the first ID handed to `query_menu`.
    pub fn invoke(&mut self, offset: u32, notifier: &dyn Notifier) -> Result<(), DispatchError> {
        let command = match &self.state {
            State::MenuQueried { plan, .. } => MenuCommand::from_offset(offset)
                .filter(|c| plan.contains(*c))
                .ok_or(DispatchError::UnknownOffset(offset))?,
            State::Invoked => return Err(DispatchError::AlreadyInvoked),
            _ => return Err(DispatchError::NoMenu),
        };

        let State::MenuQueried { selection, .. } = std::mem::replace(&mut self.state, State::Invoked) else {
            return Err(DispatchError::NoMenu);
        };

        tracing::info!(target: "shellext::context_menu", ?command, files = selection.len(), "Conversion command invoked");
        // Failures were already shown to the user; the host only learns the
        // command was recognised.
        self.launcher.run(command.target_format(), &selection, notifier);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MemoryStore;
    use crate::launcher::tests::{RecordingNotifier, RecordingSpawner};
    use crate::menu::tests::RecordingHost;
    use std::ffi::OsStr;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn selection(paths: &[&str]) -> Result<Selection, CaptureError> {
        Selection::new(paths.iter().map(PathBuf::from).collect())
    }

    fn handler_with(exe: &NamedTempFile, spawner: &RecordingSpawner) -> SelectionMenuHandler {
        SelectionMenuHandler::new(ConverterLauncher::new(
            Box::new(MemoryStore::with_executable(exe.path().to_str().unwrap())),
            Box::new(spawner.clone()),
        ))
    }

    #[test]
    fn test_single_png_offers_jpg_only() {
        let exe = NamedTempFile::new().unwrap();
        let spawner = RecordingSpawner::default();
        let mut handler = handler_with(&exe, &spawner);
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["photo.png"])).unwrap();
        let used = handler.query_menu(&mut host, 0, 1000, 1100, 0).unwrap();

        assert_eq!(used, 1);
        assert_eq!(host.items, vec![(1000, "To JPG".to_string())]);

        handler.invoke(0, &RecordingNotifier::default()).unwrap();
        let calls = spawner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments(), OsStr::new("JPG \"photo.png\""));
    }

    #[test]
    fn test_bmp_and_tiff_offer_both_and_convert_to_png() {
        let exe = NamedTempFile::new().unwrap();
        let spawner = RecordingSpawner::default();
        let mut handler = handler_with(&exe, &spawner);
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["a.bmp", "b.tiff"])).unwrap();
        let used = handler.query_menu(&mut host, 2, 10, 20, 0).unwrap();

        assert_eq!(used, 2);
        let labels: Vec<_> = host.items.iter().map(|(_, label)| label.as_str()).collect();
        assert_eq!(labels, vec!["To JPG", "To PNG"]);

        handler.invoke(1, &RecordingNotifier::default()).unwrap();
        let calls = spawner.calls.lock().unwrap();
        assert_eq!(calls[0].arguments(), OsStr::new("PNG \"a.bmp\" \"b.tiff\""));
    }

    #[test]
    fn test_rejected_selection_adds_nothing() {
        let exe = NamedTempFile::new().unwrap();
        let spawner = RecordingSpawner::default();
        let mut handler = handler_with(&exe, &spawner);
        let mut host = RecordingHost::default();

        assert!(matches!(
            handler.initialize(selection(&["doc.txt"])),
            Err(AdmissionError::Rejected(_))
        ));
        assert_eq!(handler.query_menu(&mut host, 0, 1, 100, 0).unwrap(), 0);
        assert_eq!(host.submenus_created, 0);
        assert_eq!(handler.invoke(0, &RecordingNotifier::default()), Err(DispatchError::NoMenu));
        assert!(spawner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_capture_failure_is_not_admitted() {
        let exe = NamedTempFile::new().unwrap();
        let mut handler = handler_with(&exe, &RecordingSpawner::default());

        assert!(matches!(
            handler.initialize(Err(CaptureError::NoFileDrop)),
            Err(AdmissionError::Capture(_))
        ));
        assert!(handler.selection().is_none());
    }

    #[test]
    fn test_initialize_only_once() {
        let exe = NamedTempFile::new().unwrap();
        let mut handler = handler_with(&exe, &RecordingSpawner::default());

        handler.initialize(selection(&["a.bmp"])).unwrap();
        assert!(matches!(
            handler.initialize(selection(&["b.bmp"])),
            Err(AdmissionError::AlreadyInitialized)
        ));
        assert_eq!(handler.selection().unwrap().paths()[0], PathBuf::from("a.bmp"));
    }

    #[test]
    fn test_default_only_adds_nothing() {
        let exe = NamedTempFile::new().unwrap();
        let mut handler = handler_with(&exe, &RecordingSpawner::default());
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["a.bmp"])).unwrap();
        assert_eq!(handler.query_menu(&mut host, 0, 1, 100, CMF_DEFAULTONLY).unwrap(), 0);
        assert_eq!(host.submenus_created, 0);

        // A later full query still works.
        assert_eq!(handler.query_menu(&mut host, 0, 1, 100, 0).unwrap(), 2);
    }

    #[test]
    fn test_id_range_too_small_adds_nothing() {
        let exe = NamedTempFile::new().unwrap();
        let mut handler = handler_with(&exe, &RecordingSpawner::default());
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["a.bmp"])).unwrap();
        assert_eq!(handler.query_menu(&mut host, 0, 50, 50, 0).unwrap(), 0);
        assert_eq!(host.submenus_created, 0);
    }

    #[test]
    fn test_suppressed_png_offset_is_unknown() {
        let exe = NamedTempFile::new().unwrap();
        let spawner = RecordingSpawner::default();
        let mut handler = handler_with(&exe, &spawner);
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["photo.PNG"])).unwrap();
        handler.query_menu(&mut host, 0, 1, 100, 0).unwrap();

        assert_eq!(
            handler.invoke(1, &RecordingNotifier::default()),
            Err(DispatchError::UnknownOffset(1))
        );
        assert_eq!(
            handler.invoke(7, &RecordingNotifier::default()),
            Err(DispatchError::UnknownOffset(7))
        );
        assert!(spawner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_menu_and_command_happen_once() {
        let exe = NamedTempFile::new().unwrap();
        let spawner = RecordingSpawner::default();
        let mut handler = handler_with(&exe, &spawner);
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["a.bmp"])).unwrap();
        assert_eq!(handler.query_menu(&mut host, 0, 1, 100, 0).unwrap(), 2);
        assert_eq!(handler.query_menu(&mut host, 0, 1, 100, 0).unwrap(), 0);
        assert_eq!(host.submenus_created, 1);

        handler.invoke(0, &RecordingNotifier::default()).unwrap();
        assert_eq!(
            handler.invoke(0, &RecordingNotifier::default()),
            Err(DispatchError::AlreadyInvoked)
        );
        assert_eq!(spawner.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_build_keeps_selection() {
        let exe = NamedTempFile::new().unwrap();
        let mut handler = handler_with(&exe, &RecordingSpawner::default());
        let mut host = RecordingHost {
            fail_insert: true,
            ..Default::default()
        };

        handler.initialize(selection(&["a.bmp"])).unwrap();
        assert!(handler.query_menu(&mut host, 0, 1, 100, 0).is_err());
        assert_eq!(host.submenus_destroyed, 1);
        assert!(handler.selection().is_some());
    }

    #[test]
    fn test_launch_failure_still_recognises_command() {
        let spawner = RecordingSpawner::default();
        let notifier = RecordingNotifier::default();
        let mut handler = SelectionMenuHandler::new(ConverterLauncher::new(
            Box::new(MemoryStore::default()),
            Box::new(spawner.clone()),
        ));
        let mut host = RecordingHost::default();

        handler.initialize(selection(&["a.bmp"])).unwrap();
        handler.query_menu(&mut host, 0, 1, 100, 0).unwrap();

        assert!(handler.invoke(0, &notifier).is_ok());
        assert_eq!(notifier.messages.borrow().len(), 1);
        assert!(spawner.calls.lock().unwrap().is_empty());
    }
}
