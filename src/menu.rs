use crate::command::MenuCommand;
use crate::selection::Selection;
use thiserror::Error;

/// Host asked for the default verb only; nothing may be added.
pub const CMF_DEFAULTONLY: u32 = 0x0000_0001;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MenuError {
    /// A native menu call failed; carries the HRESULT built from the last error.
    #[error("native menu operation failed (0x{0:08X})")]
    Native(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub command: MenuCommand,
    pub label: String,
}

/// Entries to show for one admitted selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPlan {
    entries: Vec<MenuEntry>,
}

impl MenuPlan {
    /// "To JPG" always; "To PNG" unless some file already is a PNG.
    pub fn for_selection(selection: &Selection) -> Self {
        let mut commands = vec![MenuCommand::ToJpg];
        if !selection.any_has_extension(".png") {
            commands.push(MenuCommand::ToPng);
        }

        Self {
            entries: commands
                .into_iter()
                .map(|command| MenuEntry {
                    command,
                    label: command.label(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn contains(&self, command: MenuCommand) -> bool {
        self.entries.iter().any(|e| e.command == command)
    }

    /// Highest assigned offset plus one.
    pub fn slots_used(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.command.offset() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// The host's menu as seen by the builder. Implemented over `HMENU` on
/// Windows and by recorders in tests.
pub trait MenuHost {
    type Submenu: Copy;

    fn create_submenu(&mut self) -> Result<Self::Submenu, MenuError>;
    fn append_item(&mut self, submenu: Self::Submenu, id: u32, label: &str) -> Result<(), MenuError>;
    fn insert_parent(&mut self, position: u32, label: &str, submenu: Self::Submenu) -> Result<(), MenuError>;
    fn destroy_submenu(&mut self, submenu: Self::Submenu);
}

/// Build the submenu for `plan` and hang it under a parent entry at `position`.
/// Returns the number of command slots consumed. The submenu is destroyed on
/// any failure after it was created.
pub fn install<H: MenuHost>(
    host: &mut H,
    plan: &MenuPlan,
    title: &str,
    position: u32,
    id_first: u32,
) -> Result<u32, MenuError> {
    let submenu = host.create_submenu()?;

    let result = plan
        .entries()
        .iter()
        .try_for_each(|entry| host.append_item(submenu, id_first + entry.command.offset(), &entry.label))
        .and_then(|_| host.insert_parent(position, title, submenu));

    if let Err(e) = result {
        tracing::warn!(target: "shellext::context_menu", error = %e, "Failed to build submenu");
        host.destroy_submenu(submenu);
        return Err(e);
    }

    Ok(plan.slots_used())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Records every call; optionally fails the n-th append or the insert.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub submenus_created: u32,
        pub submenus_destroyed: u32,
        pub items: Vec<(u32, String)>,
        pub parent: Option<(u32, String)>,
        pub fail_append_at: Option<usize>,
        pub fail_insert: bool,
        pub fail_create: bool,
    }

    impl MenuHost for RecordingHost {
        type Submenu = u32;

        fn create_submenu(&mut self) -> Result<u32, MenuError> {
            if self.fail_create {
                return Err(MenuError::Native(0x8007_0008));
            }
            self.submenus_created += 1;
            Ok(self.submenus_created)
        }

        fn append_item(&mut self, _submenu: u32, id: u32, label: &str) -> Result<(), MenuError> {
            if self.fail_append_at == Some(self.items.len()) {
                return Err(MenuError::Native(0x8000_4005));
            }
            self.items.push((id, label.to_string()));
            Ok(())
        }

        fn insert_parent(&mut self, position: u32, label: &str, _submenu: u32) -> Result<(), MenuError> {
            if self.fail_insert {
                return Err(MenuError::Native(0x8000_4005));
            }
            self.parent = Some((position, label.to_string()));
            Ok(())
        }

        fn destroy_submenu(&mut self, _submenu: u32) {
            self.submenus_destroyed += 1;
        }
    }

    fn selection(paths: &[&str]) -> Selection {
        Selection::new(paths.iter().map(PathBuf::from).collect()).unwrap()
    }

    #[test]
    fn test_png_in_selection_suppresses_to_png() {
        let plan = MenuPlan::for_selection(&selection(&["photo.png"]));
        assert_eq!(plan.entries().len(), 1);
        assert_eq!(plan.entries()[0].command, MenuCommand::ToJpg);
        assert!(!plan.contains(MenuCommand::ToPng));
        assert_eq!(plan.slots_used(), 1);
    }

    #[test]
    fn test_png_suppression_ignores_case() {
        let plan = MenuPlan::for_selection(&selection(&["C:\\a.bmp", "C:\\B.PnG"]));
        assert_eq!(plan.slots_used(), 1);
    }

    #[test]
    fn test_no_png_offers_both() {
        let plan = MenuPlan::for_selection(&selection(&["a.bmp", "b.tiff", "scan"]));
        let commands: Vec<_> = plan.entries().iter().map(|e| e.command).collect();
        assert_eq!(commands, vec![MenuCommand::ToJpg, MenuCommand::ToPng]);
        assert_eq!(plan.slots_used(), 2);
    }

    #[test]
    fn test_install_assigns_ids_from_first() {
        let mut host = RecordingHost::default();
        let plan = MenuPlan::for_selection(&selection(&["a.bmp", "b.tiff"]));

        let used = install(&mut host, &plan, "Convert", 3, 100).unwrap();

        assert_eq!(used, 2);
        let ids: Vec<_> = host.items.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(host.parent, Some((3, "Convert".to_string())));
        assert_eq!(host.submenus_destroyed, 0);
    }

    #[test]
    fn test_install_releases_submenu_when_append_fails() {
        let mut host = RecordingHost {
            fail_append_at: Some(1),
            ..Default::default()
        };
        let plan = MenuPlan::for_selection(&selection(&["a.bmp"]));

        assert!(install(&mut host, &plan, "Convert", 0, 1).is_err());
        assert_eq!(host.submenus_created, 1);
        assert_eq!(host.submenus_destroyed, 1);
        assert!(host.parent.is_none());
    }

    #[test]
    fn test_install_releases_submenu_when_insert_fails() {
        let mut host = RecordingHost {
            fail_insert: true,
            ..Default::default()
        };
        let plan = MenuPlan::for_selection(&selection(&["a.bmp"]));

        assert_eq!(install(&mut host, &plan, "Convert", 0, 1), Err(MenuError::Native(0x8000_4005)));
        assert_eq!(host.submenus_destroyed, 1);
    }

    #[test]
    fn test_install_without_submenu_destroys_nothing() {
        let mut host = RecordingHost {
            fail_create: true,
            ..Default::default()
        };
        let plan = MenuPlan::for_selection(&selection(&["a.bmp"]));

        assert!(install(&mut host, &plan, "Convert", 0, 1).is_err());
        assert_eq!(host.submenus_destroyed, 0);
        assert!(host.items.is_empty());
    }
}
