use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why the shell's selection could not be turned into a [`Selection`].
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no data object was supplied")]
    MissingDataObject,

    #[error("data object carries no file drop payload")]
    NoFileDrop,

    #[error("file drop payload is empty")]
    Empty,

    #[error("drop entry {index} could not be resolved to a path")]
    UnresolvedEntry { index: u32 },
}

/// Files the user right-clicked, in shell order. Captured once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

impl Selection {
    pub fn new(paths: Vec<PathBuf>) -> Result<Self, CaptureError> {
        if paths.is_empty() {
            return Err(CaptureError::Empty);
        }
        tracing::trace!(target: "selection", count = paths.len(), "Selection captured");
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether any file already carries `extension` (dot included, any case).
    pub fn any_has_extension(&self, extension: &str) -> bool {
        self.paths
            .iter()
            .filter_map(|p| extension_of(p))
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Lower-cased extension of the file name, dot included (`.png`).
///
/// Only the last path component is looked at, so a dotted directory name never
/// counts as an extension. Both separators are honoured regardless of the OS
/// the code runs on. A trailing dot yields `Some(".")`.
pub fn extension_of(path: &Path) -> Option<String> {
    let text = path.as_os_str().to_string_lossy();
    let name = text.rsplit(['\\', '/']).next().unwrap_or_default();
    name.rfind('.').map(|dot| name[dot..].to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(matches!(Selection::new(Vec::new()), Err(CaptureError::Empty)));
    }

    #[test]
    fn test_selection_keeps_order() {
        let selection = Selection::new(vec![
            PathBuf::from("C:\\b.png"),
            PathBuf::from("C:\\a.bmp"),
        ])
        .unwrap();

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.paths()[0], PathBuf::from("C:\\b.png"));
        assert_eq!(selection.paths()[1], PathBuf::from("C:\\a.bmp"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("C:\\pics\\photo.PNG")).as_deref(), Some(".png"));
        assert_eq!(extension_of(Path::new("C:\\pics\\archive.tar.Tiff")).as_deref(), Some(".tiff"));
        assert_eq!(extension_of(Path::new("/home/user/scan.webp")).as_deref(), Some(".webp"));
        assert_eq!(extension_of(Path::new("C:\\pics\\README")), None);
        assert_eq!(extension_of(Path::new("C:\\pics\\odd.")).as_deref(), Some("."));
    }

    #[test]
    fn test_dotted_directory_is_not_an_extension() {
        assert_eq!(extension_of(Path::new("C:\\v1.2\\Makefile")), None);
        assert_eq!(extension_of(Path::new("C:/v1.2/Makefile")), None);
    }

    #[test]
    fn test_any_has_extension_ignores_case() {
        let selection = Selection::new(vec![
            PathBuf::from("C:\\a.bmp"),
            PathBuf::from("C:\\b.Png"),
        ])
        .unwrap();
        assert!(selection.any_has_extension(".png"));
        assert!(selection.any_has_extension(".PNG"));
        assert!(!selection.any_has_extension(".tif"));
    }
}
