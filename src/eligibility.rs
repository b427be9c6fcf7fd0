use crate::selection::{Selection, extension_of};
use std::path::PathBuf;
use thiserror::Error;

/// Source formats the converter accepts (lower case, dot included).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".bmp", ".png", ".tif", ".tiff", ".webp"];

/// The selection holds a file the converter cannot read; the menu is not shown.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{path:?} has unsupported extension {extension}")]
pub struct Rejection {
    pub path: PathBuf,
    pub extension: String,
}

pub fn is_allowed(extension: &str) -> bool {
    ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

/// All-or-nothing admission: the first file with a present, disallowed
/// extension rejects the whole selection. Files without an extension pass.
pub fn check(selection: &Selection) -> Result<(), Rejection> {
    for path in selection.paths() {
        let Some(extension) = extension_of(path) else {
            continue;
        };

        if !is_allowed(&extension) {
            tracing::debug!(target: "selection", path = %path.display(), %extension, "Selection rejected");
            return Err(Rejection {
                path: path.clone(),
                extension,
            });
        }
    }

    Ok(())
}
