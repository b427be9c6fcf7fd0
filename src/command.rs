use std::fmt;

/// Format token handed to the converter as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpg,
    Png,
}

impl TargetFormat {
    pub fn token(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "JPG",
            TargetFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Submenu commands, identified by their offset from the host's first ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    ToJpg = 0,
    ToPng = 1,
}

impl MenuCommand {
    pub fn offset(&self) -> u32 {
        *self as u32
    }

    pub fn from_offset(offset: u32) -> Option<Self> {
        match offset {
            0 => Some(MenuCommand::ToJpg),
            1 => Some(MenuCommand::ToPng),
            _ => None,
        }
    }

    pub fn target_format(&self) -> TargetFormat {
        match self {
            MenuCommand::ToJpg => TargetFormat::Jpg,
            MenuCommand::ToPng => TargetFormat::Png,
        }
    }

    pub fn label(&self) -> String {
        match self {
            MenuCommand::ToJpg => t!("menu.to_jpg").to_string(),
            MenuCommand::ToPng => t!("menu.to_png").to_string(),
        }
    }
}
