//! Notifications published by the strip engine.

use std::path::PathBuf;

use crate::strip::mode::ViewState;

/// The focused item changed (navigation, autoplay, or inferred from scrolling).
///
/// `previous` is the item to un-highlight in external list UI.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentItemChangedEvent {
    pub index: usize,
    pub previous: Option<usize>,
    pub path: PathBuf,
    /// File name for the filename field.
    pub display_name: String,
}

impl CurrentItemChangedEvent {
    pub fn new(index: usize, previous: Option<usize>, path: PathBuf) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            index,
            previous,
            path,
            display_name,
        }
    }
}

/// Mode, fit mode, direction, or layout order changed (toolbar icon sync).
#[derive(Clone, Debug, PartialEq)]
pub struct ViewStateChangedEvent(pub ViewState);
