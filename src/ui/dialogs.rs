use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::DroppedFile;

use crate::data::upload::UploadedFile;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Native file dialogs
// ---------------------------------------------------------------------------

/// Ask for one or more tables and load them into the state.
pub fn open_upload_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload a CSV or Excel file")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files();

    if let Some(paths) = files {
        upload_paths(state, &paths);
    }
}

/// Read files from disk; unreadable ones are reported like bad uploads.
pub fn upload_paths(state: &mut AppState, paths: &[PathBuf]) {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        match read_upload(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                log::error!("{e:#}");
                state
                    .rejected
                    .push((path.display().to_string(), format!("{e:#}")));
            }
        }
    }
    state.add_uploads(uploads);
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    UploadedFile::from_path(path).with_context(|| format!("reading {}", path.display()))
}

/// Files dropped onto the window. Browsers hand over bytes, desktops a path.
pub fn upload_dropped(state: &mut AppState, dropped: Vec<DroppedFile>) {
    let mut paths = Vec::new();
    let mut uploads = Vec::new();
    for file in dropped {
        match (file.bytes, file.path) {
            (Some(bytes), _) => uploads.push(UploadedFile::new(file.name, bytes)),
            (None, Some(path)) => paths.push(path),
            (None, None) => log::warn!("Dropped file {} has no content", file.name),
        }
    }
    state.add_uploads(uploads);
    upload_paths(state, &paths);
}

/// Ask where to save `bytes`, pre-filled with `file_name`.
/// Returns the chosen path, or `None` if the user cancelled.
pub fn save_bytes(file_name: &str, filter: &str, bytes: &[u8]) -> Result<Option<PathBuf>> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let Some(path) = rfd::FileDialog::new()
        .set_title("Save file")
        .set_file_name(file_name)
        .add_filter(filter, &[ext])
        .save_file()
    else {
        return Ok(None);
    };

    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {}", path.display());
    Ok(Some(path))
}
