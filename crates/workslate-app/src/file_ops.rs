//! Native file dialogs and message boxes.

use std::path::Path;
use workslate_core::editor::{Notice, NoticeLevel};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Ask for a project file and read it.
pub fn open_project() -> Option<String> {
    let path = rfd::FileDialog::new()
        .set_title("Open Project")
        .add_filter("WorkSlate Project", &["json"])
        .pick_file()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            log::info!("Read project from: {:?}", path);
            Some(content)
        }
        Err(e) => {
            log::error!("Failed to read file: {}", e);
            None
        }
    }
}

/// Ask for a destination and write the project JSON there.
pub fn save_project(json: &str) {
    let dialog = rfd::FileDialog::new()
        .set_title("Save Project")
        .set_file_name("workslate_project.json")
        .add_filter("WorkSlate Project", &["json"]);

    if let Some(path) = dialog.save_file() {
        if let Err(e) = std::fs::write(&path, json) {
            log::error!("Failed to write file: {}", e);
        } else {
            log::info!("Saved project to: {:?}", path);
        }
    }
}

/// Ask for a destination and write an exported slide there.
pub fn save_png(png: &[u8], file_name: &str) {
    let dialog = rfd::FileDialog::new()
        .set_title("Export Slide")
        .set_file_name(file_name)
        .add_filter("PNG Image", &["png"]);

    if let Some(path) = dialog.save_file() {
        match std::fs::write(&path, png) {
            Ok(()) => log::info!("Exported slide to: {:?}", path),
            Err(e) => log::error!("Failed to write PNG: {}", e),
        }
    }
}

/// Ask for an image file and return its bytes.
pub fn pick_image() -> Option<Vec<u8>> {
    let path = rfd::FileDialog::new()
        .set_title("Import Image")
        .add_filter("Image", IMAGE_EXTENSIONS)
        .pick_file()?;
    read_image(&path)
}

/// Bytes of a dropped or picked file when it looks like a supported image.
pub fn read_image(path: &Path) -> Option<Vec<u8>> {
    if !is_image_path(path) {
        log::debug!("Ignoring non-image file: {:?}", path);
        return None;
    }
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::error!("Failed to read image {:?}: {}", path, e);
            None
        }
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Log a notice and, unless it is informational, show it in a message box.
pub fn show_notice(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => {
            log::info!("{}", notice.message);
            return;
        }
        NoticeLevel::Warning => {
            log::warn!("{}", notice.message);
            rfd::MessageLevel::Warning
        }
        NoticeLevel::Error => {
            log::error!("{}", notice.message);
            rfd::MessageLevel::Error
        }
    };
    rfd::MessageDialog::new()
        .set_title("Workslate")
        .set_description(notice.message.as_str())
        .set_level(level)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
