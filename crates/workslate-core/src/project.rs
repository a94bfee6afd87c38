//! Project files: the slide collection as a JSON array of arrays of objects.

use crate::document::Slide;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Invalid project file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid project file: expected an array of slides")]
    NotAnArray,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a slide collection. Nothing is returned unless the whole payload
/// is valid.
pub fn from_json(json: &str) -> Result<Vec<Slide>, ProjectError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(slides) = &value else {
        return Err(ProjectError::NotAnArray);
    };
    if !slides.iter().all(serde_json::Value::is_array) {
        return Err(ProjectError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

/// Serialize a slide collection.
pub fn to_json(slides: &[Slide]) -> Result<String, ProjectError> {
    Ok(serde_json::to_string(slides)?)
}

pub fn read_file(path: &Path) -> Result<Vec<Slide>, ProjectError> {
    from_json(&fs::read_to_string(path)?)
}

pub fn write_file(path: &Path, slides: &[Slide]) -> Result<(), ProjectError> {
    fs::write(path, to_json(slides)?)?;
    Ok(())
}
