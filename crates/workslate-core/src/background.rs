//! Canvas background: ruled grids and the live webcam feed.

use crate::task::FrameTask;
use kurbo::{Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GRID_SIZE: f64 = 50.0;

/// Message shown when the camera cannot be opened.
pub const CAMERA_DENIED_MESSAGE: &str = "Could not access camera. Please allow permissions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridType {
    None,
    #[default]
    Square,
    Lined,
    Dot,
    GraphCyan,
    Webcam,
}

impl GridType {
    pub const ALL: [GridType; 6] = [
        Self::None,
        Self::Square,
        Self::Lined,
        Self::Dot,
        Self::GraphCyan,
        Self::Webcam,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Square => "square",
            Self::Lined => "lined",
            Self::Dot => "dot",
            Self::GraphCyan => "graph-cyan",
            Self::Webcam => "webcam",
        }
    }

    /// Next background in the cycle order.
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Paper colour under the grid.
    pub fn paper_color(&self) -> Color {
        match self {
            Self::GraphCyan => Color::from_rgb8(0xec, 0xfe, 0xff),
            _ => Color::from_rgb8(0xfd, 0xf5, 0xe6),
        }
    }
}

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

/// One RGBA8 video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl CameraFrame {
    /// Destination rect that covers `viewport` while preserving the frame's
    /// aspect ratio, centred (overflow is cropped).
    pub fn cover_rect(&self, viewport: Size) -> Rect {
        if self.width == 0 || self.height == 0 {
            return Rect::ZERO;
        }
        let (vw, vh) = (self.width as f64, self.height as f64);
        let ratio = (viewport.width / vw).max(viewport.height / vh);
        let (w, h) = (vw * ratio, vh * ratio);
        let x = (viewport.width - w) / 2.0;
        let y = (viewport.height - h) / 2.0;
        Rect::new(x, y, x + w, y + h)
    }
}

/// A video capture device.
pub trait CameraSource {
    fn start(&mut self) -> Result<(), CameraError>;

    fn stop(&mut self);

    /// Latest frame, if a new one is ready.
    fn poll_frame(&mut self) -> Option<CameraFrame>;
}

/// Camera that is never available; used when the platform has no capture
/// backend.
#[derive(Debug, Default)]
pub struct NoCamera;

impl CameraSource for NoCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        Err(CameraError::Unavailable("no capture backend".to_string()))
    }

    fn stop(&mut self) {}

    fn poll_frame(&mut self) -> Option<CameraFrame> {
        None
    }
}

pub struct Background {
    grid_type: GridType,
    pub grid_size: f64,
    camera: Box<dyn CameraSource>,
    task: Option<FrameTask>,
    frozen: bool,
    frame: Option<CameraFrame>,
}

impl Default for Background {
    fn default() -> Self {
        Self::new(Box::new(NoCamera))
    }
}

impl Background {
    pub fn new(camera: Box<dyn CameraSource>) -> Self {
        Self {
            grid_type: GridType::default(),
            grid_size: DEFAULT_GRID_SIZE,
            camera,
            task: None,
            frozen: false,
            frame: None,
        }
    }

    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_streaming(&self) -> bool {
        self.task.as_ref().is_some_and(FrameTask::is_alive)
    }

    /// Most recent webcam frame.
    pub fn frame(&self) -> Option<&CameraFrame> {
        self.frame.as_ref()
    }

    /// Switch backgrounds. Leaving the webcam stops it; selecting it starts
    /// the camera and falls back to the square grid if that fails.
    pub fn set_grid_type(&mut self, grid_type: GridType) -> Result<(), CameraError> {
        if self.grid_type == GridType::Webcam && grid_type != GridType::Webcam {
            self.stop_webcam();
        }
        self.grid_type = grid_type;
        if grid_type == GridType::Webcam && self.task.is_none() {
            if let Err(e) = self.camera.start() {
                log::warn!("Webcam error: {e}");
                self.grid_type = GridType::Square;
                return Err(e);
            }
            log::info!("Webcam started");
            self.task = Some(FrameTask::new("webcam"));
        }
        Ok(())
    }

    fn stop_webcam(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            self.camera.stop();
            log::info!("Webcam stopped");
        }
        self.frozen = false;
        self.frame = None;
    }

    pub fn toggle_freeze(&mut self) -> bool {
        if self.grid_type == GridType::Webcam {
            self.frozen = !self.frozen;
        }
        self.frozen
    }

    /// Per-frame copy of the camera image. Returns whether the background
    /// changed; the host keeps scheduling frames while
    /// [`is_streaming`](Self::is_streaming) holds.
    pub fn tick(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let mut updated = false;
        let camera = &mut self.camera;
        let frame = &mut self.frame;
        let frozen = self.frozen;
        task.tick(|| {
            if frozen {
                return;
            }
            if let Some(next) = camera.poll_frame() {
                *frame = Some(next);
                updated = true;
            }
        });
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCamera {
        allow: bool,
        started: bool,
        frames: u32,
    }

    impl CameraSource for FakeCamera {
        fn start(&mut self) -> Result<(), CameraError> {
            if !self.allow {
                return Err(CameraError::PermissionDenied);
            }
            self.started = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.started = false;
        }

        fn poll_frame(&mut self) -> Option<CameraFrame> {
            self.frames += 1;
            Some(CameraFrame { width: 4, height: 2, rgba: vec![self.frames as u8; 32] })
        }
    }

    fn camera(allow: bool) -> Box<FakeCamera> {
        Box::new(FakeCamera { allow, started: false, frames: 0 })
    }

    #[test]
    fn test_denied_camera_falls_back_to_square() {
        let mut bg = Background::new(camera(false));
        bg.set_grid_type(GridType::Dot).unwrap();
        let result = bg.set_grid_type(GridType::Webcam);
        assert!(matches!(result, Err(CameraError::PermissionDenied)));
        assert_eq!(bg.grid_type(), GridType::Square);
        assert!(!bg.is_streaming());
    }

    #[test]
    fn test_webcam_frames_and_freeze() {
        let mut bg = Background::new(camera(true));
        bg.set_grid_type(GridType::Webcam).unwrap();
        assert!(bg.is_streaming());
        assert!(bg.tick());
        let first = bg.frame().cloned().unwrap();

        assert!(bg.toggle_freeze());
        assert!(!bg.tick());
        assert_eq!(bg.frame(), Some(&first));

        assert!(!bg.toggle_freeze());
        assert!(bg.tick());
        assert_ne!(bg.frame(), Some(&first));
    }

    #[test]
    fn test_leaving_webcam_stops_stream() {
        let mut bg = Background::new(camera(true));
        bg.set_grid_type(GridType::Webcam).unwrap();
        bg.tick();
        bg.set_grid_type(GridType::Lined).unwrap();
        assert!(!bg.is_streaming());
        assert!(bg.frame().is_none());
        assert!(!bg.tick());
        assert!(!bg.toggle_freeze());
    }

    #[test]
    fn test_cover_rect() {
        let frame = CameraFrame { width: 200, height: 100, rgba: vec![] };
        let rect = frame.cover_rect(Size::new(100.0, 100.0));
        assert!((rect.width() - 200.0).abs() < 1e-9);
        assert!((rect.height() - 100.0).abs() < 1e-9);
        assert!((rect.x0 + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_cycle() {
        assert_eq!(GridType::None.next(), GridType::Square);
        assert_eq!(GridType::Webcam.next(), GridType::None);
        assert_eq!(serde_json::to_string(&GridType::GraphCyan).unwrap(), "\"graph-cyan\"");
    }
}
