//! Capture metadata carried alongside pixel data.

use alloc::string::String;

/// A point in buffer pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FocusPoint {
    pub x: i32,
    pub y: i32,
}

impl FocusPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// EXIF-like capture fields.
///
/// Every field is independent; no combination is invalid. The module info
/// label is an owned string so it survives the source buffer being freed.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct CaptureInfo {
    /// Sensor ISO sensitivity.
    pub iso: i32,
    /// Focus point reported by the camera.
    pub focus: FocusPoint,
    /// Aperture f-number.
    pub f_number: f32,
    /// Whether a watermark is applied to the output.
    pub watermark: bool,
    /// Capture timestamp, in whatever unit the host uses.
    pub timestamp: u64,
    /// Camera field of view in degrees.
    pub fov: f32,
    /// Camera module label.
    pub module_info: Option<String>,
}

impl CaptureInfo {
    /// All fields zero/empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iso(mut self, iso: i32) -> Self {
        self.iso = iso;
        self
    }

    pub fn with_focus(mut self, x: i32, y: i32) -> Self {
        self.focus = FocusPoint::new(x, y);
        self
    }

    pub fn with_f_number(mut self, f_number: f32) -> Self {
        self.f_number = f_number;
        self
    }

    pub fn with_watermark(mut self, on: bool) -> Self {
        self.watermark = on;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Set the module label, copying it.
    pub fn with_module_info(mut self, info: impl Into<String>) -> Self {
        self.module_info = Some(info.into());
        self
    }

    /// Module label, if one was set.
    pub fn module_info(&self) -> Option<&str> {
        self.module_info.as_deref()
    }
}
