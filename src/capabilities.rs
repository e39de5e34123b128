//! Backend capability descriptors.
//!
//! Each refocus backend returns a [`BackendCapabilities`] describing which
//! inputs it accepts. [`RefocusSession`](crate::RefocusSession) uses it to
//! reject unsupported buffers before the backend sees them.

use crate::pixel::DataType;

/// Describes what a refocus backend supports.
///
/// The struct uses getter methods so fields can be added over time
/// without breaking changes.
///
/// # Example
///
/// ```
/// use refocus_image::BackendCapabilities;
///
/// static CAPS: BackendCapabilities = BackendCapabilities::new()
///     .with_depth_f32(true)
///     .with_rotated_input(true)
///     .with_cancel(true);
///
/// assert!(CAPS.depth_f32());
/// assert!(!CAPS.main_bgra());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct BackendCapabilities {
    cancel: bool,
    rotated_input: bool,
    depth_f32: bool,
    depth_u16: bool,
    depth_u8: bool,
    main_bgra: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendCapabilities {
    /// Create capabilities with everything disabled.
    ///
    /// A backend with no flags set still accepts an upright RGBA main
    /// image; it just has no depth type enabled yet.
    pub const fn new() -> Self {
        Self {
            cancel: false,
            rotated_input: false,
            depth_f32: false,
            depth_u16: false,
            depth_u8: false,
            main_bgra: false,
        }
    }

    /// Whether the stop token passed to `run` is checked during the run.
    pub const fn cancel(&self) -> bool {
        self.cancel
    }

    /// Whether inputs with non-zero rotation metadata are accepted.
    pub const fn rotated_input(&self) -> bool {
        self.rotated_input
    }

    /// Whether 32-bit float depth maps are accepted.
    pub const fn depth_f32(&self) -> bool {
        self.depth_f32
    }

    /// Whether 16-bit depth maps are accepted.
    pub const fn depth_u16(&self) -> bool {
        self.depth_u16
    }

    /// Whether 8-bit depth maps are accepted.
    pub const fn depth_u8(&self) -> bool {
        self.depth_u8
    }

    /// Whether BGRA main images are accepted in addition to RGBA.
    pub const fn main_bgra(&self) -> bool {
        self.main_bgra
    }

    /// Whether depth maps of `data_type` are accepted.
    pub const fn supports_depth(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::F32 => self.depth_f32,
            DataType::U16 => self.depth_u16,
            DataType::U8 => self.depth_u8,
        }
    }

    pub const fn with_cancel(mut self, v: bool) -> Self {
        self.cancel = v;
        self
    }

    pub const fn with_rotated_input(mut self, v: bool) -> Self {
        self.rotated_input = v;
        self
    }

    pub const fn with_depth_f32(mut self, v: bool) -> Self {
        self.depth_f32 = v;
        self
    }

    pub const fn with_depth_u16(mut self, v: bool) -> Self {
        self.depth_u16 = v;
        self
    }

    pub const fn with_depth_u8(mut self, v: bool) -> Self {
        self.depth_u8 = v;
        self
    }

    pub const fn with_main_bgra(mut self, v: bool) -> Self {
        self.main_bgra = v;
        self
    }
}
