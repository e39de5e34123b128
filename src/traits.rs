//! Refocus backend trait.
//!
//! The refocus algorithm itself is opaque: backends implement [`Refocus`]
//! and callers drive them through [`RefocusSession`](crate::RefocusSession),
//! which validates every buffer before the backend sees it.

use alloc::string::String;

use crate::{BackendCapabilities, FocusPoint, ImageBuffer, Stop};

/// Per-run refocus parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RefocusParams {
    /// Point to bring into focus, in main-image display coordinates.
    pub focus: FocusPoint,
    /// Simulated aperture. Smaller values blur the background more.
    pub f_number: f32,
}

impl RefocusParams {
    pub const fn new(focus_x: i32, focus_y: i32, f_number: f32) -> Self {
        Self {
            focus: FocusPoint::new(focus_x, focus_y),
            f_number,
        }
    }
}

/// A depth-guided refocus engine.
///
/// The engine is a two-step state machine: [`set_images`](Refocus::set_images)
/// loads a main image and its depth map, then [`run`](Refocus::run) may be
/// called any number of times with different parameters.
///
/// Inputs are borrowed for the duration of the call only. A backend that
/// needs them later must copy them, e.g. with
/// [`ImageBuffer::try_clone`].
pub trait Refocus {
    /// The backend-specific error type.
    type Error: core::error::Error + Send + Sync + 'static;

    /// What inputs this backend accepts.
    fn capabilities(&self) -> &BackendCapabilities;

    /// Load the main image and depth map.
    fn set_images(
        &mut self,
        main: &ImageBuffer<'_>,
        depth: &ImageBuffer<'_>,
    ) -> Result<(), Self::Error>;

    /// Render a refocused image into `out`.
    ///
    /// Backends advertising [`cancel`](BackendCapabilities::cancel) check
    /// `stop` periodically.
    fn run(
        &mut self,
        params: &RefocusParams,
        out: &mut ImageBuffer<'_>,
        stop: &dyn Stop,
    ) -> Result<(), Self::Error>;

    /// Short version string.
    fn version(&self) -> &str;

    /// Version string with backend-defined detail selected by `flags`.
    fn full_version(&self, _flags: i32) -> String {
        String::from(self.version())
    }
}
