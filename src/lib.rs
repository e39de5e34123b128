//! Multi-plane image buffers and the backend contract for depth-guided refocus.
//!
//! This crate defines the pixel buffer shared by camera pipelines and the
//! interface a refocus engine implements:
//!
//! - [`ImageBuffer`]: owned or borrowed, one to three planes, packed/YUV formats
//! - [`Layout`] / [`StoreMode`] / [`AlignMode`]: plane geometry
//! - [`PixelFormat`] / [`DataType`] / [`Rotation`]: pixel description
//! - [`CaptureInfo`]: EXIF-like side channel carried with the pixels
//! - [`Refocus`] / [`RefocusSession`]: backend trait and validating driver
//! - [`host`]: wrapping host byte arrays and integer result codes
//! - [`ResourceLimits`]: caps on the inputs a session accepts
//!
//! Backends implement [`Refocus`] on their own types. The session checks
//! every buffer against [`BackendCapabilities`] before the backend sees it.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod capabilities;
mod format;
pub mod host;
mod info;
mod layout;
mod limits;
mod orientation;
mod pixel;
mod session;
mod traits;

pub use buffer::{BufferError, ImageBuffer};
pub use capabilities::BackendCapabilities;
pub use format::{PixelFormat, PlaneKind};
pub use host::ResultCode;
pub use info::{CaptureInfo, FocusPoint};
pub use layout::{ALIGNMENT, AlignMode, Layout, Segment, StoreMode};
pub use limits::{LimitExceeded, ResourceLimits};
pub use orientation::Rotation;
pub use pixel::DataType;
pub use session::{RefocusError, RefocusSession};
pub use traits::{Refocus, RefocusParams};

// Re-exports for backend implementors and users.
pub use enough::{Stop, StopReason, Unstoppable};
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
