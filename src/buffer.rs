//! Multi-plane image buffer.
//!
//! [`ImageBuffer`] holds up to three physical planes. Each plane is either
//! owned by the buffer or borrowed from the caller; the borrow lifetime
//! `'a` guarantees a buffer never outlives memory it does not own, and the
//! buffer never frees borrowed memory.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use imgref::{Img, ImgRef, ImgVec};
use rgb::alt::BGRA8;
use rgb::{ComponentBytes, FromSlice, RGB8, RGBA8};
use tracing::{debug, trace};

use crate::format::PixelFormat;
use crate::info::{CaptureInfo, FocusPoint};
use crate::layout::{AlignMode, Layout, StoreMode};
use crate::orientation::Rotation;
use crate::pixel::{DataType, parse_f32, parse_u16};

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from image buffer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// Width or height is zero, odd where the format subsamples, larger
    /// than the matrix (for content extents), or causes overflow.
    InvalidDimensions,
    /// A borrowed plane is smaller than the layout requires.
    InsufficientData,
    /// The pixel format cannot be stored with the requested store mode.
    UnsupportedStoreMode,
    /// Zero or more than three planes were supplied.
    PlaneCountMismatch,
    /// Source and target differ in format, data type or matrix size.
    ShapeMismatch,
    /// The target borrows read-only memory.
    ReadOnly,
    /// The buffer has no backing planes.
    Empty,
    /// Rotation is not one of 0, 90, 180 or 270 degrees.
    InvalidRotation,
    /// Plane memory could not be allocated.
    AllocationFailed,
    /// The buffer's format or data type does not match the requested view.
    FormatMismatch,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions => write!(f, "invalid image dimensions"),
            Self::InsufficientData => {
                write!(f, "plane data is too small for the given dimensions")
            }
            Self::UnsupportedStoreMode => {
                write!(f, "pixel format cannot be stored with this store mode")
            }
            Self::PlaneCountMismatch => write!(f, "expected one to three planes"),
            Self::ShapeMismatch => write!(f, "image format or dimensions do not match"),
            Self::ReadOnly => write!(f, "target buffer is read-only"),
            Self::Empty => write!(f, "image buffer has no data"),
            Self::InvalidRotation => write!(f, "rotation must be 0, 90, 180 or 270 degrees"),
            Self::AllocationFailed => write!(f, "failed to allocate plane memory"),
            Self::FormatMismatch => write!(f, "image format does not match the requested view"),
        }
    }
}

impl core::error::Error for BufferError {}

// ---------------------------------------------------------------------------
// Plane storage
// ---------------------------------------------------------------------------

/// Backing memory of one physical plane.
enum Plane<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
    BorrowedMut(&'a mut [u8]),
}

impl Plane<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Plane::Owned(v) => v,
            Plane::Borrowed(d) => d,
            Plane::BorrowedMut(d) => d,
        }
    }

    fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Plane::Owned(v) => Some(v),
            Plane::Borrowed(_) => None,
            Plane::BorrowedMut(d) => Some(d),
        }
    }

    fn is_owned(&self) -> bool {
        matches!(self, Plane::Owned(_))
    }

    fn is_writable(&self) -> bool {
        !matches!(self, Plane::Borrowed(_))
    }

    fn to_owned_plane(&self) -> Plane<'static> {
        Plane::Owned(self.bytes().to_vec())
    }

    fn into_owned(self) -> Plane<'static> {
        match self {
            Plane::Owned(v) => Plane::Owned(v),
            Plane::Borrowed(d) => Plane::Owned(d.to_vec()),
            Plane::BorrowedMut(d) => Plane::Owned(d.to_vec()),
        }
    }
}

/// Caller memory handed to one of the wrapping constructors.
enum Borrow<'a> {
    Shared(&'a [u8]),
    Unique(&'a mut [u8]),
}

impl<'a> Borrow<'a> {
    /// Plane viewing exactly the first `len` bytes.
    fn into_plane(self, len: usize) -> Result<Plane<'a>, BufferError> {
        match self {
            Borrow::Shared(d) => d
                .get(..len)
                .map(Plane::Borrowed)
                .ok_or(BufferError::InsufficientData),
            Borrow::Unique(d) => {
                if d.len() < len {
                    return Err(BufferError::InsufficientData);
                }
                Ok(Plane::BorrowedMut(d.split_at_mut(len).0))
            }
        }
    }
}

fn alloc_zeroed(len: usize) -> Result<Vec<u8>, BufferError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| BufferError::AllocationFailed)?;
    data.resize(len, 0);
    Ok(data)
}

fn allocate<'b>(layout: &Layout) -> Result<[Option<Plane<'b>>; 3], BufferError> {
    let mut planes = [None, None, None];
    for (i, slot) in planes.iter_mut().enumerate().take(layout.plane_count()) {
        *slot = Some(Plane::Owned(alloc_zeroed(layout.plane_len(i))?));
    }
    Ok(planes)
}

// ---------------------------------------------------------------------------
// ImageBuffer
// ---------------------------------------------------------------------------

/// Multi-format, multi-plane pixel buffer.
///
/// Created in one of four ways:
///
/// - [`ImageBuffer::default()`]: empty, no planes, not valid.
/// - [`ImageBuffer::new`] / [`new_aligned`](Self::new_aligned): owned,
///   zero-filled planes sized from the [`Layout`].
/// - [`from_slice`](Self::from_slice) / [`from_slice_mut`](Self::from_slice_mut):
///   one borrowed buffer holding every plane.
/// - [`from_planes`](Self::from_planes) / [`from_planes_mut`](Self::from_planes_mut):
///   one to three borrowed planes.
///
/// `Clone` always deep-copies into owned planes, whatever the source
/// storage. Rotation is metadata only and never moves bytes.
///
/// # Example
///
/// ```
/// use refocus_image::{DataType, ImageBuffer, PixelFormat, StoreMode};
///
/// let mut img = ImageBuffer::new(640, 480, PixelFormat::Nv12, DataType::U8, StoreMode::LumaChroma)?;
/// assert_eq!(img.total(), 640 * 480);
/// assert_eq!(img.plane_len(1), 640 * 240);
///
/// img.set_image_wh(600, 400)?;
/// assert_eq!((img.width(), img.height()), (640, 480));
/// # Ok::<(), refocus_image::BufferError>(())
/// ```
#[derive(Default)]
pub struct ImageBuffer<'a> {
    planes: [Option<Plane<'a>>; 3],
    layout: Layout,
    rotation: Rotation,
    capture: CaptureInfo,
}

impl ImageBuffer<'static> {
    /// Allocate zero-filled, owned planes.
    ///
    /// Rotation is 0 and no alignment padding is applied.
    ///
    /// # Errors
    ///
    /// Layout errors (see [`Layout::aligned`]) or
    /// [`BufferError::AllocationFailed`].
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        store: StoreMode,
    ) -> Result<Self, BufferError> {
        Self::with_layout(Layout::new(width, height, format, data_type, store)?)
    }

    /// Allocate owned planes with the matrix padded per `align`.
    ///
    /// `width`/`height` become the content extent.
    pub fn new_aligned(
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        store: StoreMode,
        align: AlignMode,
    ) -> Result<Self, BufferError> {
        Self::with_layout(Layout::aligned(
            width, height, format, data_type, store, align,
        )?)
    }

    /// Allocate owned planes for a resolved layout.
    pub fn with_layout(layout: Layout) -> Result<Self, BufferError> {
        let planes = allocate(&layout)?;
        debug!(
            width = layout.width(),
            height = layout.height(),
            format = ?layout.format(),
            bytes = layout.byte_len(),
            "allocated image buffer"
        );
        Ok(Self {
            planes,
            layout,
            rotation: Rotation::Deg0,
            capture: CaptureInfo::default(),
        })
    }
}

impl<'a> ImageBuffer<'a> {
    /// Empty buffer with no planes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap one read-only buffer holding every plane in
    /// [`StoreMode::All`] order.
    ///
    /// The slice is never freed or written by the buffer. Extra bytes past
    /// the layout size are ignored.
    ///
    /// # Errors
    ///
    /// Layout errors, or [`BufferError::InsufficientData`] if `data` is
    /// too small.
    pub fn from_slice(
        width: u32,
        height: u32,
        data: &'a [u8],
        format: PixelFormat,
        data_type: DataType,
        rotation: Rotation,
    ) -> Result<Self, BufferError> {
        Self::wrap(
            width,
            height,
            [Borrow::Shared(data)],
            format,
            data_type,
            rotation,
        )
    }

    /// Like [`from_slice`](Self::from_slice) but writable, so the buffer can
    /// be a [`copy_to`](Self::copy_to) target or backend output.
    pub fn from_slice_mut(
        width: u32,
        height: u32,
        data: &'a mut [u8],
        format: PixelFormat,
        data_type: DataType,
        rotation: Rotation,
    ) -> Result<Self, BufferError> {
        Self::wrap(
            width,
            height,
            [Borrow::Unique(data)],
            format,
            data_type,
            rotation,
        )
    }

    /// Wrap one to three read-only planes.
    ///
    /// The plane count selects the store mode: one plane is
    /// [`StoreMode::All`], two is [`StoreMode::LumaChroma`], three is
    /// [`StoreMode::Separate`]. Chroma planes follow the format's memory
    /// order (U before V for I420, V before U for YV12).
    ///
    /// # Errors
    ///
    /// [`BufferError::PlaneCountMismatch`] for zero or more than three
    /// planes, layout errors, or [`BufferError::InsufficientData`].
    pub fn from_planes<I>(
        width: u32,
        height: u32,
        planes: I,
        format: PixelFormat,
        data_type: DataType,
        rotation: Rotation,
    ) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        Self::wrap(
            width,
            height,
            planes.into_iter().map(Borrow::Shared),
            format,
            data_type,
            rotation,
        )
    }

    /// Writable variant of [`from_planes`](Self::from_planes).
    pub fn from_planes_mut<I>(
        width: u32,
        height: u32,
        planes: I,
        format: PixelFormat,
        data_type: DataType,
        rotation: Rotation,
    ) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = &'a mut [u8]>,
    {
        Self::wrap(
            width,
            height,
            planes.into_iter().map(Borrow::Unique),
            format,
            data_type,
            rotation,
        )
    }

    fn wrap<I>(
        width: u32,
        height: u32,
        planes: I,
        format: PixelFormat,
        data_type: DataType,
        rotation: Rotation,
    ) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = Borrow<'a>>,
    {
        let mut slots: [Option<Borrow<'a>>; 3] = [None, None, None];
        let mut count = 0;
        for borrow in planes {
            let slot = slots
                .get_mut(count)
                .ok_or(BufferError::PlaneCountMismatch)?;
            *slot = Some(borrow);
            count += 1;
        }
        let store = StoreMode::from_plane_count(count).ok_or(BufferError::PlaneCountMismatch)?;
        let layout = Layout::new(width, height, format, data_type, store)?;

        let mut planes: [Option<Plane<'a>>; 3] = [None, None, None];
        for (i, (slot, borrow)) in planes.iter_mut().zip(slots).enumerate() {
            if let Some(borrow) = borrow {
                *slot = Some(borrow.into_plane(layout.plane_len(i))?);
            }
        }
        Ok(Self {
            planes,
            layout,
            rotation,
            capture: CaptureInfo::default(),
        })
    }

    /// Re-initialize as a freshly allocated owned buffer.
    ///
    /// Prior owned storage is released and metadata reset. On error the
    /// buffer is left unchanged.
    pub fn create(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        store: StoreMode,
    ) -> Result<(), BufferError> {
        let layout = Layout::new(width, height, format, data_type, store)?;
        let planes = allocate(&layout)?;
        debug!(width, height, format = ?format, "re-created image buffer");
        *self = Self {
            planes,
            layout,
            rotation: Rotation::Deg0,
            capture: CaptureInfo::default(),
        };
        Ok(())
    }

    // --- Geometry ---

    /// Resolved plane geometry.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Matrix width (allocated, stride-relevant).
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    /// Matrix height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Content width, `<= width()`.
    #[inline]
    pub fn real_width(&self) -> u32 {
        self.layout.real_width()
    }

    /// Content height, `<= height()`.
    #[inline]
    pub fn real_height(&self) -> u32 {
        self.layout.real_height()
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format()
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.layout.data_type()
    }

    #[inline]
    pub fn store_mode(&self) -> StoreMode {
        self.layout.store_mode()
    }

    #[inline]
    pub fn align_mode(&self) -> AlignMode {
        self.layout.align_mode()
    }

    /// Samples per pixel in the primary plane.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Bytes per sample.
    #[inline]
    pub fn elem_size(&self) -> usize {
        self.layout.elem_size()
    }

    /// `width * height * channels * elem_size`. See [`Layout::total`];
    /// the size of `data1` is [`plane_len(0)`](Self::plane_len).
    #[inline]
    pub fn total(&self) -> usize {
        self.layout.total()
    }

    /// Bytes across all planes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.layout.byte_len()
    }

    /// Byte length of physical plane `index`; 0 if absent.
    #[inline]
    pub fn plane_len(&self, index: usize) -> usize {
        self.layout.plane_len(index)
    }

    /// Bytes per row of physical plane `index`.
    #[inline]
    pub fn stride(&self, index: usize) -> usize {
        self.layout.stride(index)
    }

    /// Update the content extent without touching the matrix or storage.
    ///
    /// # Errors
    ///
    /// [`BufferError::Empty`] on an empty buffer;
    /// [`BufferError::InvalidDimensions`] if the extent is zero or larger
    /// than the matrix.
    pub fn set_image_wh(&mut self, real_width: u32, real_height: u32) -> Result<(), BufferError> {
        if self.is_empty() {
            return Err(BufferError::Empty);
        }
        self.layout = self.layout.with_extent(real_width, real_height)?;
        Ok(())
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set rotation metadata. Pixel bytes are not moved.
    #[inline]
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    // --- Validity and ownership ---

    /// Whether no plane is present.
    pub fn is_empty(&self) -> bool {
        self.planes.iter().all(Option::is_none)
    }

    /// Whether dimensions, extent, plane count and plane sizes agree.
    pub fn is_valid(&self) -> bool {
        let layout = &self.layout;
        if layout.width() == 0
            || layout.height() == 0
            || layout.real_width() > layout.width()
            || layout.real_height() > layout.height()
        {
            return false;
        }
        let count = layout.plane_count();
        self.planes
            .iter()
            .enumerate()
            .all(|(i, plane)| match plane {
                Some(plane) => i < count && plane.bytes().len() >= layout.plane_len(i),
                None => i >= count,
            })
    }

    /// Whether every present plane is owned by this buffer.
    pub fn is_owned(&self) -> bool {
        !self.is_empty() && self.planes.iter().flatten().all(Plane::is_owned)
    }

    /// Whether every present plane can be written.
    pub fn is_writable(&self) -> bool {
        !self.is_empty() && self.planes.iter().flatten().all(Plane::is_writable)
    }

    // --- Plane access ---

    /// Bytes of physical plane `index`.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index)?.as_ref().map(Plane::bytes)
    }

    /// Mutable bytes of physical plane `index`; `None` if read-only.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index)?.as_mut()?.bytes_mut()
    }

    /// Primary plane: packed pixels, or Y (plus chroma in `All` mode).
    #[inline]
    pub fn data1(&self) -> Option<&[u8]> {
        self.plane(0)
    }

    /// Secondary plane: UV, or the first chroma plane.
    #[inline]
    pub fn data2(&self) -> Option<&[u8]> {
        self.plane(1)
    }

    /// Tertiary plane: the second chroma plane.
    #[inline]
    pub fn data3(&self) -> Option<&[u8]> {
        self.plane(2)
    }

    /// Bytes of format-defined plane `index` (Y, UV, U or V), whichever
    /// physical plane holds it.
    pub fn segment(&self, index: usize) -> Option<&[u8]> {
        let seg = *self.layout.segments().get(index)?;
        let bytes = self.planes[seg.plane].as_ref()?.bytes();
        bytes.get(seg.offset..seg.offset + seg.len())
    }

    /// Mutable variant of [`segment`](Self::segment).
    pub fn segment_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let seg = *self.layout.segments().get(index)?;
        let bytes = self.planes[seg.plane].as_mut()?.bytes_mut()?;
        bytes.get_mut(seg.offset..seg.offset + seg.len())
    }

    /// Row `y` of format-defined plane `segment`, including padding columns.
    pub fn row(&self, segment: usize, y: u32) -> Option<&[u8]> {
        let seg = *self.layout.segments().get(segment)?;
        if y >= seg.rows {
            return None;
        }
        let start = y as usize * seg.stride;
        self.segment(segment)?.get(start..start + seg.stride)
    }

    /// Mutable variant of [`row`](Self::row).
    pub fn row_mut(&mut self, segment: usize, y: u32) -> Option<&mut [u8]> {
        let seg = *self.layout.segments().get(segment)?;
        if y >= seg.rows {
            return None;
        }
        let start = y as usize * seg.stride;
        self.segment_mut(segment)?.get_mut(start..start + seg.stride)
    }

    // --- Duplication ---

    /// Deep-copy pixel bytes into an existing, compatible buffer.
    ///
    /// The target must have the same format, data type and matrix size and
    /// be writable; store modes may differ. The content extent and rotation
    /// are copied with the pixels. Capture metadata is not.
    ///
    /// # Errors
    ///
    /// [`BufferError::Empty`], [`BufferError::ShapeMismatch`] or
    /// [`BufferError::ReadOnly`]. The target is untouched on error.
    pub fn copy_to(&self, target: &mut ImageBuffer<'_>) -> Result<(), BufferError> {
        if self.is_empty() || target.is_empty() {
            return Err(BufferError::Empty);
        }
        if !self.layout.is_compatible(&target.layout) {
            return Err(BufferError::ShapeMismatch);
        }
        if !target.is_writable() {
            return Err(BufferError::ReadOnly);
        }
        let layout = target
            .layout
            .with_extent(self.real_width(), self.real_height())?;

        for index in 0..self.layout.segments().len() {
            let src = self.segment(index).ok_or(BufferError::InsufficientData)?;
            let dst = target
                .segment_mut(index)
                .ok_or(BufferError::InsufficientData)?;
            dst.copy_from_slice(src);
        }
        target.layout = layout;
        target.rotation = self.rotation;
        trace!(bytes = self.byte_len(), "copied image buffer");
        Ok(())
    }

    /// Replace `target` with a freshly allocated deep copy of this buffer.
    ///
    /// Memory `target` previously borrowed is left untouched.
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocationFailed`]; `target` is unchanged on error.
    pub fn clone_to(&self, target: &mut ImageBuffer<'_>) -> Result<(), BufferError> {
        *target = self.duplicate()?;
        Ok(())
    }

    /// Deep copy with fallible allocation.
    pub fn try_clone(&self) -> Result<ImageBuffer<'static>, BufferError> {
        self.duplicate()
    }

    /// Convert into a buffer owning all of its planes.
    ///
    /// Owned planes are moved, borrowed planes are copied.
    pub fn into_owned(self) -> ImageBuffer<'static> {
        ImageBuffer {
            planes: self.planes.map(|plane| plane.map(Plane::into_owned)),
            layout: self.layout,
            rotation: self.rotation,
            capture: self.capture,
        }
    }

    fn duplicate<'b>(&self) -> Result<ImageBuffer<'b>, BufferError> {
        let mut planes: [Option<Plane<'b>>; 3] = [None, None, None];
        for (slot, src) in planes.iter_mut().zip(&self.planes) {
            if let Some(src) = src {
                let bytes = src.bytes();
                let mut data = Vec::new();
                data.try_reserve_exact(bytes.len())
                    .map_err(|_| BufferError::AllocationFailed)?;
                data.extend_from_slice(bytes);
                *slot = Some(Plane::Owned(data));
            }
        }
        trace!(bytes = self.byte_len(), "cloned image buffer");
        Ok(ImageBuffer {
            planes,
            layout: self.layout,
            rotation: self.rotation,
            capture: self.capture.clone(),
        })
    }

    // --- Capture metadata ---

    #[inline]
    pub fn capture_info(&self) -> &CaptureInfo {
        &self.capture
    }

    #[inline]
    pub fn capture_info_mut(&mut self) -> &mut CaptureInfo {
        &mut self.capture
    }

    pub fn set_capture_info(&mut self, info: CaptureInfo) {
        self.capture = info;
    }

    #[inline]
    pub fn iso(&self) -> i32 {
        self.capture.iso
    }

    pub fn set_iso(&mut self, iso: i32) {
        self.capture.iso = iso;
    }

    #[inline]
    pub fn focus_point(&self) -> FocusPoint {
        self.capture.focus
    }

    #[inline]
    pub fn focus_x(&self) -> i32 {
        self.capture.focus.x
    }

    #[inline]
    pub fn focus_y(&self) -> i32 {
        self.capture.focus.y
    }

    pub fn set_focus_point(&mut self, x: i32, y: i32) {
        self.capture.focus = FocusPoint::new(x, y);
    }

    #[inline]
    pub fn f_number(&self) -> f32 {
        self.capture.f_number
    }

    pub fn set_f_number(&mut self, f_number: f32) {
        self.capture.f_number = f_number;
    }

    #[inline]
    pub fn is_watermark_on(&self) -> bool {
        self.capture.watermark
    }

    pub fn set_watermark(&mut self, on: bool) {
        self.capture.watermark = on;
    }

    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.capture.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.capture.timestamp = timestamp;
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.capture.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.capture.fov = fov;
    }

    /// Camera module label, if set.
    pub fn module_info(&self) -> Option<&str> {
        self.capture.module_info()
    }

    /// Set the camera module label. The text is copied.
    pub fn set_module_info(&mut self, info: impl Into<String>) {
        self.capture.module_info = Some(info.into());
    }

    // --- Typed views ---

    /// Packed 8-bit primary plane of `format`: (bytes, matrix width).
    fn packed_u8(&self, format: PixelFormat) -> Option<&[u8]> {
        if self.format() != format || self.data_type() != DataType::U8 {
            return None;
        }
        self.data1()
    }

    /// Zero-copy RGBA view of the content extent.
    pub fn as_rgba8(&self) -> Option<ImgRef<'_, RGBA8>> {
        let bytes = self.packed_u8(PixelFormat::Rgba)?;
        Some(self.view(bytes.as_rgba()))
    }

    /// Zero-copy BGRA view of the content extent.
    pub fn as_bgra8(&self) -> Option<ImgRef<'_, BGRA8>> {
        let bytes = self.packed_u8(PixelFormat::Bgra)?;
        Some(self.view(bytes.as_bgra()))
    }

    /// Zero-copy RGB view of the content extent.
    pub fn as_rgb8(&self) -> Option<ImgRef<'_, RGB8>> {
        let bytes = self.packed_u8(PixelFormat::Rgb)?;
        Some(self.view(bytes.as_rgb()))
    }

    /// Zero-copy 8-bit gray view of the content extent.
    pub fn as_gray8(&self) -> Option<ImgRef<'_, u8>> {
        let bytes = self.packed_u8(PixelFormat::Gray)?;
        Some(self.view(bytes))
    }

    fn view<'s, T>(&self, pixels: &'s [T]) -> ImgRef<'s, T> {
        Img::new_stride(
            pixels,
            self.real_width() as usize,
            self.real_height() as usize,
            self.width() as usize,
        )
    }

    /// Decode a float gray plane (e.g. a depth map) over the content extent.
    pub fn to_gray_f32(&self) -> Option<ImgVec<f32>> {
        if self.format() != PixelFormat::Gray || self.data_type() != DataType::F32 {
            return None;
        }
        Some(self.collect_gray(4, parse_f32))
    }

    /// Decode a 16-bit gray plane over the content extent.
    pub fn to_gray_u16(&self) -> Option<ImgVec<u16>> {
        if self.format() != PixelFormat::Gray || self.data_type() != DataType::U16 {
            return None;
        }
        Some(self.collect_gray(2, parse_u16))
    }

    fn collect_gray<T>(&self, elem: usize, parse: impl Fn(&[u8]) -> T) -> ImgVec<T> {
        let width = self.real_width() as usize;
        let height = self.real_height() as usize;
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..self.real_height() {
            if let Some(row) = self.row(0, y) {
                pixels.extend(row[..width * elem].chunks_exact(elem).map(&parse));
            }
        }
        Img::new(pixels, width, height)
    }
}

impl Clone for ImageBuffer<'_> {
    /// Deep copy into owned planes.
    fn clone(&self) -> Self {
        Self {
            planes: self
                .planes
                .each_ref()
                .map(|plane| plane.as_ref().map(Plane::to_owned_plane)),
            layout: self.layout,
            rotation: self.rotation,
            capture: self.capture.clone(),
        }
    }
}

impl fmt::Debug for ImageBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = if self.is_empty() {
            "empty"
        } else if self.is_owned() {
            "owned"
        } else {
            "borrowed"
        };
        write!(
            f,
            "ImageBuffer({}x{} of {}x{}, {:?} {:?} {:?}, {}°, {})",
            self.real_width(),
            self.real_height(),
            self.width(),
            self.height(),
            self.format(),
            self.data_type(),
            self.store_mode(),
            self.rotation.degrees(),
            storage
        )
    }
}

// ---------------------------------------------------------------------------
// imgref → ImageBuffer (borrowed)
// ---------------------------------------------------------------------------

/// Wrap an 8-bit image. The stride becomes the matrix width and the image
/// width the content extent; the buffer must hold a full last row.
macro_rules! impl_from_imgref {
    ($pixel:ty, $format:expr) => {
        impl<'a> TryFrom<ImgRef<'a, $pixel>> for ImageBuffer<'a> {
            type Error = BufferError;

            fn try_from(img: ImgRef<'a, $pixel>) -> Result<Self, BufferError> {
                let (width, height, stride) = (img.width(), img.height(), img.stride());
                let bytes: &'a [u8] = img.into_buf().as_bytes();
                from_imgref_bytes(bytes, width, height, stride, $format)
            }
        }
    };
}

impl_from_imgref!(RGBA8, PixelFormat::Rgba);
impl_from_imgref!(BGRA8, PixelFormat::Bgra);
impl_from_imgref!(RGB8, PixelFormat::Rgb);

impl<'a> TryFrom<ImgRef<'a, u8>> for ImageBuffer<'a> {
    type Error = BufferError;

    fn try_from(img: ImgRef<'a, u8>) -> Result<Self, BufferError> {
        let (width, height, stride) = (img.width(), img.height(), img.stride());
        from_imgref_bytes(img.into_buf(), width, height, stride, PixelFormat::Gray)
    }
}

fn from_imgref_bytes(
    bytes: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
) -> Result<ImageBuffer<'_>, BufferError> {
    let to_u32 = |v: usize| u32::try_from(v).map_err(|_| BufferError::InvalidDimensions);
    let mut buffer = ImageBuffer::from_slice(
        to_u32(stride)?,
        to_u32(height)?,
        bytes,
        format,
        DataType::U8,
        Rotation::Deg0,
    )?;
    buffer.set_image_wh(to_u32(width)?, to_u32(height)?)?;
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
