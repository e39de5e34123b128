//! Plane geometry: store modes, alignment and per-plane sizes.
//!
//! A [`Layout`] is computed once from the requested dimensions, format,
//! data type, store mode and alignment. Every size it reports has already
//! been overflow-checked, so buffer code can slice without re-validating.

use crate::format::{PixelFormat, PlaneKind};
use crate::limits::{LimitExceeded, ResourceLimits};
use crate::pixel::DataType;
use crate::BufferError;

/// Alignment boundary in pixels applied by [`AlignMode`].
pub const ALIGNMENT: u32 = 64;

/// How many physical buffers back a multi-plane format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StoreMode {
    /// One buffer holding every plane back to back.
    #[default]
    All = 0,
    /// Y in one buffer, all chroma in a second (`STORE_Y_UV`).
    LumaChroma = 1,
    /// Y, first chroma and second chroma in three buffers (`STORE_Y_U_V`).
    Separate = 2,
}

impl StoreMode {
    /// Number of physical buffers this mode uses.
    #[inline]
    pub const fn plane_count(self) -> usize {
        match self {
            Self::All => 1,
            Self::LumaChroma => 2,
            Self::Separate => 3,
        }
    }

    /// Store mode implied by a number of caller-supplied buffers.
    pub const fn from_plane_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::All),
            2 => Some(Self::LumaChroma),
            3 => Some(Self::Separate),
            _ => None,
        }
    }

    /// Whether `format` can be split this way.
    ///
    /// Packed formats only support [`All`](Self::All). Semi-planar chroma is
    /// interleaved and cannot be split into [`Separate`](Self::Separate).
    pub const fn supports(self, format: PixelFormat) -> bool {
        match (self, format.plane_kind()) {
            (Self::All, _) => true,
            (Self::LumaChroma, PlaneKind::SemiPlanar | PlaneKind::Planar) => true,
            (Self::Separate, PlaneKind::Planar) => true,
            _ => false,
        }
    }
}

/// Which allocated dimensions are padded to [`ALIGNMENT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlignMode {
    /// No padding.
    #[default]
    None = 0,
    /// Width padded.
    Width = 1,
    /// Height padded.
    Height = 2,
    /// Width and height padded.
    Both = 3,
}

impl AlignMode {
    const fn pads_width(self) -> bool {
        matches!(self, Self::Width | Self::Both)
    }

    const fn pads_height(self) -> bool {
        matches!(self, Self::Height | Self::Both)
    }
}

/// Placement of one format-defined plane inside a physical buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Physical buffer index (0, 1 or 2).
    pub plane: usize,
    /// Byte offset inside the physical buffer.
    pub offset: usize,
    /// Bytes per row.
    pub stride: usize,
    /// Number of rows.
    pub rows: u32,
}

impl Segment {
    /// Byte length of the segment.
    #[inline]
    pub const fn len(&self) -> usize {
        self.stride * self.rows as usize
    }

    /// Whether the segment holds no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolved geometry of an image buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Layout {
    width: u32,
    height: u32,
    real_width: u32,
    real_height: u32,
    format: PixelFormat,
    data_type: DataType,
    store: StoreMode,
    align: AlignMode,
    segments: [Segment; 3],
    segment_count: usize,
    plane_lens: [usize; 3],
    total: usize,
}

impl Layout {
    /// Geometry of an empty buffer: zero dimensions, no planes.
    pub const EMPTY: Self = Self {
        width: 0,
        height: 0,
        real_width: 0,
        real_height: 0,
        format: PixelFormat::Gray,
        data_type: DataType::U8,
        store: StoreMode::All,
        align: AlignMode::None,
        segments: [Segment {
            plane: 0,
            offset: 0,
            stride: 0,
            rows: 0,
        }; 3],
        segment_count: 0,
        plane_lens: [0; 3],
        total: 0,
    };

    /// Unpadded geometry.
    ///
    /// # Errors
    ///
    /// See [`aligned`](Self::aligned).
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        store: StoreMode,
    ) -> Result<Self, BufferError> {
        Self::aligned(width, height, format, data_type, store, AlignMode::None)
    }

    /// Geometry with the matrix padded according to `align`.
    ///
    /// The requested `width`/`height` become the content extent.
    ///
    /// # Errors
    ///
    /// - [`BufferError::InvalidDimensions`] for zero sizes, odd sizes on
    ///   subsampled formats, or sizes that overflow.
    /// - [`BufferError::UnsupportedStoreMode`] when `format` cannot be split
    ///   as `store` asks.
    pub fn aligned(
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        store: StoreMode,
        align: AlignMode,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        if (format.needs_even_width() && width % 2 != 0)
            || (format.needs_even_height() && height % 2 != 0)
        {
            return Err(BufferError::InvalidDimensions);
        }
        if !store.supports(format) {
            return Err(BufferError::UnsupportedStoreMode);
        }

        let matrix_width = if align.pads_width() {
            width
                .checked_next_multiple_of(ALIGNMENT)
                .ok_or(BufferError::InvalidDimensions)?
        } else {
            width
        };
        let matrix_height = if align.pads_height() {
            height
                .checked_next_multiple_of(ALIGNMENT)
                .ok_or(BufferError::InvalidDimensions)?
        } else {
            height
        };

        let elem = data_type.elem_size();
        let luma_stride = (matrix_width as usize)
            .checked_mul(format.channels())
            .and_then(|v| v.checked_mul(elem))
            .ok_or(BufferError::InvalidDimensions)?;
        let total = luma_stride
            .checked_mul(matrix_height as usize)
            .ok_or(BufferError::InvalidDimensions)?;

        // (stride, rows) per logical plane, in memory order.
        let mut logical = [(0usize, 0u32); 3];
        logical[0] = (luma_stride, matrix_height);
        match format.plane_kind() {
            PlaneKind::Packed => {}
            PlaneKind::SemiPlanar => {
                logical[1] = (luma_stride, matrix_height / 2);
            }
            PlaneKind::Planar => {
                logical[1] = (luma_stride / 2, matrix_height / 2);
                logical[2] = (luma_stride / 2, matrix_height / 2);
            }
        }

        let segment_count = format.logical_planes();
        let mut segments = [Segment::default(); 3];
        let mut plane_lens = [0usize; 3];
        for (i, &(stride, rows)) in logical.iter().take(segment_count).enumerate() {
            let plane = match store {
                StoreMode::All => 0,
                StoreMode::LumaChroma => i.min(1),
                StoreMode::Separate => i,
            };
            let len = stride
                .checked_mul(rows as usize)
                .ok_or(BufferError::InvalidDimensions)?;
            segments[i] = Segment {
                plane,
                offset: plane_lens[plane],
                stride,
                rows,
            };
            plane_lens[plane] = plane_lens[plane]
                .checked_add(len)
                .ok_or(BufferError::InvalidDimensions)?;
        }
        // Sum of all planes must also be addressable.
        plane_lens
            .iter()
            .try_fold(0usize, |acc, &len| acc.checked_add(len))
            .ok_or(BufferError::InvalidDimensions)?;

        Ok(Self {
            width: matrix_width,
            height: matrix_height,
            real_width: width,
            real_height: height,
            format,
            data_type,
            store,
            align,
            segments,
            segment_count,
            plane_lens,
            total,
        })
    }

    /// Same geometry with a different content extent.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] if the extent is zero or larger
    /// than the matrix.
    pub fn with_extent(mut self, real_width: u32, real_height: u32) -> Result<Self, BufferError> {
        if real_width == 0
            || real_height == 0
            || real_width > self.width
            || real_height > self.height
        {
            return Err(BufferError::InvalidDimensions);
        }
        self.real_width = real_width;
        self.real_height = real_height;
        Ok(self)
    }

    /// Matrix width (allocated, stride-relevant).
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Matrix height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Content width.
    #[inline]
    pub fn real_width(&self) -> u32 {
        self.real_width
    }

    /// Content height.
    #[inline]
    pub fn real_height(&self) -> u32 {
        self.real_height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn store_mode(&self) -> StoreMode {
        self.store
    }

    #[inline]
    pub fn align_mode(&self) -> AlignMode {
        self.align
    }

    /// Number of physical buffers (0 for [`EMPTY`](Self::EMPTY)).
    pub fn plane_count(&self) -> usize {
        if self.segment_count == 0 {
            0
        } else {
            self.store.plane_count()
        }
    }

    /// Byte length of physical buffer `index`; 0 if absent.
    pub fn plane_len(&self, index: usize) -> usize {
        self.plane_lens.get(index).copied().unwrap_or(0)
    }

    /// Format-defined planes in memory order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments[..self.segment_count]
    }

    /// Bytes per row of the first format plane held in buffer `index`.
    pub fn stride(&self, index: usize) -> usize {
        self.segments()
            .iter()
            .find(|s| s.plane == index)
            .map_or(0, |s| s.stride)
    }

    /// `width * height * channels * elem_size` over the matrix.
    ///
    /// For 4:2:0 formats this is the luma plane only, in every store mode.
    /// Chroma sizes come from [`plane_len`](Self::plane_len), and the full
    /// footprint from [`byte_len`](Self::byte_len).
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Sum of all physical buffer sizes.
    pub fn byte_len(&self) -> usize {
        self.plane_lens.iter().sum()
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    #[inline]
    pub fn elem_size(&self) -> usize {
        self.data_type.elem_size()
    }

    /// Whether pixel bytes can be copied between the two layouts.
    ///
    /// Store modes may differ; format, data type and matrix size may not.
    pub fn is_compatible(&self, other: &Layout) -> bool {
        self.segment_count != 0
            && self.format == other.format
            && self.data_type == other.data_type
            && self.width == other.width
            && self.height == other.height
    }

    /// Check the matrix size and byte footprint against `limits`.
    pub fn check_limits(&self, limits: &ResourceLimits) -> Result<(), LimitExceeded> {
        limits.check_dimensions(self.width, self.height)?;
        limits.check_memory(self.byte_len() as u64)
    }
}
