//! Pixel formats and their plane structure.

/// Chroma arrangement of a pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    /// All channels interleaved per pixel in one plane.
    Packed,
    /// Luma plane plus one plane of interleaved chroma pairs (4:2:0).
    SemiPlanar,
    /// Luma plane plus two separate chroma planes (4:2:0).
    Planar,
}

/// Supported pixel formats.
///
/// Discriminants match the legacy `ImageType` numbering so raw values
/// coming from a host can be mapped with [`from_raw`](Self::from_raw).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelFormat {
    /// Single luminance channel.
    #[default]
    Gray = 0,
    /// Red, green, blue.
    Rgb = 1,
    /// Blue, green, red.
    Bgr = 2,
    /// Red, green, blue, alpha.
    Rgba = 3,
    /// Blue, green, red, alpha.
    Bgra = 4,
    /// Semi-planar YUV 4:2:0, chroma order UV (`YY..UVUV`).
    Nv12 = 5,
    /// Semi-planar YUV 4:2:0, chroma order VU (`YY..VUVU`).
    Nv21 = 6,
    /// Planar YUV 4:2:0 (`YY..UU..VV`).
    I420 = 7,
    /// Planar YUV 4:2:0 (`YY..VV..UU`).
    Yv12 = 8,
    /// Packed YUV 4:2:2, `Y0 U Y1 V` (alias YUY2).
    Yuyv = 9,
    /// Packed YUV 4:2:2, `Y0 V Y1 U`.
    Yvyu = 10,
    /// Packed YUV 4:2:2, `U Y0 V Y1`.
    Uyvy = 11,
    /// Packed YUV 4:2:2, `V Y0 U Y1`.
    Vyuy = 12,
}

impl PixelFormat {
    /// Every supported format, in discriminant order.
    pub const ALL: [PixelFormat; 13] = [
        Self::Gray,
        Self::Rgb,
        Self::Bgr,
        Self::Rgba,
        Self::Bgra,
        Self::Nv12,
        Self::Nv21,
        Self::I420,
        Self::Yv12,
        Self::Yuyv,
        Self::Yvyu,
        Self::Uyvy,
        Self::Vyuy,
    ];

    /// Map a legacy `ImageType` value. Returns `None` when out of range.
    pub const fn from_raw(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Legacy `ImageType` value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Interleaved samples per pixel in the primary plane.
    ///
    /// For 4:2:0 formats this counts the luma plane only; chroma geometry
    /// comes from [`Layout`](crate::Layout).
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
            Self::Yuyv | Self::Yvyu | Self::Uyvy | Self::Vyuy => 2,
            Self::Nv12 | Self::Nv21 | Self::I420 | Self::Yv12 => 1,
        }
    }

    /// How the format arranges its chroma.
    pub const fn plane_kind(self) -> PlaneKind {
        match self {
            Self::Nv12 | Self::Nv21 => PlaneKind::SemiPlanar,
            Self::I420 | Self::Yv12 => PlaneKind::Planar,
            _ => PlaneKind::Packed,
        }
    }

    /// Number of format-defined planes (1, 2 or 3).
    #[inline]
    pub const fn logical_planes(self) -> usize {
        match self.plane_kind() {
            PlaneKind::Packed => 1,
            PlaneKind::SemiPlanar => 2,
            PlaneKind::Planar => 3,
        }
    }

    /// Whether the format is one of the YUV variants.
    pub const fn is_yuv(self) -> bool {
        !matches!(
            self,
            Self::Gray | Self::Rgb | Self::Bgr | Self::Rgba | Self::Bgra
        )
    }

    /// Whether the format carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Bgra)
    }

    /// Whether the width must be even (horizontal chroma subsampling).
    pub const fn needs_even_width(self) -> bool {
        self.is_yuv()
    }

    /// Whether the height must be even (vertical chroma subsampling).
    pub const fn needs_even_height(self) -> bool {
        !matches!(self.plane_kind(), PlaneKind::Packed)
    }
}
