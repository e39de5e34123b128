//! Element storage types.
//!
//! [`DataType`] is independent of the pixel format: a Gray plane can hold
//! 8-bit samples or 32-bit floats (depth maps) with the same geometry.

/// Storage type of one sample.
///
/// Discriminants are the legacy `DT_*` codes a host passes, not byte sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// 8-bit unsigned integer (`DT_8U`).
    #[default]
    U8 = 0,
    /// 32-bit floating point (`DT_32F`).
    F32 = 1,
    /// 16-bit unsigned integer (`DT_16U`).
    U16 = 2,
}

impl DataType {
    /// Map a legacy host code.
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::U8),
            1 => Some(Self::F32),
            2 => Some(Self::U16),
            _ => None,
        }
    }

    /// Legacy host code.
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Byte size of a single element.
    #[inline]
    pub const fn elem_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Bits per element.
    #[inline]
    pub const fn bit_depth(self) -> u8 {
        (self.elem_size() * 8) as u8
    }

    /// Whether elements are floating point.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }
}

#[inline]
pub(crate) fn parse_u16(bytes: &[u8]) -> u16 {
    u16::from_ne_bytes([bytes[0], bytes[1]])
}

#[inline]
pub(crate) fn parse_f32(bytes: &[u8]) -> f32 {
    f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
