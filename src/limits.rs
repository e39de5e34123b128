//! Resource limits for buffer allocation and backend inputs.
//!
//! [`ResourceLimits`] caps the size of buffers a caller is willing to
//! allocate or hand to a backend. [`LimitExceeded`] is returned when a
//! check fails.

/// Caps on buffer dimensions and memory.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use refocus_image::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(16_000_000)
///     .with_max_memory(256 * 1024 * 1024);
/// assert!(limits.check_dimensions(4000, 3000).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum matrix pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes across all planes of one buffer.
    pub max_memory_bytes: Option<u64>,
    /// Maximum matrix width in pixels.
    pub max_width: Option<u32>,
    /// Maximum matrix height in pixels.
    pub max_height: Option<u32>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum buffer size in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum width in pixels.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum height in pixels.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
    }

    /// Check dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a byte count against `max_memory_bytes`.
    pub fn check_memory(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_memory_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Memory { actual: bytes, max });
        }
        Ok(())
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Pixel count exceeded `max_pixels`.
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Buffer size exceeded `max_memory_bytes`.
    Memory {
        /// Buffer size in bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
            Self::Memory { actual, max } => {
                write!(f, "buffer size {actual} bytes exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn unlimited_accepts_anything() {
        let limits = ResourceLimits::none();
        assert!(!limits.has_any());
        assert_eq!(limits.check_dimensions(u32::MAX, u32::MAX), Ok(()));
        assert_eq!(limits.check_memory(u64::MAX), Ok(()));
    }

    #[test]
    fn any_single_limit_counts() {
        assert!(ResourceLimits::none().with_max_width(1).has_any());
        assert!(ResourceLimits::none().with_max_height(1).has_any());
        assert!(ResourceLimits::none().with_max_pixels(1).has_any());
        assert!(ResourceLimits::none().with_max_memory(1).has_any());
    }

    #[test]
    fn sensor_sized_frame() {
        // 12 MP main camera, capped at 4096 wide and 16 MP.
        let limits = ResourceLimits::none()
            .with_max_width(4096)
            .with_max_pixels(16_000_000);
        assert_eq!(limits.check_dimensions(4000, 3000), Ok(()));
        // Portrait orientation stays within both caps.
        assert_eq!(limits.check_dimensions(3000, 4000), Ok(()));
        assert_eq!(
            limits.check_dimensions(4608, 3456),
            Err(LimitExceeded::Width {
                actual: 4608,
                max: 4096
            })
        );
        assert_eq!(
            limits.check_dimensions(4096, 4096),
            Err(LimitExceeded::Pixels {
                actual: 16_777_216,
                max: 16_000_000
            })
        );
    }

    #[test]
    fn width_checked_before_height() {
        let limits = ResourceLimits::none().with_max_width(10).with_max_height(10);
        assert!(matches!(
            limits.check_dimensions(11, 11),
            Err(LimitExceeded::Width { .. })
        ));
        assert!(matches!(
            limits.check_dimensions(10, 11),
            Err(LimitExceeded::Height { actual: 11, max: 10 })
        ));
    }

    #[test]
    fn depth_map_memory() {
        // 1024x768 f32 depth map.
        let bytes = 1024 * 768 * 4;
        let limits = ResourceLimits::none().with_max_memory(bytes);
        assert_eq!(limits.check_memory(bytes), Ok(()));
        assert_eq!(
            limits.check_memory(bytes + 1),
            Err(LimitExceeded::Memory {
                actual: bytes + 1,
                max: bytes
            })
        );
    }

    #[test]
    fn messages() {
        let err = LimitExceeded::Height { actual: 9000, max: 8192 };
        assert_eq!(format!("{err}"), "height 9000 exceeds limit 8192");
        let err = LimitExceeded::Pixels { actual: 20, max: 16 };
        assert_eq!(format!("{err}"), "pixel count 20 exceeds limit 16");
    }
}
