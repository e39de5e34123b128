//! Rotation metadata.

/// Anticlockwise rotation of the stored content relative to upright.
///
/// This is metadata only: setting it never moves pixel bytes. A consumer
/// rotates the content clockwise by this angle to display it upright.
/// Discriminants are the angle in degrees, matching the values hosts pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Rotation {
    /// Upright.
    #[default]
    Deg0 = 0,
    /// Content rotated 90 degrees anticlockwise.
    Deg90 = 90,
    /// Content rotated 180 degrees.
    Deg180 = 180,
    /// Content rotated 270 degrees anticlockwise (90 clockwise).
    Deg270 = 270,
}

impl Rotation {
    /// Create from an angle in degrees.
    ///
    /// Returns `None` for anything other than 0, 90, 180 or 270.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Angle in degrees.
    pub fn degrees(self) -> u16 {
        self as u16
    }

    /// Whether upright display swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Upright dimensions for the given stored dimensions.
    pub fn display_dimensions(self, stored_width: u32, stored_height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (stored_height, stored_width)
        } else {
            (stored_width, stored_height)
        }
    }

    /// Apply `other` on top of this rotation.
    pub fn then(self, other: Rotation) -> Rotation {
        let sum = (self.degrees() + other.degrees()) % 360;
        match sum {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Rotation that undoes this one.
    pub fn inverse(self) -> Rotation {
        match self {
            Self::Deg0 => Self::Deg0,
            Self::Deg90 => Self::Deg270,
            Self::Deg180 => Self::Deg180,
            Self::Deg270 => Self::Deg90,
        }
    }

    /// Whether the content is already upright.
    pub fn is_identity(self) -> bool {
        matches!(self, Self::Deg0)
    }
}
