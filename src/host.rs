//! Host boundary: wrapping host byte arrays and reporting integer results.
//!
//! Hosts hand over raw byte arrays plus dimensions and a rotation angle,
//! and expect a nonzero integer for success. These helpers wrap the arrays
//! as borrowed [`ImageBuffer`]s in the formats the refocus flow uses, so
//! no pixel data is copied on the way in or out.

use crate::{BufferError, DataType, ImageBuffer, PixelFormat, Rotation};

/// Integer result reported to the host. Nonzero means success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const SUCCESS: Self = Self(1);
    pub const FAILURE: Self = Self(0);

    #[inline]
    pub fn is_success(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl<T, E> From<Result<T, E>> for ResultCode {
    fn from(result: Result<T, E>) -> Self {
        if result.is_ok() {
            Self::SUCCESS
        } else {
            Self::FAILURE
        }
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> i32 {
        code.0
    }
}

fn rotation(degrees: i32) -> Result<Rotation, BufferError> {
    Rotation::from_degrees(degrees).ok_or(BufferError::InvalidRotation)
}

/// Wrap a host RGBA8 main image.
pub fn main_image(
    data: &[u8],
    width: u32,
    height: u32,
    rotation_degrees: i32,
) -> Result<ImageBuffer<'_>, BufferError> {
    ImageBuffer::from_slice(
        width,
        height,
        data,
        PixelFormat::Rgba,
        DataType::U8,
        rotation(rotation_degrees)?,
    )
}

/// Wrap a host depth map of native-endian `f32` samples.
pub fn depth_image(
    data: &[u8],
    width: u32,
    height: u32,
    rotation_degrees: i32,
) -> Result<ImageBuffer<'_>, BufferError> {
    ImageBuffer::from_slice(
        width,
        height,
        data,
        PixelFormat::Gray,
        DataType::F32,
        rotation(rotation_degrees)?,
    )
}

/// Wrap a host-owned RGBA8 output array, upright.
pub fn output_image(
    data: &mut [u8],
    width: u32,
    height: u32,
) -> Result<ImageBuffer<'_>, BufferError> {
    ImageBuffer::from_slice_mut(
        width,
        height,
        data,
        PixelFormat::Rgba,
        DataType::U8,
        Rotation::Deg0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn result_code_values() {
        assert!(ResultCode::SUCCESS.is_success());
        assert!(!ResultCode::FAILURE.is_success());
        assert!(ResultCode(-3).is_success());
        assert_eq!(i32::from(ResultCode::SUCCESS), 1);
        assert_eq!(ResultCode::from(Ok::<(), ()>(())), ResultCode::SUCCESS);
        assert_eq!(ResultCode::from(Err::<(), _>("no")), ResultCode::FAILURE);
    }

    #[test]
    fn main_image_wraps_rgba() {
        let data = vec![0u8; 6 * 4 * 4];
        let img = main_image(&data, 6, 4, 270).unwrap();
        assert_eq!(img.format(), PixelFormat::Rgba);
        assert_eq!(img.rotation(), Rotation::Deg270);
        assert_eq!(img.data1().unwrap().as_ptr(), data.as_ptr());
        assert!(!img.is_writable());
    }

    #[test]
    fn depth_image_wraps_f32() {
        let data = vec![0u8; 6 * 4 * 4];
        let img = depth_image(&data, 6, 4, 0).unwrap();
        assert_eq!(img.format(), PixelFormat::Gray);
        assert_eq!(img.data_type(), DataType::F32);
        assert_eq!(img.total(), data.len());
    }

    #[test]
    fn bad_rotation_rejected() {
        let data = vec![0u8; 16];
        assert_eq!(
            main_image(&data, 2, 2, 45).unwrap_err(),
            BufferError::InvalidRotation
        );
        assert_eq!(
            depth_image(&data, 2, 2, -90).unwrap_err(),
            BufferError::InvalidRotation
        );
    }

    #[test]
    fn output_image_is_writable() {
        let mut data = vec![0u8; 2 * 2 * 4];
        {
            let mut out = output_image(&mut data, 2, 2).unwrap();
            assert!(out.is_writable());
            out.plane_mut(0).unwrap()[0] = 42;
        }
        assert_eq!(data[0], 42);
        assert_eq!(
            output_image(&mut data, 3, 3).unwrap_err(),
            BufferError::InsufficientData
        );
    }
}
