//! Validating wrapper around a [`Refocus`] backend.

use alloc::string::String;
use core::fmt;

use tracing::{debug, warn};

use crate::host::ResultCode;
use crate::traits::{Refocus, RefocusParams};
use crate::{
    BackendCapabilities, BufferError, DataType, ImageBuffer, LimitExceeded, PixelFormat,
    ResourceLimits, Rotation, Stop, StopReason,
};

/// Why a session call was rejected or failed.
#[derive(Debug)]
#[non_exhaustive]
pub enum RefocusError<E> {
    /// An input or output buffer is empty, invalid or read-only.
    InvalidImage(BufferError),
    /// The backend does not accept this format, data type or rotation.
    UnsupportedInput,
    /// An input exceeds the session's resource limits.
    Limit(LimitExceeded),
    /// `run` was called before a successful `set_images`.
    ImagesNotSet,
    /// The f-number is not a finite positive value.
    InvalidAperture,
    /// The focus point lies outside the main image.
    FocusOutOfBounds,
    /// The output buffer does not match the main image's shape.
    OutputMismatch,
    /// The stop token fired before the backend ran.
    Cancelled(StopReason),
    /// The backend reported an error.
    Backend(E),
}

impl<E: fmt::Display> fmt::Display for RefocusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(e) => write!(f, "invalid image: {e}"),
            Self::UnsupportedInput => write!(f, "input not supported by backend"),
            Self::Limit(e) => write!(f, "limit exceeded: {e}"),
            Self::ImagesNotSet => write!(f, "images have not been set"),
            Self::InvalidAperture => write!(f, "f-number must be finite and positive"),
            Self::FocusOutOfBounds => write!(f, "focus point is outside the image"),
            Self::OutputMismatch => write!(f, "output buffer does not match the main image"),
            Self::Cancelled(reason) => write!(f, "refocus stopped: {reason:?}"),
            Self::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for RefocusError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidImage(e) => Some(e),
            Self::Limit(e) => Some(e),
            Self::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<BufferError> for RefocusError<E> {
    fn from(e: BufferError) -> Self {
        Self::InvalidImage(e)
    }
}

impl<E> From<LimitExceeded> for RefocusError<E> {
    fn from(e: LimitExceeded) -> Self {
        Self::Limit(e)
    }
}

/// Shape of the loaded main image, kept for validating `run`.
#[derive(Clone, Copy, Debug)]
struct MainShape {
    format: PixelFormat,
    real_width: u32,
    real_height: u32,
    rotation: Rotation,
}

/// Drives a [`Refocus`] backend, rejecting inputs it cannot handle.
///
/// # Example
///
/// ```ignore
/// let mut session = RefocusSession::new(backend)
///     .with_limits(ResourceLimits::none().with_max_pixels(50_000_000));
/// session.set_images(&main, &depth)?;
/// session.run(&RefocusParams::new(320, 240, 2.0), &mut out, &Unstoppable)?;
/// ```
pub struct RefocusSession<B> {
    backend: B,
    limits: ResourceLimits,
    main: Option<MainShape>,
}

impl<B: Refocus> RefocusSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            limits: ResourceLimits::none(),
            main: None,
        }
    }

    /// Limits applied to both inputs in [`set_images`](Self::set_images).
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn capabilities(&self) -> &BackendCapabilities {
        self.backend.capabilities()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Whether images have been loaded successfully.
    pub fn has_images(&self) -> bool {
        self.main.is_some()
    }

    /// Validate and load the main image and its depth map.
    ///
    /// A failed call leaves the session without images.
    pub fn set_images(
        &mut self,
        main: &ImageBuffer<'_>,
        depth: &ImageBuffer<'_>,
    ) -> Result<(), RefocusError<B::Error>> {
        self.main = None;
        let caps = *self.backend.capabilities();

        check_buffer(main).inspect_err(|e| warn!(error = %e, "main image rejected"))?;
        check_buffer(depth).inspect_err(|e| warn!(error = %e, "depth map rejected"))?;

        let main_ok = main.data_type() == DataType::U8
            && match main.format() {
                PixelFormat::Rgba => true,
                PixelFormat::Bgra => caps.main_bgra(),
                _ => false,
            };
        if !main_ok {
            warn!(format = ?main.format(), data_type = ?main.data_type(), "unsupported main image");
            return Err(RefocusError::UnsupportedInput);
        }
        if depth.format() != PixelFormat::Gray || !caps.supports_depth(depth.data_type()) {
            warn!(format = ?depth.format(), data_type = ?depth.data_type(), "unsupported depth map");
            return Err(RefocusError::UnsupportedInput);
        }
        if !caps.rotated_input()
            && !(main.rotation().is_identity() && depth.rotation().is_identity())
        {
            warn!(
                main = main.rotation().degrees(),
                depth = depth.rotation().degrees(),
                "rotated input not supported"
            );
            return Err(RefocusError::UnsupportedInput);
        }
        if self.limits.has_any() {
            main.layout()
                .check_limits(&self.limits)
                .and_then(|()| depth.layout().check_limits(&self.limits))
                .inspect_err(|e| warn!(error = %e, "input over limit"))?;
        }

        self.backend
            .set_images(main, depth)
            .map_err(RefocusError::Backend)?;
        self.main = Some(MainShape {
            format: main.format(),
            real_width: main.real_width(),
            real_height: main.real_height(),
            rotation: main.rotation(),
        });
        debug!(
            width = main.real_width(),
            height = main.real_height(),
            depth_type = ?depth.data_type(),
            "refocus images set"
        );
        Ok(())
    }

    /// Validate parameters and output, then run the backend.
    pub fn run(
        &mut self,
        params: &RefocusParams,
        out: &mut ImageBuffer<'_>,
        stop: &dyn Stop,
    ) -> Result<(), RefocusError<B::Error>> {
        let main = self.main.ok_or(RefocusError::ImagesNotSet)?;

        if !(params.f_number.is_finite() && params.f_number > 0.0) {
            warn!(f_number = params.f_number, "invalid aperture");
            return Err(RefocusError::InvalidAperture);
        }
        let (display_w, display_h) = main
            .rotation
            .display_dimensions(main.real_width, main.real_height);
        let focus = params.focus;
        if focus.x < 0 || focus.y < 0 || focus.x as u32 >= display_w || focus.y as u32 >= display_h
        {
            warn!(x = focus.x, y = focus.y, "focus point out of bounds");
            return Err(RefocusError::FocusOutOfBounds);
        }

        check_buffer(out)?;
        if !out.is_writable() {
            return Err(RefocusError::InvalidImage(BufferError::ReadOnly));
        }
        if out.format() != main.format
            || out.data_type() != DataType::U8
            || out.real_width() != main.real_width
            || out.real_height() != main.real_height
        {
            warn!(output = ?out, "output buffer does not match main image");
            return Err(RefocusError::OutputMismatch);
        }

        stop.check().map_err(RefocusError::Cancelled)?;
        debug!(
            x = focus.x,
            y = focus.y,
            f_number = params.f_number,
            "running refocus"
        );
        self.backend
            .run(params, out, stop)
            .map_err(RefocusError::Backend)
    }

    /// [`run`](Self::run), reduced to a host result code.
    pub fn run_code(
        &mut self,
        params: &RefocusParams,
        out: &mut ImageBuffer<'_>,
        stop: &dyn Stop,
    ) -> ResultCode {
        ResultCode::from(self.run(params, out, stop))
    }

    pub fn version(&self) -> &str {
        self.backend.version()
    }

    pub fn full_version(&self, flags: i32) -> String {
        self.backend.full_version(flags)
    }
}

fn check_buffer(img: &ImageBuffer<'_>) -> Result<(), BufferError> {
    if img.is_empty() {
        return Err(BufferError::Empty);
    }
    if !img.is_valid() {
        return Err(BufferError::InvalidDimensions);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StoreMode, Unstoppable};
    use alloc::format;

    #[derive(Debug, PartialEq)]
    struct Fail;

    impl fmt::Display for Fail {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("fail")
        }
    }

    impl core::error::Error for Fail {}

    #[derive(Default)]
    struct Recorder {
        caps: BackendCapabilities,
        set_calls: usize,
        run_calls: usize,
    }

    impl Refocus for Recorder {
        type Error = Fail;

        fn capabilities(&self) -> &BackendCapabilities {
            &self.caps
        }

        fn set_images(&mut self, _: &ImageBuffer<'_>, _: &ImageBuffer<'_>) -> Result<(), Fail> {
            self.set_calls += 1;
            Ok(())
        }

        fn run(
            &mut self,
            _: &RefocusParams,
            out: &mut ImageBuffer<'_>,
            _: &dyn Stop,
        ) -> Result<(), Fail> {
            self.run_calls += 1;
            if let Some(plane) = out.plane_mut(0) {
                plane.fill(0xff);
            }
            Ok(())
        }

        fn version(&self) -> &str {
            "recorder"
        }
    }

    fn session() -> RefocusSession<Recorder> {
        RefocusSession::new(Recorder {
            caps: BackendCapabilities::new().with_depth_f32(true),
            ..Recorder::default()
        })
    }

    fn rgba(w: u32, h: u32) -> ImageBuffer<'static> {
        ImageBuffer::new(w, h, PixelFormat::Rgba, DataType::U8, StoreMode::All).unwrap()
    }

    fn depth(w: u32, h: u32) -> ImageBuffer<'static> {
        ImageBuffer::new(w, h, PixelFormat::Gray, DataType::F32, StoreMode::All).unwrap()
    }

    #[test]
    fn run_before_set_images() {
        let mut s = session();
        let mut out = rgba(4, 4);
        let err = s
            .run(&RefocusParams::new(0, 0, 2.0), &mut out, &Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RefocusError::ImagesNotSet));
        assert_eq!(s.backend().run_calls, 0);
    }

    #[test]
    fn happy_path() {
        let mut s = session();
        s.set_images(&rgba(8, 6), &depth(8, 6)).unwrap();
        assert!(s.has_images());
        let mut out = rgba(8, 6);
        s.run(&RefocusParams::new(7, 5, 1.4), &mut out, &Unstoppable)
            .unwrap();
        assert!(out.data1().unwrap().iter().all(|&b| b == 0xff));
        assert_eq!(s.backend().set_calls, 1);
        assert_eq!(s.backend().run_calls, 1);
    }

    #[test]
    fn rejects_wrong_formats() {
        let mut s = session();
        let gray = ImageBuffer::new(4, 4, PixelFormat::Gray, DataType::U8, StoreMode::All).unwrap();
        assert!(matches!(
            s.set_images(&gray, &depth(4, 4)),
            Err(RefocusError::UnsupportedInput)
        ));
        let bgra = ImageBuffer::new(4, 4, PixelFormat::Bgra, DataType::U8, StoreMode::All).unwrap();
        assert!(matches!(
            s.set_images(&bgra, &depth(4, 4)),
            Err(RefocusError::UnsupportedInput)
        ));
        let depth_u16 =
            ImageBuffer::new(4, 4, PixelFormat::Gray, DataType::U16, StoreMode::All).unwrap();
        assert!(matches!(
            s.set_images(&rgba(4, 4), &depth_u16),
            Err(RefocusError::UnsupportedInput)
        ));
        assert!(matches!(
            s.set_images(&ImageBuffer::default(), &depth(4, 4)),
            Err(RefocusError::InvalidImage(BufferError::Empty))
        ));
        assert_eq!(s.backend().set_calls, 0);
    }

    #[test]
    fn rotation_requires_capability() {
        let mut s = session();
        let mut main = rgba(4, 2);
        main.set_rotation(Rotation::Deg90);
        assert!(matches!(
            s.set_images(&main, &depth(4, 2)),
            Err(RefocusError::UnsupportedInput)
        ));

        let caps = BackendCapabilities::new()
            .with_depth_f32(true)
            .with_rotated_input(true);
        let mut s = RefocusSession::new(Recorder {
            caps,
            ..Recorder::default()
        });
        s.set_images(&main, &depth(4, 2)).unwrap();
        // Display extent is 2x4.
        let mut out = rgba(4, 2);
        assert!(s.run(&RefocusParams::new(1, 3, 2.0), &mut out, &Unstoppable).is_ok());
        assert!(matches!(
            s.run(&RefocusParams::new(3, 1, 2.0), &mut out, &Unstoppable),
            Err(RefocusError::FocusOutOfBounds)
        ));
    }

    #[test]
    fn limits_are_enforced() {
        let mut s = session().with_limits(ResourceLimits::none().with_max_pixels(15));
        let err = s.set_images(&rgba(4, 4), &depth(4, 4)).unwrap_err();
        assert!(matches!(err, RefocusError::Limit(LimitExceeded::Pixels { .. })));
        assert!(!s.has_images());
    }

    #[test]
    fn memory_limit_covers_depth_map() {
        // 8x8 RGBA8 and 8x8 F32 depth are both 256 bytes; the wider depth
        // map below is not.
        let limits = ResourceLimits::none().with_max_memory(256);
        let mut s = session().with_limits(limits);
        s.set_images(&rgba(8, 8), &depth(8, 8)).unwrap();
        let err = s.set_images(&rgba(8, 8), &depth(16, 8)).unwrap_err();
        assert!(matches!(
            err,
            RefocusError::Limit(LimitExceeded::Memory { actual: 512, max: 256 })
        ));
        assert!(!s.has_images());
    }

    #[test]
    fn no_limits_accepts_any_size() {
        let mut s = session();
        assert!(!s.limits().has_any());
        s.set_images(&rgba(256, 128), &depth(256, 128)).unwrap();
        assert!(s.has_images());
    }

    #[test]
    fn run_validates_params_and_output() {
        let mut s = session();
        s.set_images(&rgba(8, 8), &depth(8, 8)).unwrap();
        let mut out = rgba(8, 8);
        for f in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                s.run(&RefocusParams::new(1, 1, f), &mut out, &Unstoppable),
                Err(RefocusError::InvalidAperture)
            ));
        }
        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8)] {
            assert!(matches!(
                s.run(&RefocusParams::new(x, y, 2.0), &mut out, &Unstoppable),
                Err(RefocusError::FocusOutOfBounds)
            ));
        }
        let mut small = rgba(4, 4);
        assert!(matches!(
            s.run(&RefocusParams::new(1, 1, 2.0), &mut small, &Unstoppable),
            Err(RefocusError::OutputMismatch)
        ));
        let backing = [0u8; 8 * 8 * 4];
        let mut read_only = ImageBuffer::from_slice(
            8,
            8,
            &backing,
            PixelFormat::Rgba,
            DataType::U8,
            Rotation::Deg0,
        )
        .unwrap();
        assert!(matches!(
            s.run(&RefocusParams::new(1, 1, 2.0), &mut read_only, &Unstoppable),
            Err(RefocusError::InvalidImage(BufferError::ReadOnly))
        ));
        assert_eq!(s.backend().run_calls, 0);
    }

    #[test]
    fn run_code_maps_outcome() {
        let mut s = session();
        let mut out = rgba(2, 2);
        assert_eq!(
            s.run_code(&RefocusParams::new(0, 0, 2.0), &mut out, &Unstoppable),
            ResultCode::FAILURE
        );
        s.set_images(&rgba(2, 2), &depth(2, 2)).unwrap();
        let code = s.run_code(&RefocusParams::new(0, 0, 2.0), &mut out, &Unstoppable);
        assert_eq!(code, ResultCode::SUCCESS);
        assert!(code.is_success());
    }

    #[test]
    fn error_display() {
        let err: RefocusError<Fail> = RefocusError::Backend(Fail);
        assert_eq!(format!("{err}"), "backend error: fail");
        let err: RefocusError<Fail> = BufferError::ReadOnly.into();
        assert_eq!(format!("{err}"), "invalid image: target buffer is read-only");
    }

    #[test]
    fn error_source() {
        use core::error::Error;
        let err: RefocusError<Fail> = RefocusError::Backend(Fail);
        assert!(err.source().is_some());
        let err: RefocusError<Fail> = RefocusError::ImagesNotSet;
        assert!(err.source().is_none());
    }

    #[test]
    fn version_passthrough() {
        let s = session();
        assert_eq!(s.version(), "recorder");
        assert_eq!(s.full_version(1), "recorder");
    }
}
