//! Core types, collaborator traits and the error taxonomy.

use thiserror::Error;

/// Media bus pixel format code (e.g. 10-bit Bayer variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    /// Create a new `PixelFormat` from a raw media bus code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// 10-bit Bayer RGGB, packed 1x10.
    pub const SRGGB10: Self = Self::new(0x300f);
}

/// Frame interval as a fraction of a second (time per frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    /// Numerator in seconds.
    pub numerator: u32,
    /// Denominator in seconds.
    pub denominator: u32,
}

impl FrameInterval {
    /// Create a new frame interval of `numerator / denominator` seconds.
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

/// Active frame format: pixel format plus visible resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format.
    pub pixel_format: PixelFormat,
}

impl Format {
    /// Create a new format request.
    #[must_use]
    pub const fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
        }
    }
}

/// Width of a register access on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegWidth {
    /// Single byte register.
    U8,
    /// 16-bit register, big-endian on the wire.
    U16,
    /// 32-bit register, big-endian on the wire.
    U32,
}

impl RegWidth {
    /// Number of bytes transferred for this width.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Largest value representable at this width.
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::U8 => 0xFF,
            Self::U16 => 0xFFFF,
            Self::U32 => u32::MAX,
        }
    }
}

/// A single immutable register write, part of a static program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// 16-bit register address.
    pub address: u16,
    /// 8-bit value.
    pub value: u8,
}

/// Bus-level I/O failure. Never retried by the core; surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying bus reported an error.
    #[error("bus error accessing register 0x{address:04x}: {message}")]
    Bus {
        /// Register address of the failed access.
        address: u16,
        /// Backend-specific description.
        message: String,
    },
    /// A value does not fit the addressed register width.
    #[error("value 0x{value:x} does not fit a {width:?} register")]
    InvalidArgument {
        /// Requested access width.
        width: RegWidth,
        /// Rejected value.
        value: u32,
    },
}

/// Power or clock resource enablement failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to enable power resources: {0}")]
pub struct PowerError(pub String);

/// Fatal attach-time failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    /// Power resources could not be enabled.
    #[error(transparent)]
    Power(#[from] PowerError),
    /// The identity register could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The chip reported an unexpected identity.
    #[error("chip id mismatch: expected 0x{expected:04x}, found 0x{found:04x}")]
    IdentityMismatch {
        /// Identity the variant expects.
        expected: u16,
        /// Identity the hardware reported.
        found: u32,
    },
}

/// Format negotiation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// No catalog mode produces the requested pixel format.
    #[error("unsupported pixel format {0:?}")]
    Unsupported(PixelFormat),
}

/// Failure during the start-streaming sequence, tagged with the phase that
/// failed so callers can tell common programming from mode programming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Streaming was requested while the device is powered off.
    #[error("device is not powered")]
    NotPowered,
    /// The common register program failed.
    #[error("common register program failed: {0}")]
    CommonRegisters(TransportError),
    /// The per-mode register program failed.
    #[error("mode register program failed: {0}")]
    ModeRegisters(TransportError),
    /// Replaying a control value failed.
    #[error("control replay failed: {0}")]
    ControlReplay(crate::controls::ControlError),
    /// The final mode-select write failed.
    #[error("mode select write failed: {0}")]
    ModeSelect(TransportError),
}

/// Register-oriented bus the sensor hangs off. The core issues strictly
/// serialized accesses; implementations may block on the bus.
pub trait RegisterTransport {
    /// Read a register of the given width.
    fn read(&mut self, address: u16, width: RegWidth) -> Result<u32, TransportError>;

    /// Write a register of the given width. Values that do not fit `width`
    /// must be rejected with `InvalidArgument` before touching the bus.
    fn write(&mut self, address: u16, width: RegWidth, value: u32)
        -> Result<(), TransportError>;
}

/// Opaque power/clock/reset capability. After `enable()` returns the core
/// still honours the sensor's settle delay before any register access.
pub trait PowerControl {
    /// Enable supplies, clock and release reset.
    fn enable(&mut self) -> Result<(), PowerError>;

    /// Disable resources. Infallible by contract; the hardware loses all
    /// programmed state.
    fn disable(&mut self);
}
