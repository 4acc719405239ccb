//! Control core for the Sony IMX477 CMOS image sensor.
//!
//! This library decides what register values reach the sensor, in what
//! order, and how runtime parameter changes (exposure, gain, flip, blanking)
//! translate into register writes while a consistent video mode is
//! maintained. The register bus and the power rails are collaborator traits,
//! so production code can plug in an I2C bus while tests run against mocks.

pub mod controls;
pub mod device;
pub mod i2c;
pub mod mock;
pub mod modes;
pub mod registers;
pub mod timing;
pub mod traits;

pub use controls::{ControlError, ControlId, ControlRange, TestPattern};
pub use device::{supported_modes, Imx477, Variant, IMX477P};
pub use i2c::I2cTransport;
pub use modes::{enumerate_formats, enumerate_sizes, find_best_fit, Mode};
pub use traits::{
    AttachError, Format, FormatError, FrameInterval, PixelFormat, PowerControl, PowerError,
    RegWidth, RegisterTransport, RegisterWrite, StreamError, TransportError,
};
