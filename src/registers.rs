//! Register map constants and the static register programs.
//!
//! The programs are ordered; execution stops at the first failed write and
//! the sensor is left in a partially programmed state.

use crate::traits::RegisterWrite;

/// Chip identity register (16-bit).
pub const REG_CHIP_ID: u16 = 0x0016;
/// Expected identity for the IMX477 family.
pub const CHIP_ID: u16 = 0x0477;

/// Mode select register: standby or streaming.
pub const REG_MODE_SELECT: u16 = 0x0100;
/// Mode select value: software standby.
pub const MODE_STANDBY: u32 = 0x00;
/// Mode select value: streaming.
pub const MODE_STREAMING: u32 = 0x01;

/// Orientation register: bit 0 hflip, bit 1 vflip.
pub const REG_ORIENTATION: u16 = 0x0101;

/// Pixel rate in pixels per second, fixed for all modes.
pub const PIXEL_RATE: u64 = 614_400_000;

/// Frame length register (16-bit, scanlines per frame).
pub const REG_FRAME_LENGTH: u16 = 0x0340;
/// Largest frame length the register can hold.
pub const FRAME_LENGTH_MAX: u32 = 0xFFDC;

/// Line length register (16-bit, pixel clocks per line).
pub const REG_LINE_LENGTH: u16 = 0x0342;
/// Largest line length the register can hold.
pub const LINE_LENGTH_MAX: u32 = 0xFFF0;

/// Long exposure shift register (8-bit).
pub const REG_LONG_EXP_SHIFT: u16 = 0x3100;
/// Largest supported long exposure shift.
pub const LONG_EXP_SHIFT_MAX: u8 = 7;

/// Coarse integration time register (16-bit).
pub const REG_EXPOSURE: u16 = 0x0202;
/// Lines between frame length and the largest usable exposure.
pub const EXPOSURE_OFFSET: u32 = 22;
/// Smallest usable exposure, in lines.
pub const EXPOSURE_MIN: u32 = 4;
/// Power-on exposure default, in lines.
pub const EXPOSURE_DEFAULT: u32 = 0x640;

/// Analogue gain register (16-bit).
pub const REG_ANALOG_GAIN: u16 = 0x0204;
/// Analogue gain code range.
pub const ANA_GAIN_MIN: u32 = 0;
/// Largest analogue gain code.
pub const ANA_GAIN_MAX: u32 = 978;
/// Power-on analogue gain default.
pub const ANA_GAIN_DEFAULT: u32 = 0;

/// Digital gain register (16-bit).
pub const REG_DIGITAL_GAIN: u16 = 0x020E;
/// Unity digital gain code, also the lower bound.
pub const DGTL_GAIN_MIN: u32 = 0x0100;
/// Largest digital gain code.
pub const DGTL_GAIN_MAX: u32 = 0xFFFF;
/// Power-on digital gain default (unity).
pub const DGTL_GAIN_DEFAULT: u32 = 0x0100;

/// Test pattern selector register (16-bit).
pub const REG_TEST_PATTERN: u16 = 0x0600;
/// Test pattern red component register.
pub const REG_TEST_PATTERN_R: u16 = 0x0602;
/// Test pattern green (red row) component register.
pub const REG_TEST_PATTERN_GR: u16 = 0x0604;
/// Test pattern blue component register.
pub const REG_TEST_PATTERN_B: u16 = 0x0606;
/// Test pattern green (blue row) component register.
pub const REG_TEST_PATTERN_GB: u16 = 0x0608;
/// Smallest test pattern colour component.
pub const TEST_PATTERN_COLOUR_MIN: u32 = 0;
/// Largest test pattern colour component (12-bit range).
pub const TEST_PATTERN_COLOUR_MAX: u32 = 0x0FFF;

/// Minimum delay between reset release and the first register access, us.
pub const XCLR_MIN_DELAY_US: u64 = 8000;
/// Additional jitter allowed on top of the minimum delay, us.
pub const XCLR_DELAY_RANGE_US: u64 = 1000;

const fn reg(address: u16, value: u8) -> RegisterWrite {
    RegisterWrite { address, value }
}

/// Device-wide defaults, written once per power cycle before any mode program.
pub const MODE_COMMON_REGS: &[RegisterWrite] = &[
    reg(0x0103, 0x01),
    reg(0x0136, 0x18),
    reg(0x0137, 0x00),
    reg(0x38A8, 0x1F),
    reg(0x38A9, 0xFF),
    reg(0x38AA, 0x1F),
    reg(0x38AB, 0xFF),
    reg(0x55D4, 0x00),
    reg(0x55D5, 0x00),
    reg(0x55D6, 0x07),
    reg(0x55D7, 0xFF),
    reg(0x55E8, 0x07),
    reg(0x55E9, 0xFF),
    reg(0x55EA, 0x00),
    reg(0x55EB, 0x00),
    reg(0x575C, 0x07),
    reg(0x575D, 0xFF),
    reg(0x575E, 0x00),
    reg(0x575F, 0x00),
    reg(0x5764, 0x00),
    reg(0x5765, 0x00),
    reg(0x5766, 0x07),
    reg(0x5767, 0xFF),
    reg(0x5974, 0x04),
    reg(0x5975, 0x01),
    reg(0x5F10, 0x09),
    reg(0x5F11, 0x92),
    reg(0x5F12, 0x32),
    reg(0x5F13, 0x72),
    reg(0x5F14, 0x16),
    reg(0x5F15, 0xBA),
    reg(0x5F17, 0x13),
    reg(0x5F18, 0x24),
    reg(0x5F19, 0x60),
    reg(0x5F1A, 0xE3),
    reg(0x5F1B, 0xAD),
    reg(0x5F1C, 0x74),
    reg(0x5F2D, 0x25),
    reg(0x5F5C, 0xD0),
    reg(0x6A22, 0x00),
    reg(0x6A23, 0x1D),
    reg(0x7BA8, 0x00),
    reg(0x7BA9, 0x00),
    reg(0x886B, 0x00),
    reg(0x9002, 0x0A),
    reg(0x9004, 0x1A),
    reg(0x9214, 0x93),
    reg(0x9215, 0x69),
    reg(0x9216, 0x93),
    reg(0x9217, 0x6B),
    reg(0x9218, 0x93),
    reg(0x9219, 0x6D),
    reg(0x921A, 0x57),
    reg(0x921B, 0x58),
    reg(0x921C, 0x57),
    reg(0x921D, 0x59),
    reg(0x921E, 0x57),
    reg(0x921F, 0x5A),
    reg(0x9220, 0x57),
    reg(0x9221, 0x5B),
    reg(0x9222, 0x93),
    reg(0x9223, 0x02),
    reg(0x9224, 0x93),
    reg(0x9225, 0x03),
    reg(0x9226, 0x93),
    reg(0x9227, 0x04),
    reg(0x9228, 0x93),
    reg(0x9229, 0x05),
    reg(0x922A, 0x98),
    reg(0x922B, 0x21),
    reg(0x922C, 0xB2),
    reg(0x922D, 0xDB),
    reg(0x922E, 0xB2),
    reg(0x922F, 0xDC),
    reg(0x9230, 0xB2),
    reg(0x9231, 0xDD),
    reg(0x9232, 0xB2),
    reg(0x9233, 0xE1),
    reg(0x9234, 0xB2),
    reg(0x9235, 0xE2),
    reg(0x9236, 0xB2),
    reg(0x9237, 0xE3),
    reg(0x9238, 0xB7),
    reg(0x9239, 0xB9),
    reg(0x923A, 0xB7),
    reg(0x923B, 0xBB),
    reg(0x923C, 0xB7),
    reg(0x923D, 0xBC),
    reg(0x923E, 0xB7),
    reg(0x923F, 0xC5),
    reg(0x9240, 0xB7),
    reg(0x9241, 0xC7),
    reg(0x9242, 0xB7),
    reg(0x9243, 0xC9),
    reg(0x9244, 0x98),
    reg(0x9245, 0x56),
    reg(0x9246, 0x98),
    reg(0x9247, 0x55),
    reg(0x9380, 0x00),
    reg(0x9381, 0x62),
    reg(0x9382, 0x00),
    reg(0x9383, 0x56),
    reg(0x9384, 0x00),
    reg(0x9385, 0x52),
    reg(0x9388, 0x00),
    reg(0x9389, 0x55),
    reg(0x938A, 0x00),
    reg(0x938B, 0x55),
    reg(0x938C, 0x00),
    reg(0x938D, 0x41),
    reg(0x5078, 0x01),
    reg(0x0112, 0x0A),
    reg(0x0113, 0x0A),
    reg(0x0114, 0x01),
];

/// 12MPix full-resolution mode, 10fps.
pub const MODE_4056X3040_REGS: &[RegisterWrite] = &[
    reg(0x0342, 0x49),
    reg(0x0343, 0xA8),
    reg(0x0350, 0x00),
    reg(0x0340, 0x0C),
    reg(0x0341, 0x1E),
    reg(0x3210, 0x00),
    reg(0x0344, 0x00),
    reg(0x0345, 0x00),
    reg(0x0346, 0x00),
    reg(0x0347, 0x00),
    reg(0x0348, 0x0F),
    reg(0x0349, 0xD7),
    reg(0x034A, 0x0B),
    reg(0x034B, 0xDF),
    reg(0x0220, 0x00),
    reg(0x0221, 0x11),
    reg(0x0381, 0x01),
    reg(0x0383, 0x01),
    reg(0x0385, 0x01),
    reg(0x0387, 0x01),
    reg(0x0900, 0x00),
    reg(0x0901, 0x11),
    reg(0x0902, 0x00),
    reg(0x3140, 0x02),
    reg(0x0401, 0x00),
    reg(0x0404, 0x00),
    reg(0x0405, 0x10),
    reg(0x0408, 0x00),
    reg(0x0409, 0x00),
    reg(0x040A, 0x00),
    reg(0x040B, 0x00),
    reg(0x040C, 0x0F),
    reg(0x040D, 0xD8),
    reg(0x040E, 0x0B),
    reg(0x040F, 0xE0),
    reg(0x034C, 0x0F),
    reg(0x034D, 0xD8),
    reg(0x034E, 0x0B),
    reg(0x034F, 0xE0),
    reg(0x0301, 0x05),
    reg(0x0303, 0x02),
    reg(0x0305, 0x04),
    reg(0x0306, 0x01),
    reg(0x0307, 0x00),
    reg(0x0309, 0x08),
    reg(0x030B, 0x02),
    reg(0x030D, 0x02),
    reg(0x030E, 0x00),
    reg(0x030F, 0x98),
    reg(0x0310, 0x01),
    reg(0x0820, 0x20),
    reg(0x0821, 0xD0),
    reg(0x0822, 0x00),
    reg(0x0823, 0x00),
    reg(0x3E20, 0x01),
    reg(0x3E37, 0x00),
    reg(0x3F50, 0x00),
    reg(0x3F56, 0x00),
    reg(0x3F57, 0x82),
    reg(0x0202, 0x0C),
    reg(0x0203, 0x08),
    reg(0x0204, 0x00),
    reg(0x0205, 0x00),
    reg(0x020E, 0x01),
    reg(0x020F, 0x00),
    reg(0x0210, 0x01),
    reg(0x0211, 0x00),
    reg(0x0212, 0x01),
    reg(0x0213, 0x00),
    reg(0x0214, 0x01),
    reg(0x0215, 0x00),
    reg(0x0100, 0x01),
];

/// 4K mode, 20fps.
pub const MODE_3840X2160_REGS: &[RegisterWrite] = &[
    reg(0x0342, 0x34),
    reg(0x0343, 0x80),
    reg(0x0350, 0x00),
    reg(0x0340, 0x08),
    reg(0x0341, 0xED),
    reg(0x3210, 0x00),
    reg(0x0344, 0x00),
    reg(0x0345, 0x6C),
    reg(0x0346, 0x01),
    reg(0x0347, 0xB8),
    reg(0x0348, 0x0F),
    reg(0x0349, 0x6B),
    reg(0x034A, 0x0A),
    reg(0x034B, 0x27),
    reg(0x0220, 0x00),
    reg(0x0221, 0x11),
    reg(0x0381, 0x01),
    reg(0x0383, 0x01),
    reg(0x0385, 0x01),
    reg(0x0387, 0x01),
    reg(0x0900, 0x00),
    reg(0x0901, 0x11),
    reg(0x0902, 0x00),
    reg(0x3140, 0x02),
    reg(0x0401, 0x00),
    reg(0x0404, 0x00),
    reg(0x0405, 0x10),
    reg(0x0408, 0x00),
    reg(0x0409, 0x00),
    reg(0x040A, 0x00),
    reg(0x040B, 0x00),
    reg(0x040C, 0x0F),
    reg(0x040D, 0x00),
    reg(0x040E, 0x08),
    reg(0x040F, 0x70),
    reg(0x034C, 0x0F),
    reg(0x034D, 0x00),
    reg(0x034E, 0x08),
    reg(0x034F, 0x70),
    reg(0x0301, 0x05),
    reg(0x0303, 0x02),
    reg(0x0305, 0x04),
    reg(0x0306, 0x01),
    reg(0x0307, 0x00),
    reg(0x0309, 0x08),
    reg(0x030B, 0x02),
    reg(0x030D, 0x02),
    reg(0x030E, 0x00),
    reg(0x030F, 0x98),
    reg(0x0310, 0x01),
    reg(0x0820, 0x20),
    reg(0x0821, 0xD0),
    reg(0x0822, 0x00),
    reg(0x0823, 0x00),
    reg(0x3E20, 0x01),
    reg(0x3E37, 0x00),
    reg(0x3F50, 0x00),
    reg(0x3F56, 0x00),
    reg(0x3F57, 0x82),
    reg(0x0202, 0x08),
    reg(0x0203, 0xEC),
    reg(0x0204, 0x00),
    reg(0x0205, 0x00),
    reg(0x020E, 0x01),
    reg(0x020F, 0x00),
    reg(0x0210, 0x01),
    reg(0x0211, 0x00),
    reg(0x0212, 0x01),
    reg(0x0213, 0x00),
    reg(0x0214, 0x01),
    reg(0x0215, 0x00),
    reg(0x0100, 0x01),
];

/// 1080p cropped mode, 60fps.
pub const MODE_1920X1080_REGS: &[RegisterWrite] = &[
    reg(0x0342, 0x20),
    reg(0x0343, 0x70),
    reg(0x0350, 0x00),
    reg(0x0340, 0x04),
    reg(0x0341, 0xD0),
    reg(0x3210, 0x00),
    reg(0x0344, 0x00),
    reg(0x0345, 0x60),
    reg(0x0346, 0x01),
    reg(0x0347, 0xB8),
    reg(0x0348, 0x0F),
    reg(0x0349, 0xCB),
    reg(0x034A, 0x0B),
    reg(0x034B, 0xDF),
    reg(0x00E3, 0x00),
    reg(0x00E4, 0x00),
    reg(0x00E5, 0x01),
    reg(0x00FC, 0x0A),
    reg(0x00FD, 0x0A),
    reg(0x00FE, 0x0A),
    reg(0x00FF, 0x0A),
    reg(0xE013, 0x00),
    reg(0x0220, 0x00),
    reg(0x0221, 0x11),
    reg(0x0381, 0x01),
    reg(0x0383, 0x01),
    reg(0x0385, 0x01),
    reg(0x0387, 0x01),
    reg(0x0900, 0x01),
    reg(0x0901, 0x22),
    reg(0x0902, 0x02),
    reg(0x3140, 0x02),
    reg(0x3241, 0x11),
    reg(0x3250, 0x03),
    reg(0x3E10, 0x00),
    reg(0x3E11, 0x00),
    reg(0x3F0D, 0x00),
    reg(0x3F42, 0x00),
    reg(0x3F43, 0x00),
    reg(0x0401, 0x00),
    reg(0x0404, 0x00),
    reg(0x0405, 0x10),
    reg(0x0408, 0x00),
    reg(0x0409, 0x00),
    reg(0x040A, 0x00),
    reg(0x040B, 0x00),
    reg(0x040C, 0x07),
    reg(0x040D, 0x80),
    reg(0x040E, 0x04),
    reg(0x040F, 0x38),
    reg(0x034C, 0x07),
    reg(0x034D, 0x80),
    reg(0x034E, 0x04),
    reg(0x034F, 0x38),
    reg(0x0301, 0x05),
    reg(0x0303, 0x02),
    reg(0x0305, 0x04),
    reg(0x0306, 0x01),
    reg(0x0307, 0x00),
    reg(0x0309, 0x08),
    reg(0x030B, 0x02),
    reg(0x030D, 0x02),
    reg(0x030E, 0x00),
    reg(0x030F, 0x98),
    reg(0x0310, 0x01),
    reg(0x0820, 0x20),
    reg(0x0821, 0xD0),
    reg(0x0822, 0x00),
    reg(0x0823, 0x00),
    reg(0x3E20, 0x01),
    reg(0x3E37, 0x00),
];
