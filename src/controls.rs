//! Abstract sensor controls: ids, ranges, current values, and the coupling
//! rules between them.
//!
//! This module owns the in-memory side of every control. The in-memory value
//! always reflects the *requested* state; pushing values to hardware is the
//! device layer's job, so a failed register write never rolls back anything
//! here.

use thiserror::Error;

use crate::modes::Mode;
use crate::registers::{
    ANA_GAIN_DEFAULT, ANA_GAIN_MAX, ANA_GAIN_MIN, DGTL_GAIN_DEFAULT, DGTL_GAIN_MAX, DGTL_GAIN_MIN,
    EXPOSURE_DEFAULT, EXPOSURE_MIN, TEST_PATTERN_COLOUR_MAX, TEST_PATTERN_COLOUR_MIN,
};
use crate::timing::{self, FramingLimits};
use crate::traits::TransportError;

/// Identifiers for the abstract controls the sensor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    /// Coarse integration time, in lines.
    Exposure,
    /// Analogue gain code.
    AnalogGain,
    /// Digital gain code.
    DigitalGain,
    /// Horizontal mirror.
    HFlip,
    /// Vertical flip.
    VFlip,
    /// Vertical blanking, in lines.
    VBlank,
    /// Horizontal blanking, in pixel clocks.
    HBlank,
    /// Test pattern selector.
    TestPattern,
    /// Test pattern red component.
    TestPatternRed,
    /// Test pattern green (red row) component.
    TestPatternGreenR,
    /// Test pattern blue component.
    TestPatternBlue,
    /// Test pattern green (blue row) component.
    TestPatternGreenB,
}

impl ControlId {
    /// Every control, in replay order. VBlank precedes Exposure so a replay
    /// publishes the exposure limit before the exposure value.
    pub const ALL: [Self; 12] = [
        Self::VBlank,
        Self::HBlank,
        Self::Exposure,
        Self::AnalogGain,
        Self::DigitalGain,
        Self::HFlip,
        Self::VFlip,
        Self::TestPattern,
        Self::TestPatternRed,
        Self::TestPatternGreenR,
        Self::TestPatternBlue,
        Self::TestPatternGreenB,
    ];
}

/// Test pattern selector. The selector index callers use is not the value
/// the hardware wants, hence the explicit mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPattern {
    /// Normal image output.
    Disabled,
    /// Standard colour bars.
    ColorBars,
    /// Solid colour from the four component controls.
    SolidColor,
    /// Greyscale colour bars.
    GreyColorBars,
    /// PN9 pseudo-random sequence.
    Pn9,
}

impl TestPattern {
    /// Decode a selector index, as used by the `TestPattern` control.
    #[must_use]
    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Disabled),
            1 => Some(Self::ColorBars),
            2 => Some(Self::SolidColor),
            3 => Some(Self::GreyColorBars),
            4 => Some(Self::Pn9),
            _ => None,
        }
    }

    /// Value to write to the test pattern register.
    #[must_use]
    pub const fn register_value(self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::ColorBars => 2,
            Self::SolidColor => 1,
            Self::GreyColorBars => 3,
            Self::Pn9 => 4,
        }
    }
}

/// Valid numeric range for a control, with its step and default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
    /// Step between accepted values.
    pub step: u32,
    /// Default value.
    pub default: u32,
}

/// Control set failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The value is outside the control's published range. Rejected before
    /// any state change or I/O.
    #[error("{control:?} value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Control that was set.
        control: ControlId,
        /// Rejected value.
        value: u32,
        /// Lower bound of the published range.
        min: u32,
        /// Upper bound of the published range.
        max: u32,
    },
    /// The register write failed. The in-memory value was already updated;
    /// the device may be out of sync until the control is re-applied.
    #[error("failed to apply {control:?}: {source}")]
    Apply {
        /// Control that was set.
        control: ControlId,
        /// Underlying transport failure.
        source: TransportError,
    },
}

/// In-memory control state for one device instance: current values plus the
/// mode-dependent bounds they are validated against.
#[derive(Debug, Clone, Copy)]
pub struct ControlState {
    mode: &'static Mode,
    limits: FramingLimits,
    exposure_max: u32,
    exposure: u32,
    analog_gain: u32,
    digital_gain: u32,
    hflip: bool,
    vflip: bool,
    vblank: u32,
    hblank: u32,
    test_pattern: u32,
    test_pattern_colours: [u32; 4],
}

impl ControlState {
    /// Control state for a freshly selected mode, everything at defaults.
    #[must_use]
    pub fn new(mode: &'static Mode) -> Self {
        let limits = timing::framing_limits(mode);
        let vblank = limits.vblank.default;
        let exposure_max = timing::exposure_max(mode, vblank);

        Self {
            mode,
            limits,
            exposure_max,
            exposure: EXPOSURE_DEFAULT.min(exposure_max),
            analog_gain: ANA_GAIN_DEFAULT,
            digital_gain: DGTL_GAIN_DEFAULT,
            hflip: false,
            vflip: false,
            vblank,
            hblank: limits.hblank.default,
            test_pattern: 0,
            // The solid colour pattern is white by default.
            test_pattern_colours: [TEST_PATTERN_COLOUR_MAX; 4],
        }
    }

    /// The mode the bounds are derived from.
    #[must_use]
    pub const fn mode(&self) -> &'static Mode {
        self.mode
    }

    /// Switch to a new mode: recompute blanking bounds, reset blanking to
    /// the mode defaults and re-derive the exposure limit. Other control
    /// values survive the mode change.
    pub fn set_mode(&mut self, mode: &'static Mode) {
        self.mode = mode;
        self.limits = timing::framing_limits(mode);
        self.vblank = self.limits.vblank.default;
        self.hblank = self.limits.hblank.default;
        self.adjust_exposure_range();
    }

    /// Honour the vblank limit when bounding exposure.
    fn adjust_exposure_range(&mut self) {
        self.exposure_max = timing::exposure_max(self.mode, self.vblank);
        self.exposure = self.exposure.min(self.exposure_max);
    }

    /// Published range for a control. Exposure and blanking ranges move with
    /// the current mode and vblank.
    #[must_use]
    pub fn range(&self, id: ControlId) -> ControlRange {
        match id {
            ControlId::Exposure => ControlRange {
                min: EXPOSURE_MIN,
                max: self.exposure_max,
                step: 1,
                default: EXPOSURE_DEFAULT.min(self.exposure_max),
            },
            ControlId::AnalogGain => ControlRange {
                min: ANA_GAIN_MIN,
                max: ANA_GAIN_MAX,
                step: 1,
                default: ANA_GAIN_DEFAULT,
            },
            ControlId::DigitalGain => ControlRange {
                min: DGTL_GAIN_MIN,
                max: DGTL_GAIN_MAX,
                step: 1,
                default: DGTL_GAIN_DEFAULT,
            },
            ControlId::HFlip | ControlId::VFlip => ControlRange {
                min: 0,
                max: 1,
                step: 1,
                default: 0,
            },
            ControlId::VBlank => ControlRange {
                min: self.limits.vblank.min,
                max: self.limits.vblank.max,
                step: 1,
                default: self.limits.vblank.default,
            },
            ControlId::HBlank => ControlRange {
                min: self.limits.hblank.min,
                max: self.limits.hblank.max,
                step: 1,
                default: self.limits.hblank.default,
            },
            ControlId::TestPattern => ControlRange {
                min: 0,
                max: 4,
                step: 1,
                default: 0,
            },
            ControlId::TestPatternRed
            | ControlId::TestPatternGreenR
            | ControlId::TestPatternBlue
            | ControlId::TestPatternGreenB => ControlRange {
                min: TEST_PATTERN_COLOUR_MIN,
                max: TEST_PATTERN_COLOUR_MAX,
                step: 1,
                default: TEST_PATTERN_COLOUR_MAX,
            },
        }
    }

    /// Current value of a control.
    #[must_use]
    pub const fn get(&self, id: ControlId) -> u32 {
        match id {
            ControlId::Exposure => self.exposure,
            ControlId::AnalogGain => self.analog_gain,
            ControlId::DigitalGain => self.digital_gain,
            ControlId::HFlip => self.hflip as u32,
            ControlId::VFlip => self.vflip as u32,
            ControlId::VBlank => self.vblank,
            ControlId::HBlank => self.hblank,
            ControlId::TestPattern => self.test_pattern,
            ControlId::TestPatternRed => self.test_pattern_colours[0],
            ControlId::TestPatternGreenR => self.test_pattern_colours[1],
            ControlId::TestPatternBlue => self.test_pattern_colours[2],
            ControlId::TestPatternGreenB => self.test_pattern_colours[3],
        }
    }

    /// Validate and store a control value. Setting vblank narrows the
    /// exposure range and clamps the stored exposure into it.
    pub fn set(&mut self, id: ControlId, value: u32) -> Result<(), ControlError> {
        let range = self.range(id);
        if value < range.min || value > range.max {
            return Err(ControlError::OutOfRange {
                control: id,
                value,
                min: range.min,
                max: range.max,
            });
        }

        match id {
            ControlId::Exposure => self.exposure = value,
            ControlId::AnalogGain => self.analog_gain = value,
            ControlId::DigitalGain => self.digital_gain = value,
            ControlId::HFlip => self.hflip = value != 0,
            ControlId::VFlip => self.vflip = value != 0,
            ControlId::VBlank => {
                self.vblank = value;
                self.adjust_exposure_range();
            }
            ControlId::HBlank => self.hblank = value,
            ControlId::TestPattern => self.test_pattern = value,
            ControlId::TestPatternRed => self.test_pattern_colours[0] = value,
            ControlId::TestPatternGreenR => self.test_pattern_colours[1] = value,
            ControlId::TestPatternBlue => self.test_pattern_colours[2] = value,
            ControlId::TestPatternGreenB => self.test_pattern_colours[3] = value,
        }

        Ok(())
    }

    /// Combined orientation register value: hflip bit 0, vflip bit 1.
    #[must_use]
    pub const fn orientation(&self) -> u32 {
        (self.hflip as u32) | ((self.vflip as u32) << 1)
    }
}
