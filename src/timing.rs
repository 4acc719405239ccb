//! Pure timing computations: frame length, blanking bounds, long-exposure
//! frame-length encoding.
//!
//! Frame length (scanlines per frame) is the register-level proxy for frame
//! rate: `interval * pixel_rate / line_length`. All arithmetic is integer
//! with truncation, matching register granularity.

use log::warn;

use crate::modes::Mode;
use crate::registers::{
    EXPOSURE_OFFSET, FRAME_LENGTH_MAX, LINE_LENGTH_MAX, LONG_EXP_SHIFT_MAX, PIXEL_RATE,
};
use crate::traits::FrameInterval;

/// Inclusive value range with a default, mirroring how the ranges are
/// published to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
    /// Value applied when the range is (re)published.
    pub default: u32,
}

/// Blanking bounds derived from a mode, recomputed on every mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingLimits {
    /// Vertical blanking bounds, in lines.
    pub vblank: Bounds,
    /// Horizontal blanking bounds, in pixel clocks.
    pub hblank: Bounds,
}

/// Scanlines per frame needed to run `mode` at `interval`.
///
/// The result is truncated to whole lines, floored at the mode's height and
/// capped at the largest representable frame length. The cap fires only for
/// frame rates below hardware capability, so it is logged rather than
/// rejected; the caller keeps going with the capped value.
#[must_use]
pub fn frame_length(mode: &Mode, interval: FrameInterval) -> u32 {
    let numerator = u64::from(interval.numerator) * PIXEL_RATE;
    let denominator = u64::from(interval.denominator) * u64::from(mode.line_length_pix);
    let lines = numerator / denominator;

    let lines = if lines > u64::from(FRAME_LENGTH_MAX) {
        warn!(
            "frame interval {}/{} needs {lines} lines, capping to {FRAME_LENGTH_MAX}",
            interval.numerator, interval.denominator
        );
        FRAME_LENGTH_MAX
    } else {
        // Fits in u32: FRAME_LENGTH_MAX bounds it.
        u32::try_from(lines).unwrap_or(FRAME_LENGTH_MAX)
    };

    lines.max(mode.height)
}

/// Derive the blanking bounds for a mode.
///
/// The vblank upper bound includes the long-exposure multiplier headroom;
/// the defaults correspond to the mode's default frame interval (vblank)
/// and the minimum line padding (hblank).
#[must_use]
pub fn framing_limits(mode: &Mode) -> FramingLimits {
    let frame_length_min = frame_length(mode, mode.min_frame_interval);
    let frame_length_default = frame_length(mode, mode.default_frame_interval);
    let hblank_min = mode.line_length_pix - mode.width;

    FramingLimits {
        vblank: Bounds {
            min: frame_length_min - mode.height,
            max: ((1 << LONG_EXP_SHIFT_MAX) * FRAME_LENGTH_MAX) - mode.height,
            default: frame_length_default - mode.height,
        },
        hblank: Bounds {
            min: hblank_min,
            max: LINE_LENGTH_MAX,
            default: hblank_min,
        },
    }
}

/// Largest usable exposure, in lines, for a mode at a given vblank.
#[must_use]
pub const fn exposure_max(mode: &Mode, vblank: u32) -> u32 {
    mode.height + vblank - EXPOSURE_OFFSET
}

/// Encode a total line count into the frame length register's native range.
///
/// Returns the register value and the long-exposure shift that was needed:
/// the requested count is halved (and the shift bumped) until it fits. The
/// shift must then be applied to every exposure value written while it is in
/// effect, so requested exposures stay in real scanline units while wire
/// values respect the register width.
#[must_use]
pub fn encode_frame_length(total_lines: u32) -> (u32, u8) {
    let mut value = total_lines;
    let mut shift = 0u8;

    while value > FRAME_LENGTH_MAX {
        shift += 1;
        value >>= 1;
    }
    debug_assert!(shift <= LONG_EXP_SHIFT_MAX);

    (value, shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::SUPPORTED_MODES;

    #[test]
    fn test_frame_length_within_bounds_for_all_modes() {
        for mode in SUPPORTED_MODES {
            let lines = frame_length(mode, mode.min_frame_interval);
            assert!(lines >= mode.height, "{}x{}", mode.width, mode.height);
            assert!(lines <= FRAME_LENGTH_MAX);
        }
    }

    #[test]
    fn test_frame_length_truncates() {
        // 4056x3040: 0.1s * 614.4MHz / 0x49a8 = 3258.38... -> 3258
        let mode = &SUPPORTED_MODES[0];
        assert_eq!(frame_length(mode, FrameInterval::new(100, 1000)), 3258);
    }

    #[test]
    fn test_frame_length_floors_at_mode_height() {
        // An absurdly short interval cannot go below the visible height.
        let mode = &SUPPORTED_MODES[0];
        assert_eq!(frame_length(mode, FrameInterval::new(1, 1_000_000)), mode.height);
    }

    #[test]
    fn test_frame_length_caps_at_register_max() {
        // Ten seconds per frame wants far more lines than the register holds.
        let mode = &SUPPORTED_MODES[0];
        assert_eq!(frame_length(mode, FrameInterval::new(10, 1)), FRAME_LENGTH_MAX);
    }

    #[test]
    fn test_framing_limits_defaults_within_range() {
        for mode in SUPPORTED_MODES {
            let limits = framing_limits(mode);
            assert!(limits.vblank.min <= limits.vblank.default);
            assert!(limits.vblank.default <= limits.vblank.max);
            assert_eq!(limits.hblank.default, limits.hblank.min);
            assert_eq!(limits.hblank.min, mode.line_length_pix - mode.width);
        }
    }

    #[test]
    fn test_encode_frame_length_passthrough_in_native_range() {
        assert_eq!(encode_frame_length(3258), (3258, 0));
        assert_eq!(encode_frame_length(FRAME_LENGTH_MAX), (FRAME_LENGTH_MAX, 0));
    }

    #[test]
    fn test_encode_frame_length_shifts_until_it_fits() {
        let (value, shift) = encode_frame_length(FRAME_LENGTH_MAX + 1);
        assert_eq!(shift, 1);
        assert_eq!(value, (FRAME_LENGTH_MAX + 1) >> 1);

        let (value, shift) = encode_frame_length(FRAME_LENGTH_MAX * 100);
        assert!(value <= FRAME_LENGTH_MAX);
        assert_eq!(value, (FRAME_LENGTH_MAX * 100) >> shift);
        assert!(shift <= LONG_EXP_SHIFT_MAX);
    }

    #[test]
    fn test_encode_frame_length_max_shift_covers_vblank_ceiling() {
        // The vblank upper bound is chosen so the shift never exceeds 7.
        for mode in SUPPORTED_MODES {
            let limits = framing_limits(mode);
            let (_, shift) = encode_frame_length(mode.height + limits.vblank.max);
            assert!(shift <= LONG_EXP_SHIFT_MAX);
        }
    }

    #[test]
    fn test_exposure_max_tracks_vblank() {
        let mode = &SUPPORTED_MODES[2];
        assert_eq!(exposure_max(mode, 100), 1080 + 100 - EXPOSURE_OFFSET);
    }
}
