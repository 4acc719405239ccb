//! Supported frame formats and best-fit mode negotiation.
//!
//! The catalog is fixed at compile time and its order is a priority policy:
//! the full-resolution mode comes first so that resolution ties resolve
//! towards it.

use crate::registers::{MODE_1920X1080_REGS, MODE_3840X2160_REGS, MODE_4056X3040_REGS};
use crate::traits::{Format, FrameInterval, PixelFormat, RegisterWrite};

/// A supported resolution and frame format, with its register program and
/// timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Pixel format produced in this mode.
    pub pixel_format: PixelFormat,
    /// Visible frame width in pixels.
    pub width: u32,
    /// Visible frame height in pixels.
    pub height: u32,
    /// Line length in pixel clocks (visible width plus horizontal blanking).
    pub line_length_pix: u32,
    /// Shortest supported time per frame (highest frame rate).
    pub min_frame_interval: FrameInterval,
    /// Default time per frame.
    pub default_frame_interval: FrameInterval,
    /// Ordered register program selecting this mode.
    pub registers: &'static [RegisterWrite],
}

impl Mode {
    /// The frame format this mode produces.
    #[must_use]
    pub const fn format(&self) -> Format {
        Format::new(self.width, self.height, self.pixel_format)
    }
}

/// All supported modes, full resolution first.
pub const SUPPORTED_MODES: &[Mode] = &[
    // 12MPix 10fps mode
    Mode {
        pixel_format: PixelFormat::SRGGB10,
        width: 4056,
        height: 3040,
        line_length_pix: 0x49A8,
        min_frame_interval: FrameInterval::new(100, 1000),
        default_frame_interval: FrameInterval::new(100, 1000),
        registers: MODE_4056X3040_REGS,
    },
    // 4K 20fps mode
    Mode {
        pixel_format: PixelFormat::SRGGB10,
        width: 3840,
        height: 2160,
        line_length_pix: 0x3480,
        min_frame_interval: FrameInterval::new(100, 2000),
        default_frame_interval: FrameInterval::new(100, 2000),
        registers: MODE_3840X2160_REGS,
    },
    // 1080p 60fps cropped mode
    Mode {
        pixel_format: PixelFormat::SRGGB10,
        width: 1920,
        height: 1080,
        line_length_pix: 0x2070,
        min_frame_interval: FrameInterval::new(100, 6000),
        default_frame_interval: FrameInterval::new(100, 6000),
        registers: MODE_1920X1080_REGS,
    },
];

/// Manhattan distance between a mode's resolution and a request.
fn resolution_distance(mode: &Mode, width: u32, height: u32) -> u64 {
    u64::from(mode.width.abs_diff(width)) + u64::from(mode.height.abs_diff(height))
}

/// Find the catalog mode closest to the requested format.
///
/// Only modes matching the requested pixel format are considered; among
/// those the smallest Manhattan distance on resolution wins and ties go to
/// the earlier catalog entry. Returns `None` when no mode produces the
/// requested pixel format.
#[must_use]
pub fn find_best_fit(request: &Format) -> Option<&'static Mode> {
    let mut best: Option<(&Mode, u64)> = None;

    for mode in SUPPORTED_MODES {
        if mode.pixel_format != request.pixel_format {
            continue;
        }
        let dist = resolution_distance(mode, request.width, request.height);
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((mode, dist));
        }
    }

    best.map(|(mode, _)| mode)
}

/// Pixel formats available in the catalog, deduplicated in catalog order.
#[must_use]
pub fn enumerate_formats() -> Vec<PixelFormat> {
    let mut formats = Vec::new();
    for mode in SUPPORTED_MODES {
        if !formats.contains(&mode.pixel_format) {
            formats.push(mode.pixel_format);
        }
    }
    formats
}

/// Frame sizes available for a pixel format, in catalog order.
#[must_use]
pub fn enumerate_sizes(pixel_format: PixelFormat) -> Vec<(u32, u32)> {
    SUPPORTED_MODES
        .iter()
        .filter(|mode| mode.pixel_format == pixel_format)
        .map(|mode| (mode.width, mode.height))
        .collect()
}
