//! Device instance: one mutex over all mutable state, orchestrating power,
//! mode programming, control application and streaming transitions.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::controls::{ControlError, ControlId, ControlRange, ControlState, TestPattern};
use crate::modes::{self, Mode, SUPPORTED_MODES};
use crate::registers::{
    CHIP_ID, MODE_COMMON_REGS, MODE_STANDBY, MODE_STREAMING, PIXEL_RATE, REG_ANALOG_GAIN,
    REG_CHIP_ID, REG_DIGITAL_GAIN, REG_EXPOSURE, REG_FRAME_LENGTH, REG_LINE_LENGTH,
    REG_LONG_EXP_SHIFT, REG_MODE_SELECT, REG_ORIENTATION, REG_TEST_PATTERN, REG_TEST_PATTERN_B,
    REG_TEST_PATTERN_GB, REG_TEST_PATTERN_GR, REG_TEST_PATTERN_R, XCLR_MIN_DELAY_US,
};
use crate::timing;
use crate::traits::{
    AttachError, Format, FormatError, FrameInterval, PowerControl, PowerError, RegWidth,
    RegisterTransport, RegisterWrite, StreamError, TransportError,
};

/// Chip-variant data: the identity the variant reports and the extra
/// registers written right after the common program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    /// Expected identity register value.
    pub chip_id: u16,
    /// Variant-specific register program, may be empty.
    pub extra_regs: &'static [RegisterWrite],
}

/// The IMX477P variant: stock identity, no extra registers.
pub const IMX477P: Variant = Variant {
    chip_id: CHIP_ID,
    extra_regs: &[],
};

#[derive(Debug)]
struct Inner<T, P> {
    transport: T,
    power: P,
    variant: &'static Variant,
    controls: ControlState,
    powered: bool,
    streaming: bool,
    common_regs_written: bool,
    long_exp_shift: u8,
}

/// An attached sensor instance.
///
/// All public operations serialize on one internal lock; cross-field
/// invariants (vblank/exposure coupling, the long-exposure shift) require
/// atomic multi-field updates, so the lock is deliberately coarse.
#[derive(Debug)]
pub struct Imx477<T, P> {
    inner: Mutex<Inner<T, P>>,
}

impl<T, P> Imx477<T, P>
where
    T: RegisterTransport,
    P: PowerControl,
{
    /// Attach to the sensor: power it up, honour the settle delay, verify
    /// the chip identity against the variant, and power back down. The
    /// device starts in the powered-off state with the full-resolution mode
    /// selected.
    pub fn attach(transport: T, power: P, variant: &'static Variant) -> Result<Self, AttachError> {
        let mut inner = Inner {
            transport,
            power,
            variant,
            controls: ControlState::new(&SUPPORTED_MODES[0]),
            powered: false,
            streaming: false,
            common_regs_written: false,
            long_exp_shift: 0,
        };

        inner.power_on()?;
        let found = match inner.read_reg(REG_CHIP_ID, RegWidth::U16) {
            Ok(value) => value,
            Err(err) => {
                inner.power_off();
                return Err(err.into());
            }
        };
        inner.power_off();

        if found != u32::from(variant.chip_id) {
            return Err(AttachError::IdentityMismatch {
                expected: variant.chip_id,
                found,
            });
        }
        info!("found sensor, chip id 0x{found:04x}");

        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Enable power and clock resources. Registers become accessible only
    /// after the settle delay this call performs. No-op when already
    /// powered.
    pub fn power_on(&self) -> Result<(), PowerError> {
        self.lock().power_on()
    }

    /// Disable power resources. The hardware loses all programmed state, so
    /// the common registers are marked for reprogramming. No-op when
    /// already off.
    pub fn power_off(&self) {
        self.lock().power_off();
    }

    /// Whether the device is currently powered.
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.lock().powered
    }

    /// Whether the device is currently streaming.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.lock().streaming
    }

    /// Negotiate the active mode: pick the catalog mode closest to the
    /// request and, if it differs from the current one, recompute the
    /// blanking and exposure limits. Returns the format actually selected.
    /// The mode's register program is written at stream start, not here.
    pub fn set_format(&self, request: &Format) -> Result<Format, FormatError> {
        let mut inner = self.lock();

        let mode = modes::find_best_fit(request)
            .ok_or(FormatError::Unsupported(request.pixel_format))?;

        if !std::ptr::eq(mode, inner.controls.mode()) {
            info!("mode change: {}x{}", mode.width, mode.height);
            inner.controls.set_mode(mode);
            // No long exposure multiplier until vblank asks for one again.
            inner.long_exp_shift = 0;
        }

        Ok(mode.format())
    }

    /// The currently selected format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.lock().controls.mode().format()
    }

    /// The current mode's default frame interval.
    #[must_use]
    pub fn frame_interval(&self) -> FrameInterval {
        self.lock().controls.mode().default_frame_interval
    }

    /// The fixed pixel rate, identical across modes.
    #[must_use]
    pub const fn pixel_rate(&self) -> u64 {
        PIXEL_RATE
    }

    /// Current in-memory value of a control.
    #[must_use]
    pub fn get_control(&self, id: ControlId) -> u32 {
        self.lock().controls.get(id)
    }

    /// Published range of a control under the current mode and vblank.
    #[must_use]
    pub fn control_range(&self, id: ControlId) -> ControlRange {
        self.lock().controls.range(id)
    }

    /// Set a control. The value is validated against the published range
    /// before any state change; once stored it is pushed to hardware if the
    /// device is powered. A failed write leaves the stored value in place -
    /// the device is then out of sync until the control is re-applied,
    /// which stream start does for every control.
    pub fn set_control(&self, id: ControlId, value: u32) -> Result<(), ControlError> {
        let mut inner = self.lock();
        inner.controls.set(id, value)?;

        if !inner.powered {
            debug!("{id:?} stored while powered off, deferred to stream start");
            return Ok(());
        }
        inner.apply_control(id)
    }

    /// Start streaming: program the common registers (once per power
    /// cycle), the current mode, replay every control, then release the
    /// sensor from standby. A failure at any phase aborts the sequence and
    /// leaves the device powered but not streaming. No-op when already
    /// streaming.
    pub fn start_streaming(&self) -> Result<(), StreamError> {
        let mut inner = self.lock();

        if inner.streaming {
            return Ok(());
        }
        if !inner.powered {
            return Err(StreamError::NotPowered);
        }

        if !inner.common_regs_written {
            inner
                .write_regs(MODE_COMMON_REGS)
                .map_err(StreamError::CommonRegisters)?;
            let extra = inner.variant.extra_regs;
            inner
                .write_regs(extra)
                .map_err(StreamError::CommonRegisters)?;
            inner.common_regs_written = true;
        }

        let mode = inner.controls.mode();
        inner
            .write_regs(mode.registers)
            .map_err(StreamError::ModeRegisters)?;

        // Controls set while powered off were never written; replay them
        // all so the hardware matches the requested state.
        for id in ControlId::ALL {
            inner.apply_control(id).map_err(StreamError::ControlReplay)?;
        }

        inner
            .write_reg(REG_MODE_SELECT, RegWidth::U8, MODE_STREAMING)
            .map_err(StreamError::ModeSelect)?;
        inner.streaming = true;
        info!("streaming started, {}x{}", mode.width, mode.height);

        Ok(())
    }

    /// Stop streaming by returning the sensor to software standby. Best
    /// effort: a failed standby write is logged and the device is treated
    /// as stopped anyway. No-op when not streaming.
    pub fn stop_streaming(&self) {
        let mut inner = self.lock();

        if !inner.streaming {
            return;
        }
        if let Err(err) = inner.write_reg(REG_MODE_SELECT, RegWidth::U8, MODE_STANDBY) {
            warn!("failed to enter standby: {err}");
        }
        inner.streaming = false;
        info!("streaming stopped");
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, P> Inner<T, P>
where
    T: RegisterTransport,
    P: PowerControl,
{
    fn power_on(&mut self) -> Result<(), PowerError> {
        if self.powered {
            return Ok(());
        }
        self.power.enable()?;
        // T7 in the datasheet: the sensor needs 8ms between reset release
        // and the first register access.
        thread::sleep(Duration::from_micros(XCLR_MIN_DELAY_US));
        self.powered = true;
        Ok(())
    }

    fn power_off(&mut self) {
        if !self.powered {
            return;
        }
        self.power.disable();
        self.powered = false;
        self.streaming = false;
        // The hardware lost its programmed state; force the common program
        // on the next power-up.
        self.common_regs_written = false;
    }

    fn read_reg(&mut self, address: u16, width: RegWidth) -> Result<u32, TransportError> {
        self.transport.read(address, width)
    }

    fn write_reg(
        &mut self,
        address: u16,
        width: RegWidth,
        value: u32,
    ) -> Result<(), TransportError> {
        if value > width.max_value() {
            return Err(TransportError::InvalidArgument { width, value });
        }
        self.transport.write(address, width, value)
    }

    fn write_regs(&mut self, program: &[RegisterWrite]) -> Result<(), TransportError> {
        for entry in program {
            self.write_reg(entry.address, RegWidth::U8, u32::from(entry.value))?;
        }
        Ok(())
    }

    /// Program the frame length, spilling into the long-exposure shift when
    /// the line count exceeds the register's native range. The shift is
    /// remembered and applied to every subsequent exposure write.
    fn set_frame_length(&mut self, total_lines: u32) -> Result<(), TransportError> {
        let (value, shift) = timing::encode_frame_length(total_lines);
        self.long_exp_shift = shift;

        self.write_reg(REG_FRAME_LENGTH, RegWidth::U16, value)?;
        self.write_reg(REG_LONG_EXP_SHIFT, RegWidth::U8, u32::from(shift))
    }

    fn apply_control(&mut self, id: ControlId) -> Result<(), ControlError> {
        let mode = self.controls.mode();
        let value = self.controls.get(id);

        let result = match id {
            ControlId::Exposure => self.write_reg(
                REG_EXPOSURE,
                RegWidth::U16,
                value >> self.long_exp_shift,
            ),
            ControlId::AnalogGain => self.write_reg(REG_ANALOG_GAIN, RegWidth::U16, value),
            ControlId::DigitalGain => self.write_reg(REG_DIGITAL_GAIN, RegWidth::U16, value),
            // Both flip bits live in one register; either control writes
            // the combined value.
            ControlId::HFlip | ControlId::VFlip => {
                let orientation = self.controls.orientation();
                self.write_reg(REG_ORIENTATION, RegWidth::U8, orientation)
            }
            ControlId::VBlank => self.set_frame_length(mode.height + value),
            ControlId::HBlank => {
                self.write_reg(REG_LINE_LENGTH, RegWidth::U16, mode.width + value)
            }
            ControlId::TestPattern => {
                let pattern =
                    TestPattern::from_index(value).map_or(0, TestPattern::register_value);
                self.write_reg(REG_TEST_PATTERN, RegWidth::U16, pattern)
            }
            ControlId::TestPatternRed => {
                self.write_reg(REG_TEST_PATTERN_R, RegWidth::U16, value)
            }
            ControlId::TestPatternGreenR => {
                self.write_reg(REG_TEST_PATTERN_GR, RegWidth::U16, value)
            }
            ControlId::TestPatternBlue => {
                self.write_reg(REG_TEST_PATTERN_B, RegWidth::U16, value)
            }
            ControlId::TestPatternGreenB => {
                self.write_reg(REG_TEST_PATTERN_GB, RegWidth::U16, value)
            }
        };

        result.map_err(|source| ControlError::Apply {
            control: id,
            source,
        })
    }
}

/// The full mode catalog, in priority order.
#[must_use]
pub fn supported_modes() -> &'static [Mode] {
    SUPPORTED_MODES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPower, MockTransport};
    use crate::registers::REG_CHIP_ID;
    use crate::traits::PixelFormat;

    fn attach_device() -> (Imx477<MockTransport, MockPower>, MockTransport, MockPower) {
        let transport = MockTransport::new().with_register(REG_CHIP_ID, 0x0477);
        let power = MockPower::new();
        let device = Imx477::attach(transport.clone(), power.clone(), &IMX477P)
            .expect("attach should succeed");
        (device, transport, power)
    }

    #[test]
    fn test_attach_verifies_identity_and_powers_down() {
        let (device, _, power) = attach_device();
        assert!(!device.is_powered());
        assert!(!power.is_enabled());
        assert_eq!(power.enable_count(), 1);
    }

    #[test]
    fn test_attach_rejects_wrong_identity() {
        let transport = MockTransport::new().with_register(REG_CHIP_ID, 0x0219);
        let power = MockPower::new();
        let err = Imx477::attach(transport, power.clone(), &IMX477P)
            .expect_err("attach should fail");
        assert_eq!(
            err,
            AttachError::IdentityMismatch {
                expected: 0x0477,
                found: 0x0219
            }
        );
        assert!(!power.is_enabled());
    }

    #[test]
    fn test_attach_power_failure() {
        let transport = MockTransport::new().with_register(REG_CHIP_ID, 0x0477);
        let power = MockPower::new().fail_next_enable();
        let err = Imx477::attach(transport, power, &IMX477P).expect_err("attach should fail");
        assert!(matches!(err, AttachError::Power(_)));
    }

    #[test]
    fn test_default_mode_is_full_resolution() {
        let (device, _, _) = attach_device();
        let format = device.format();
        assert_eq!((format.width, format.height), (4056, 3040));
        assert_eq!(format.pixel_format, PixelFormat::SRGGB10);
    }

    #[test]
    fn test_set_format_negotiates_nearest_mode() {
        let (device, _, _) = attach_device();
        let actual = device
            .set_format(&Format::new(1920, 1088, PixelFormat::SRGGB10))
            .expect("set_format should succeed");
        assert_eq!((actual.width, actual.height), (1920, 1080));
        assert_eq!(device.frame_interval(), FrameInterval::new(100, 6000));
    }

    #[test]
    fn test_set_format_rejects_unknown_pixel_format() {
        let (device, _, _) = attach_device();
        let err = device
            .set_format(&Format::new(1920, 1080, PixelFormat::new(0x2006)))
            .expect_err("set_format should fail");
        assert_eq!(err, FormatError::Unsupported(PixelFormat::new(0x2006)));
        // The current mode is untouched.
        assert_eq!(device.format().width, 4056);
    }

    #[test]
    fn test_start_streaming_requires_power() {
        let (device, _, _) = attach_device();
        assert_eq!(device.start_streaming(), Err(StreamError::NotPowered));
    }

    #[test]
    fn test_control_writes_deferred_while_powered_off() {
        let (device, transport, _) = attach_device();
        transport.clear_writes();

        device
            .set_control(ControlId::AnalogGain, 200)
            .expect("set_control should succeed");
        assert_eq!(transport.write_count(), 0);
        assert_eq!(device.get_control(ControlId::AnalogGain), 200);
    }

    #[test]
    fn test_control_written_while_powered() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");
        transport.clear_writes();

        device
            .set_control(ControlId::AnalogGain, 200)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_ANALOG_GAIN), Some(200));
    }

    #[test]
    fn test_failed_control_write_keeps_requested_value() {
        let transport = MockTransport::new()
            .with_register(REG_CHIP_ID, 0x0477)
            .fail_writes_to(REG_ANALOG_GAIN);
        let device = Imx477::attach(transport, MockPower::new(), &IMX477P)
            .expect("attach should succeed");
        device.power_on().expect("power_on should succeed");

        let err = device
            .set_control(ControlId::AnalogGain, 200)
            .expect_err("write should fail");
        assert!(matches!(
            err,
            ControlError::Apply {
                control: ControlId::AnalogGain,
                ..
            }
        ));
        // In-memory value reflects the request, not the hardware.
        assert_eq!(device.get_control(ControlId::AnalogGain), 200);
    }

    #[test]
    fn test_rejected_control_value_touches_nothing() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");
        transport.clear_writes();

        let before = device.get_control(ControlId::DigitalGain);
        assert!(device.set_control(ControlId::DigitalGain, 0x00FF).is_err());
        assert_eq!(device.get_control(ControlId::DigitalGain), before);
        assert_eq!(transport.write_count(), 0);
    }

    #[test]
    fn test_flip_controls_write_combined_orientation() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");

        device
            .set_control(ControlId::HFlip, 1)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_ORIENTATION), Some(0b01));

        device
            .set_control(ControlId::VFlip, 1)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_ORIENTATION), Some(0b11));
    }

    #[test]
    fn test_vblank_write_becomes_frame_length() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");

        let vblank = device.control_range(ControlId::VBlank).min + 10;
        device
            .set_control(ControlId::VBlank, vblank)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_FRAME_LENGTH), Some(3040 + vblank));
        assert_eq!(transport.last_write(REG_LONG_EXP_SHIFT), Some(0));
    }

    #[test]
    fn test_long_exposure_shift_applies_to_exposure_writes() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");

        // A vblank deep into long-exposure territory forces a shift.
        let vblank = 0x0002_0000;
        device
            .set_control(ControlId::VBlank, vblank)
            .expect("set_control should succeed");
        let shift = transport
            .last_write(REG_LONG_EXP_SHIFT)
            .expect("shift register written");
        assert!(shift > 0);
        assert_eq!(
            transport.last_write(REG_FRAME_LENGTH),
            Some((3040 + vblank) >> shift)
        );

        let exposure = 40_000;
        device
            .set_control(ControlId::Exposure, exposure)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_EXPOSURE), Some(exposure >> shift));
        // The requested value stays in real scanline units.
        assert_eq!(device.get_control(ControlId::Exposure), exposure);
    }

    #[test]
    fn test_test_pattern_goes_through_indirection_table() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");

        device
            .set_control(ControlId::TestPattern, 1)
            .expect("set_control should succeed");
        // Selector 1 is colour bars, register value 2.
        assert_eq!(transport.last_write(REG_TEST_PATTERN), Some(2));
    }

    #[test]
    fn test_hblank_writes_line_length() {
        let (device, transport, _) = attach_device();
        device.power_on().expect("power_on should succeed");

        let hblank = device.control_range(ControlId::HBlank).min;
        device
            .set_control(ControlId::HBlank, hblank)
            .expect("set_control should succeed");
        assert_eq!(transport.last_write(REG_LINE_LENGTH), Some(4056 + hblank));
    }
}
