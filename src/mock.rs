//! Mock transport and power collaborators for testing without hardware.
//!
//! `MockTransport` records every register write and serves scripted read
//! values; cloning it yields a handle onto the same recorded state, so a
//! test can keep a probe while the device owns the transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{
    PowerControl, PowerError, RegWidth, RegisterTransport, TransportError,
};

#[derive(Debug, Default)]
struct TransportState {
    registers: HashMap<u16, u32>,
    writes: Vec<(u16, RegWidth, u32)>,
    fail_writes_to: Option<u16>,
}

/// Mock register transport: scripted reads, logged writes, optional
/// per-address write failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    /// Create a mock transport with no scripted registers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the value returned by reads of `address`.
    #[must_use]
    pub fn with_register(self, address: u16, value: u32) -> Self {
        self.lock().registers.insert(address, value);
        self
    }

    /// Make every write to `address` fail with a bus error.
    #[must_use]
    pub fn fail_writes_to(self, address: u16) -> Self {
        self.lock().fail_writes_to = Some(address);
        self
    }

    /// Total number of writes issued so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Values written to `address`, in order.
    #[must_use]
    pub fn writes_to(&self, address: u16) -> Vec<u32> {
        self.lock()
            .writes
            .iter()
            .filter(|(addr, _, _)| *addr == address)
            .map(|(_, _, value)| *value)
            .collect()
    }

    /// Last value written to `address`, if any.
    #[must_use]
    pub fn last_write(&self, address: u16) -> Option<u32> {
        self.writes_to(address).last().copied()
    }

    /// Forget recorded writes, keeping scripted reads and failure settings.
    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// Stop injecting write failures.
    pub fn heal(&self) {
        self.lock().fail_writes_to = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RegisterTransport for MockTransport {
    fn read(&mut self, address: u16, _width: RegWidth) -> Result<u32, TransportError> {
        Ok(self.lock().registers.get(&address).copied().unwrap_or(0))
    }

    fn write(
        &mut self,
        address: u16,
        width: RegWidth,
        value: u32,
    ) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.fail_writes_to == Some(address) {
            return Err(TransportError::Bus {
                address,
                message: "injected failure".to_owned(),
            });
        }
        state.writes.push((address, width, value));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PowerState {
    enabled: bool,
    enable_count: u32,
    fail_next_enable: bool,
}

/// Mock power collaborator with enable counting and failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockPower {
    state: Arc<Mutex<PowerState>>,
}

impl MockPower {
    /// Create a mock power collaborator, initially disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `enable()` call fail.
    #[must_use]
    pub fn fail_next_enable(self) -> Self {
        self.lock().fail_next_enable = true;
        self
    }

    /// Whether resources are currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Number of successful `enable()` calls.
    #[must_use]
    pub fn enable_count(&self) -> u32 {
        self.lock().enable_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PowerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PowerControl for MockPower {
    fn enable(&mut self) -> Result<(), PowerError> {
        let mut state = self.lock();
        if state.fail_next_enable {
            state.fail_next_enable = false;
            return Err(PowerError("injected failure".to_owned()));
        }
        state.enabled = true;
        state.enable_count += 1;
        Ok(())
    }

    fn disable(&mut self) {
        self.lock().enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_records_writes() {
        let mut transport = MockTransport::new();
        let probe = transport.clone();

        transport.write(0x0100, RegWidth::U8, 0x01).expect("write should succeed");
        transport.write(0x0340, RegWidth::U16, 3258).expect("write should succeed");

        assert_eq!(probe.write_count(), 2);
        assert_eq!(probe.last_write(0x0340), Some(3258));
        assert_eq!(probe.writes_to(0x0100), vec![0x01]);
    }

    #[test]
    fn test_mock_transport_scripted_read() {
        let mut transport = MockTransport::new().with_register(0x0016, 0x0477);
        assert_eq!(transport.read(0x0016, RegWidth::U16), Ok(0x0477));
        assert_eq!(transport.read(0x0017, RegWidth::U8), Ok(0));
    }

    #[test]
    fn test_mock_transport_write_failure_injection() {
        let mut transport = MockTransport::new().fail_writes_to(0x0202);
        assert!(transport.write(0x0202, RegWidth::U16, 1).is_err());
        assert!(transport.write(0x0204, RegWidth::U16, 1).is_ok());
        assert_eq!(transport.write_count(), 1);
    }

    #[test]
    fn test_mock_power_counts_enables() {
        let mut power = MockPower::new();
        assert!(!power.is_enabled());

        power.enable().expect("enable should succeed");
        assert!(power.is_enabled());
        assert_eq!(power.enable_count(), 1);

        power.disable();
        assert!(!power.is_enabled());
    }

    #[test]
    fn test_mock_power_failure_injection_is_one_shot() {
        let mut power = MockPower::new().fail_next_enable();
        assert!(power.enable().is_err());
        assert!(power.enable().is_ok());
    }
}
