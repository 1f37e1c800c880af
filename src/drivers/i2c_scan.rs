//! Boot-time I2C bus discovery.
//!
//! Probes every non-reserved 7-bit address with a one-byte read and
//! collects the ones that ACK.  Only used for diagnostics; nothing at
//! runtime depends on the result.

use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::info;

/// First and last non-reserved 7-bit addresses.
pub const FIRST_ADDRESS: u8 = 0x08;
pub const LAST_ADDRESS: u8 = 0x77;

/// Enough room for every probed address.
pub const MAX_DEVICES: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// Addresses that answered, in ascending order.
pub fn scan_bus<I2C: I2c>(i2c: &mut I2C) -> Vec<u8, MAX_DEVICES> {
    let mut found = Vec::new();
    let mut buf = [0u8; 1];
    for addr in FIRST_ADDRESS..=LAST_ADDRESS {
        if i2c.read(addr, &mut buf).is_ok() {
            // Capacity covers the whole probed range.
            let _ = found.push(addr);
        }
    }
    found
}

/// Log the result of [`scan_bus`].
pub fn log_scan(found: &[u8]) {
    if found.is_empty() {
        info!("No I2C devices found");
        return;
    }
    info!("I2C devices found: {}", found.len());
    for addr in found {
        info!("  0x{:02X}", addr);
    }
}
