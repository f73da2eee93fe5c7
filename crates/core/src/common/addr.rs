//! Simulated address-space geometry.
//!
//! The peer owns a flat region of `size` bytes addressed at `line_size` granularity. This
//! module provides:
//! 1. **Validation:** Power-of-two sizes so wraparound can use a bitmask.
//! 2. **Address Manipulation:** Wrapping, line alignment and the pointer-chase hop.
//! 3. **Iteration:** Every line-aligned offset in ascending order.

use serde::Serialize;

use super::constants::LINE_BYTES;
use super::error::ConfigError;

/// Geometry of the peer-owned memory region.
///
/// Construct with [`AddressSpace::new`]; a value of this type always has a power-of-two
/// `size` and a power-of-two `line_size` no larger than the wire payload, so
/// `addr & mask()` is a correct modulo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AddressSpace {
    size: u64,
    line_size: u64,
}

impl AddressSpace {
    /// Creates a validated address space.
    ///
    /// # Arguments
    ///
    /// * `size` - Region size in bytes; must be a power of two.
    /// * `line_size` - Access granularity in bytes; power of two, at most [`LINE_BYTES`]
    ///   and at most `size`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Geometry`] when any constraint is violated.
    pub fn new(size: u64, line_size: u64) -> Result<Self, ConfigError> {
        if !size.is_power_of_two() {
            return Err(ConfigError::Geometry(format!(
                "array size {size} is not a power of two"
            )));
        }
        if !line_size.is_power_of_two() || line_size > LINE_BYTES as u64 {
            return Err(ConfigError::Geometry(format!(
                "line size {line_size} must be a power of two no larger than {LINE_BYTES}"
            )));
        }
        if line_size > size {
            return Err(ConfigError::Geometry(format!(
                "line size {line_size} exceeds array size {size}"
            )));
        }
        Ok(Self { size, line_size })
    }

    /// Returns the region size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the access granularity in bytes.
    #[inline]
    pub fn line_size(&self) -> u64 {
        self.line_size
    }

    /// Returns the number of lines in the region.
    #[inline]
    pub fn lines(&self) -> u64 {
        self.size / self.line_size
    }

    /// Returns the wraparound mask (`size - 1`).
    #[inline]
    pub fn mask(&self) -> u64 {
        self.size - 1
    }

    /// Wraps an arbitrary offset into `[0, size)`.
    #[inline]
    pub fn wrap(&self, addr: u64) -> u64 {
        addr & self.mask()
    }

    /// Rounds an offset down to the start of its line.
    #[inline]
    pub fn align_down(&self, addr: u64) -> u64 {
        addr & !(self.line_size - 1)
    }

    /// Returns `true` if `addr` is inside the region and line-aligned.
    #[inline]
    pub fn is_line_addr(&self, addr: u64) -> bool {
        addr < self.size && self.align_down(addr) == addr
    }

    /// Computes the next pointer-chase position.
    ///
    /// The hop is `hop` lines forward from `position`, wrapped into the region. `hop` is the
    /// first payload byte of the previous READ, so the largest possible step is
    /// `255 * line_size`, which cannot overflow for any `position < size`.
    #[inline]
    pub fn next_position(&self, position: u64, hop: u8) -> u64 {
        position.wrapping_add(u64::from(hop) * self.line_size) & self.mask()
    }

    /// Iterates every line-aligned offset from zero up to `size`.
    pub fn line_addrs(&self) -> impl Iterator<Item = u64> {
        let line = self.line_size;
        (0..self.lines()).map(move |i| i * line)
    }
}
