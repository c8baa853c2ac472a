//! Block count formatting
//!
//! One block is 2 KiB. Values escalate to MiB at 1024 KiB and to GiB at
//! 1024 MiB unless a [`UnitCeiling`] stops them. Magnitudes are truncated.

use crate::BLOCK_SIZE;

/// Largest unit a formatted value may be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCeiling {
    /// Always KiB
    Kib,
    /// KiB or MiB
    Mib,
    /// KiB, MiB or GiB
    Gib,
}

/// Format a block count as a size, or as a rate when `rate` is set
pub fn format_blocks(blocks: u64, ceiling: UnitCeiling, rate: bool) -> String {
    let mut value = blocks.saturating_mul((BLOCK_SIZE / 1024) as u64);
    let mut unit = "KiB";

    if value >= 1024 && ceiling != UnitCeiling::Kib {
        value /= 1024;
        unit = "MiB";
        if value >= 1024 && ceiling == UnitCeiling::Gib {
            value /= 1024;
            unit = "GiB";
        }
    }

    if rate {
        format!("{} {}/s", value, unit)
    } else {
        format!("{} {}", value, unit)
    }
}
