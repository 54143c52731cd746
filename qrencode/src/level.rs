//! Error correction levels.

/// QR Code error correction level.
///
/// Higher levels tolerate more symbol damage at the cost of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcLevel {
    /// ~7% of codewords can be restored.
    Low,
    /// ~15% of codewords can be restored.
    Medium,
    /// ~25% of codewords can be restored.
    Quartile,
    /// ~30% of codewords can be restored.
    High,
}

impl EcLevel {
    /// Row index into the per-version tables in [`crate::tables`].
    pub(crate) fn table_index(self) -> usize {
        match self {
            EcLevel::Low => 0,
            EcLevel::Medium => 1,
            EcLevel::Quartile => 2,
            EcLevel::High => 3,
        }
    }

    /// The 2-bit field used in format-info encoding (spec: `level:2|mask:3`).
    ///
    /// Per the QR Code standard this is not the same ordering as
    /// [`EcLevel::table_index`] — Medium is `0b00`, Low is `0b01`, High is
    /// `0b10`, Quartile is `0b11`.
    pub(crate) fn format_bits(self) -> u32 {
        match self {
            EcLevel::Medium => 0,
            EcLevel::Low => 1,
            EcLevel::High => 2,
            EcLevel::Quartile => 3,
        }
    }
}
