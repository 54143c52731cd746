//! Per-version, per-level constant tables.
//!
//! Grounded on the reference tables from the QR Code model 2 standard, as
//! reproduced by `nayuki-QR-Code-generator`'s `rust/src/lib.rs`
//! (`ECC_CODEWORDS_PER_BLOCK`, `NUM_ERROR_CORRECTION_BLOCKS`,
//! `get_alignment_pattern_positions`).

/// EC codewords per block, indexed `[level][version]` (version 0 unused).
const ECC_CODEWORDS_PER_BLOCK: [[i16; 41]; 4] = [
    [-1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // Low
    [-1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28], // Medium
    [-1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // Quartile
    [-1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // High
];

/// Number of EC blocks, indexed `[level][version]` (version 0 unused).
const NUM_ERROR_CORRECTION_BLOCKS: [[i16; 41]; 4] = [
    [-1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13, 14,
        15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25], // Low
    [-1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23, 25,
        26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49], // Medium
    [-1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29, 34,
        34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68], // Quartile
    [-1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35, 37,
        40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81], // High
];

/// Number of bits used for the byte-mode character-count field at the given
/// version: 8 bits for versions 1-9, 16 bits for versions 10-40.
pub(crate) fn char_count_bits(version: u8) -> u32 {
    if version <= 9 {
        8
    } else {
        16
    }
}

/// Total data+EC modules available in a symbol of the given version, before
/// subtracting function patterns. Mirrors `get_num_raw_data_modules`.
fn raw_data_modules(version: u8) -> usize {
    let v = version as usize;
    let mut result = (16 * v + 128) * v + 64;
    if version >= 2 {
        let num_align = v / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if version >= 7 {
            result -= 18 * 2;
        }
    }
    result
}

/// `(dataCodewords, ecPerBlock, g1Blocks, g1DataPerBlock, g2Blocks, g2DataPerBlock)`
/// for a given `(version, level)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcPlan {
    /// Total data codewords across all blocks.
    pub data_codewords: usize,
    /// EC codewords appended to every block.
    pub ec_per_block: usize,
    /// Number of "short" blocks (group 1).
    pub g1_blocks: usize,
    /// Data codewords per group-1 block.
    pub g1_data_per_block: usize,
    /// Number of "long" blocks (group 2), one longer by a single codeword.
    pub g2_blocks: usize,
    /// Data codewords per group-2 block.
    pub g2_data_per_block: usize,
}

/// Looks up the EC plan for `(version, level)`.
pub(crate) fn ec_plan(version: u8, level: crate::EcLevel) -> EcPlan {
    let li = level.table_index();
    let vi = version as usize;
    let ec_per_block = ECC_CODEWORDS_PER_BLOCK[li][vi] as usize;
    let num_blocks = NUM_ERROR_CORRECTION_BLOCKS[li][vi] as usize;
    let raw_codewords = raw_data_modules(version) / 8;
    let data_codewords = raw_codewords - ec_per_block * num_blocks;

    let num_long_blocks = raw_codewords % num_blocks;
    let num_short_blocks = num_blocks - num_long_blocks;
    let short_data = data_codewords / num_blocks;
    let long_data = if num_long_blocks > 0 { short_data + 1 } else { short_data };

    EcPlan {
        data_codewords,
        ec_per_block,
        g1_blocks: num_short_blocks,
        g1_data_per_block: short_data,
        g2_blocks: num_long_blocks,
        g2_data_per_block: long_data,
    }
}

/// Maximum byte-mode payload (the capacity table) for `(version,
/// level)`: the data codewords minus the 4-bit mode nibble and character
/// count field, floored to whole bytes.
pub(crate) fn byte_capacity(version: u8, level: crate::EcLevel) -> usize {
    let plan = ec_plan(version, level);
    let header_bits = 4 + char_count_bits(version);
    let data_bits = plan.data_codewords * 8;
    data_bits.saturating_sub(header_bits as usize) / 8
}

/// Alignment pattern center coordinates for a version, ascending, per
/// `get_alignment_pattern_positions`. Empty for version 1.
pub(crate) fn alignment_positions(version: u8) -> Vec<i32> {
    if version == 1 {
        return Vec::new();
    }
    let v = version as i32;
    let num_align = v / 7 + 2;
    let step = if version != 32 {
        (v * 4 + num_align * 2 + 1) / (2 * num_align - 2) * 2
    } else {
        26
    };
    let mut result = vec![6i32];
    let mut pos = v * 4 + 10;
    for _ in 0..num_align - 1 {
        result.insert(1, pos);
        pos -= step;
    }
    result
}
