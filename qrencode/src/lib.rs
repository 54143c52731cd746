//! Byte-mode QR Code encoding and PNG rasterization.
//!
//! This crate implements one encoding mode — ISO/IEC 18004 "byte mode" —
//! across all 40 symbol versions and all 4 error correction levels. Given a
//! payload it picks the smallest version that fits, builds the padded data
//! codeword stream, appends Reed-Solomon error correction, places the result
//! into a module grid alongside the mandatory function patterns, tries all 8
//! data masks and keeps the lowest-penalty one, then optionally rasters the
//! result to an RGB PNG.

mod bitstream;
mod error;
mod galois;
mod info_bits;
mod level;
mod mask;
mod matrix;
mod png;
mod reed_solomon;
mod tables;

pub use error::QrError;
pub use level::EcLevel;
pub use tables::EcPlan;

use matrix::ModuleGrid;
use tracing::instrument;

/// A fully encoded QR Code: its module grid plus the version and level that
/// were selected (or requested) for it.
#[derive(Debug, Clone)]
pub struct QrCode {
    grid: ModuleGrid,
    version: u8,
    level: EcLevel,
    mask: u8,
}

impl QrCode {
    /// The symbol's side length in modules (`4 * version + 17`).
    pub fn size(&self) -> u32 {
        self.grid.size()
    }

    /// The version (`1..=40`) this code was encoded at.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The error correction level this code was encoded at.
    pub fn level(&self) -> EcLevel {
        self.level
    }

    /// The data mask pattern (`0..8`) chosen for this code.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Whether the module at `(x, y)` is dark (set). Modules outside
    /// `0..size()` are always light.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        self.grid.is_dark(x, y)
    }

    /// Renders this code to PNG bytes, `scale` pixels per module with a
    /// light quiet zone of `quiet_zone` modules on every side.
    pub fn render_png(&self, scale: u32, quiet_zone: u32) -> Vec<u8> {
        png::render_png(&self.grid, scale, quiet_zone)
    }
}

/// Output configuration for [`encode_with_config`].
///
/// `size` is the target output width/height in pixels; the actual per-module
/// scale is `size / (modules + margin * 2)`, floored but never below 1 so a
/// `size` smaller than the symbol is never silently empty. `margin` is the
/// quiet zone width in modules (the PNG standard and most scanners expect at
/// least 4). Defaults follow common QR generator conventions rather than the
/// teacher's own (which has no notion of pixel output at all).
#[derive(Debug, Clone, Copy)]
pub struct QrConfig {
    /// Target output width/height, in pixels.
    pub size: u32,
    /// Quiet zone width, in modules.
    pub margin: u32,
    /// Error correction level to encode at.
    pub level: EcLevel,
}

impl Default for QrConfig {
    fn default() -> Self {
        QrConfig { size: 256, margin: 4, level: EcLevel::Medium }
    }
}

/// Encodes `payload` as a byte-mode QR Code at the requested error
/// correction `level`, automatically selecting the smallest version that
/// fits.
#[instrument(skip(payload))]
pub fn encode(payload: &[u8], level: EcLevel) -> Result<QrCode, QrError> {
    encode_at_version(payload, level, None)
}

/// Encodes `payload` at an explicit `version` (`1..=40`) rather than letting
/// [`encode`] pick the smallest one. Returns [`QrError::PayloadTooLarge`] if
/// the payload does not fit at that version and level.
#[instrument(skip(payload))]
pub fn encode_with_version(payload: &[u8], level: EcLevel, version: u8) -> Result<QrCode, QrError> {
    if !(1..=40).contains(&version) {
        return Err(QrError::InvalidVersion { version });
    }
    encode_at_version(payload, level, Some(version))
}

/// Convenience wrapper: encodes and directly rasters to PNG bytes at the
/// given `scale`/`quiet_zone`.
pub fn encode_png(payload: &[u8], level: EcLevel, scale: u32, quiet_zone: u32) -> Result<Vec<u8>, QrError> {
    Ok(encode(payload, level)?.render_png(scale, quiet_zone))
}

/// Encodes and rasters `payload` per a [`QrConfig`], deriving the PNG's
/// per-module pixel scale from `config.size` and `config.margin`.
pub fn encode_with_config(payload: &[u8], config: &QrConfig) -> Result<Vec<u8>, QrError> {
    let code = encode(payload, config.level)?;
    let modules = code.size() + config.margin * 2;
    let scale = (config.size / modules.max(1)).max(1);
    Ok(code.render_png(scale, config.margin))
}

fn encode_at_version(
    payload: &[u8],
    level: EcLevel,
    requested_version: Option<u8>,
) -> Result<QrCode, QrError> {
    let version = match requested_version {
        Some(v) => {
            let capacity = tables::byte_capacity(v, level);
            if payload.len() > capacity {
                return Err(QrError::PayloadTooLarge { len: payload.len(), max_capacity: capacity });
            }
            v
        }
        None => bitstream::select_version(payload.len(), level)?,
    };

    let plan = tables::ec_plan(version, level);
    let data_codewords = bitstream::build_data_codewords(payload, version, &plan);
    let all_codewords = bitstream::interleave_with_ec(&data_codewords, &plan);

    let mut grid = ModuleGrid::new(version);
    grid.draw_function_patterns(version);
    grid.place_data_bits(&all_codewords);

    let mask = mask::best_mask(&mut grid, level, version);

    tracing::trace!(version, ?level, mask, "encoded QR Code");

    Ok(QrCode { grid, version, level, mask })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encodes_hello_at_level_m() {
        let code = encode(b"HELLO", EcLevel::Medium).unwrap();
        assert_eq!(code.version(), 1);
        assert_eq!(code.size(), 21);
        assert!(code.mask() < 8);
    }

    #[test]
    fn rejects_oversized_payload() {
        let payload = vec![0u8; 10_000];
        let err = encode(&payload, EcLevel::High).unwrap_err();
        assert!(matches!(err, QrError::PayloadTooLarge { .. }));
    }

    #[test]
    fn rejects_invalid_explicit_version() {
        let err = encode_with_version(b"hi", EcLevel::Low, 41).unwrap_err();
        assert!(matches!(err, QrError::InvalidVersion { version: 41 }));
    }

    #[test]
    fn png_round_trip_produces_valid_signature() {
        let bytes = encode_png(b"HELLO", EcLevel::Medium, 4, 4).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn encode_with_config_respects_default_margin_and_size() {
        let config = QrConfig::default();
        let bytes = encode_with_config(b"HELLO", &config).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn finder_pattern_corner_is_dark() {
        let code = encode(b"HELLO", EcLevel::Medium).unwrap();
        assert!(code.is_dark(3, 3));
    }
}
