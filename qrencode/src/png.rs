//! PNG rasterization: 8-bit RGB truecolor IHDR, deflate-compressed IDAT, and
//! IEND, with the standard signature and a per-chunk CRC-32.

use binrw::{BinWrite, binrw};
use std::io::Cursor;

use crate::matrix::ModuleGrid;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [0xFF, 0xFF, 0xFF];

#[binrw]
#[brw(big)]
struct IhdrBody {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
    compression_method: u8,
    filter_method: u8,
    interlace_method: u8,
}

/// Renders `grid` to PNG bytes at `scale` modules per pixel plus a light
/// `quiet_zone` of modules on every side, as an 8-bit RGB truecolor image
/// (`colorType = 2`): dark modules are black, light modules (including the
/// quiet zone) are white.
pub fn render_png(grid: &ModuleGrid, scale: u32, quiet_zone: u32) -> Vec<u8> {
    let module_size = grid.size();
    let pixel_size = module_size + quiet_zone * 2;
    let image_size = pixel_size * scale;

    let mut out = Vec::with_capacity(1024);
    out.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut out, b"IHDR", &ihdr_body_bytes(image_size, image_size));
    write_chunk(&mut out, b"IDAT", &idat_body(grid, scale, quiet_zone, image_size));
    write_chunk(&mut out, b"IEND", &[]);

    out
}

fn ihdr_body_bytes(width: u32, height: u32) -> Vec<u8> {
    let body = IhdrBody {
        width,
        height,
        bit_depth: 8,
        color_type: 2, // RGB truecolor
        compression_method: 0,
        filter_method: 0,
        interlace_method: 0,
    };
    let mut cursor = Cursor::new(Vec::new());
    body.write_be(&mut cursor).expect("writing a fixed-size IHDR body cannot fail");
    cursor.into_inner()
}

/// Builds the raw (pre-deflate) scanline data: each scanline is prefixed
/// with filter type `0` (None), followed by 3 bytes (R, G, B) per pixel.
fn idat_body(grid: &ModuleGrid, scale: u32, quiet_zone: u32, image_size: u32) -> Vec<u8> {
    let bytes_per_row = 1 + image_size as usize * 3;
    let mut raw = Vec::with_capacity(bytes_per_row * image_size as usize);

    for py in 0..image_size {
        raw.push(0); // filter type: None
        for px in 0..image_size {
            let rgb = if pixel_is_light(grid, scale, quiet_zone, px, py) { WHITE } else { BLACK };
            raw.extend_from_slice(&rgb);
        }
    }

    miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6)
}

fn pixel_is_light(grid: &ModuleGrid, scale: u32, quiet_zone: u32, px: u32, py: u32) -> bool {
    let module_x = px / scale;
    let module_y = py / scale;
    if module_x < quiet_zone || module_y < quiet_zone {
        return true;
    }
    let x = module_x as i32 - quiet_zone as i32;
    let y = module_y as i32 - quiet_zone as i32;
    !grid.is_dark(x, y)
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());

    let mut crc_input = Vec::with_capacity(4 + body.len());
    crc_input.extend_from_slice(chunk_type);
    crc_input.extend_from_slice(body);

    out.extend_from_slice(chunk_type);
    out.extend_from_slice(body);
    out.extend_from_slice(&crc32fast::hash(&crc_input).to_be_bytes());
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rendered_png_starts_with_signature_and_ends_with_iend() {
        let grid = ModuleGrid::new(1);
        let bytes = render_png(&grid, 4, 4);
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        assert_eq!(&bytes[bytes.len() - 8..bytes.len() - 4], b"IEND");
    }

    #[test]
    fn ihdr_reports_rgb_truecolor_and_scaled_dimensions() {
        let grid = ModuleGrid::new(1); // 21x21 modules
        let bytes = render_png(&grid, 4, 4);
        // IHDR chunk: 4 (len) + 4 ("IHDR") + 13 (body) + 4 (crc), body starts at offset 16
        let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        assert_eq!(width, (21 + 4 * 2) * 4);
        assert_eq!(bytes[24], 8); // bit depth
        assert_eq!(bytes[25], 2); // color type: truecolor
    }

    #[test]
    fn quiet_zone_is_all_light() {
        let grid = ModuleGrid::new(1);
        assert!(pixel_is_light(&grid, 1, 4, 0, 0));
    }
}
