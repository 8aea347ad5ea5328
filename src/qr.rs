use qrcode::{EcLevel, QrCode};

/// Quiet zone width in modules, per the QR specification.
const QUIET_MODULES: u32 = 4;

/// Encodes `url` as a QR symbol at error-correction level M and renders it
/// to an RGB raster, `module_px` pixels per module, quiet zone included.
/// Returns `None` when the payload cannot be encoded; the share page then
/// omits the barcode only.
pub(crate) fn qr_raster(url: &str, module_px: u32) -> Option<(Vec<u8>, u32, u32)> {
    let module_px = module_px.max(1);
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M).ok()?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + 2 * QUIET_MODULES) * module_px;
    let mut rgb = vec![255u8; (side * side * 3) as usize];
    for (index, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = index as u32 % modules + QUIET_MODULES;
        let my = index as u32 / modules + QUIET_MODULES;
        for py in my * module_px..(my + 1) * module_px {
            let row = (py * side + mx * module_px) as usize * 3;
            for px in 0..module_px as usize {
                let at = row + px * 3;
                rgb[at] = 0;
                rgb[at + 1] = 0;
                rgb[at + 2] = 0;
            }
        }
    }
    Some((rgb, side, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_square_and_scaled() {
        let (rgb, w, h) = qr_raster("https://brandbook.example?b=abc", 4).expect("encodes");
        assert_eq!(w, h);
        assert_eq!(w % 4, 0);
        assert_eq!(rgb.len(), (w * h * 3) as usize);
        // Finder patterns guarantee some dark pixels.
        assert!(rgb.iter().any(|&b| b == 0));
    }

    #[test]
    fn same_payload_same_pixels() {
        let a = qr_raster("https://brandbook.example?b=abc", 4).unwrap();
        let b = qr_raster("https://brandbook.example?b=abc", 4).unwrap();
        assert_eq!(a, b);
    }
}
