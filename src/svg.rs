/// Rasterizes SVG markup into a straight-alpha RGBA buffer no larger than
/// `max_px` on either side. Returns `None` for unparsable markup so the
/// caller can degrade to the no-logo path.
#[cfg(feature = "svg_raster")]
pub(crate) fn rasterize_svg(svg_xml: &str, max_px: u32) -> Option<(Vec<u8>, u32, u32)> {
    use crate::fit::fit_within;
    use resvg::usvg;

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_xml, &opt).ok()?;

    let source_w = tree.size.width();
    let source_h = tree.size.height();
    let (w, h) = fit_within(source_w, source_h, max_px as f32, max_px as f32)?;
    let w = w.round().max(1.0) as u32;
    let h = h.round().max(1.0) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)?;
    let transform =
        resvg::tiny_skia::Transform::from_scale(w as f32 / source_w, h as f32 / source_h);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Some((rgba, w, h))
}

#[cfg(not(feature = "svg_raster"))]
pub(crate) fn rasterize_svg(_svg_xml: &str, _max_px: u32) -> Option<(Vec<u8>, u32, u32)> {
    None
}

#[cfg(all(test, feature = "svg_raster"))]
mod tests {
    use super::*;

    #[test]
    fn simple_svg_rasterizes_within_bounds() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
            <rect width="200" height="100" fill="#FF5733"/>
        </svg>"##;
        let (rgba, w, h) = rasterize_svg(svg, 64).expect("valid svg");
        assert!(w <= 64 && h <= 64);
        assert_eq!(rgba.len(), (w * h * 4) as usize);
        // 2:1 aspect survives the fit.
        assert_eq!(w, 64);
        assert_eq!(h, 32);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(rasterize_svg("<not-svg>", 64).is_none());
    }
}
