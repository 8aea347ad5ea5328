use crate::mockup::MockupKind;

/// Scales a source raster to fit inside a bounding box without cropping.
///
/// Width is tried first at `max_w`; if the derived height overflows, the
/// pair is re-derived from `max_h` instead. Aspect ratio is preserved
/// exactly, and zero or negative dimensions are rejected rather than fed
/// into a division.
pub fn fit_within(source_w: f32, source_h: f32, max_w: f32, max_h: f32) -> Option<(f32, f32)> {
    if source_w <= 0.0 || source_h <= 0.0 || max_w <= 0.0 || max_h <= 0.0 {
        return None;
    }
    let mut width = max_w;
    let mut height = source_h / source_w * width;
    if height > max_h {
        height = max_h;
        width = source_w / source_h * height;
    }
    Some((width, height))
}

/// Where a captured mockup lands on its page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutDescriptor {
    /// Distance from the page top to the top edge of the placed image.
    pub vertical_offset_mm: f32,
    pub max_width_mm: f32,
    pub max_height_mm: f32,
}

const DEFAULT_LAYOUT: LayoutDescriptor = LayoutDescriptor {
    vertical_offset_mm: 60.0,
    max_width_mm: 160.0,
    max_height_mm: 170.0,
};

/// Per-mockup placement table. Kinds without an explicit entry fall back
/// to the default descriptor.
pub fn layout_for(kind: MockupKind) -> LayoutDescriptor {
    match kind {
        MockupKind::BusinessCard => LayoutDescriptor {
            vertical_offset_mm: 70.0,
            max_width_mm: 140.0,
            max_height_mm: 110.0,
        },
        MockupKind::Letterhead => LayoutDescriptor {
            vertical_offset_mm: 52.0,
            max_width_mm: 130.0,
            max_height_mm: 190.0,
        },
        MockupKind::Envelope => LayoutDescriptor {
            vertical_offset_mm: 82.0,
            max_width_mm: 160.0,
            max_height_mm: 100.0,
        },
        _ => DEFAULT_LAYOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fits(source_w: f32, source_h: f32, max_w: f32, max_h: f32) {
        let (w, h) = fit_within(source_w, source_h, max_w, max_h).expect("positive input");
        assert!(w <= max_w + 1e-4, "{w} exceeds {max_w}");
        assert!(h <= max_h + 1e-4, "{h} exceeds {max_h}");
        let source_ratio = source_w / source_h;
        let out_ratio = w / h;
        assert!(
            (source_ratio - out_ratio).abs() < 1e-3,
            "aspect drifted: {source_ratio} vs {out_ratio}"
        );
    }

    #[test]
    fn fit_is_bounded_and_aspect_preserving() {
        assert_fits(1050.0, 600.0, 140.0, 110.0);
        assert_fits(600.0, 1050.0, 140.0, 110.0);
        assert_fits(100.0, 100.0, 50.0, 200.0);
        assert_fits(3840.0, 2160.0, 10.0, 10.0);
    }

    #[test]
    fn wide_sources_are_width_limited() {
        let (w, h) = fit_within(200.0, 100.0, 100.0, 100.0).unwrap();
        assert_eq!(w, 100.0);
        assert_eq!(h, 50.0);
    }

    #[test]
    fn tall_sources_are_height_limited() {
        let (w, h) = fit_within(100.0, 200.0, 100.0, 100.0).unwrap();
        assert_eq!(h, 100.0);
        assert_eq!(w, 50.0);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(fit_within(0.0, 100.0, 50.0, 50.0), None);
        assert_eq!(fit_within(100.0, 0.0, 50.0, 50.0), None);
        assert_eq!(fit_within(100.0, 100.0, 0.0, 50.0), None);
    }

    #[test]
    fn unlisted_kinds_use_default_descriptor() {
        assert_eq!(layout_for(MockupKind::SocialAvatar), DEFAULT_LAYOUT);
        assert_eq!(layout_for(MockupKind::Slide), DEFAULT_LAYOUT);
        assert_ne!(layout_for(MockupKind::BusinessCard), DEFAULT_LAYOUT);
    }
}
