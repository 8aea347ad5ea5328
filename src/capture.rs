use crate::error::BrandbookError;
use crate::fit::fit_within;
use crate::font::FontRegistry;
use crate::images::{ImageData, StoredImage};
use crate::mockup::{FontSlot, MockupKind, TextAnchor, ViewNode, ViewTree};
use crate::perf::{GenerationTimings, elapsed_ms};
use crate::profile::BrandProfile;
use crate::types::Color;
use image::{GenericImageView, ImageEncoder};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tiny_skia::{
    FillRule, FilterQuality, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Raster codec for mockup captures. Lossy JPEG is the default because the
/// flattened mockups dominate generation time and file size; PNG is the
/// lossless path for alpha-heavy content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCodec {
    Jpeg { quality: u8 },
    Png,
}

impl Default for CaptureCodec {
    fn default() -> Self {
        CaptureCodec::Jpeg { quality: 82 }
    }
}

/// One rasterized mockup snapshot, valid for a single generation run.
/// Consumed exactly once by the matching mockup page builder.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub kind: MockupKind,
    pub page_label: String,
    pub bytes: Vec<u8>,
    pub codec: CaptureCodec,
    /// Confirmed by decoding the encoded bytes, never assumed.
    pub width: u32,
    pub height: u32,
}

impl CaptureRecord {
    /// Re-expands the encoded capture into the store representation the
    /// PDF writer embeds. JPEG passes through untouched.
    pub(crate) fn to_stored(&self) -> Result<StoredImage, BrandbookError> {
        let data = match self.codec {
            CaptureCodec::Jpeg { .. } => ImageData::Jpeg(self.bytes.clone()),
            CaptureCodec::Png => {
                let decoded = image::load_from_memory(&self.bytes)
                    .map_err(|e| BrandbookError::Capture(format!("png re-decode failed: {e}")))?;
                let rgba = decoded.to_rgba8();
                let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
                let mut alpha = Vec::with_capacity((self.width * self.height) as usize);
                let mut has_alpha = false;
                for pixel in rgba.pixels() {
                    let [r, g, b, a] = pixel.0;
                    if a != 255 {
                        has_alpha = true;
                    }
                    rgb.extend_from_slice(&[r, g, b]);
                    alpha.push(a);
                }
                ImageData::Raw {
                    rgb,
                    alpha: has_alpha.then_some(alpha),
                }
            }
        };
        Ok(StoredImage {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

/// Per-mockup result. A failure carries its reason and never aborts the
/// rest of the batch.
#[derive(Debug)]
pub(crate) enum CaptureOutcome {
    Captured(CaptureRecord),
    Failed { kind: MockupKind, reason: String },
}

#[derive(Debug, Clone)]
pub(crate) struct CaptureJob {
    pub kind: MockupKind,
    pub page_label: String,
}

/// Decoded brand logo, kept in both straight RGBA (for PDF embedding) and
/// premultiplied pixmap form (for compositing into captures).
#[derive(Debug, Clone)]
pub(crate) struct LogoAsset {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pixmap: Pixmap,
}

impl LogoAsset {
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<LogoAsset> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        let mut premultiplied = Vec::with_capacity(rgba.len());
        for pixel in rgba.chunks_exact(4) {
            let a = pixel[3] as u16;
            premultiplied.push(((pixel[0] as u16 * a + 127) / 255) as u8);
            premultiplied.push(((pixel[1] as u16 * a + 127) / 255) as u8);
            premultiplied.push(((pixel[2] as u16 * a + 127) / 255) as u8);
            premultiplied.push(pixel[3]);
        }
        let pixmap = Pixmap::from_vec(premultiplied, IntSize::from_wh(width, height)?)?;
        Some(LogoAsset {
            rgba,
            width,
            height,
            pixmap,
        })
    }

    pub(crate) fn to_stored(&self) -> StoredImage {
        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        let mut alpha = Vec::with_capacity((self.width * self.height) as usize);
        let mut has_alpha = false;
        for pixel in self.rgba.chunks_exact(4) {
            if pixel[3] != 255 {
                has_alpha = true;
            }
            rgb.extend_from_slice(&pixel[..3]);
            alpha.push(pixel[3]);
        }
        StoredImage {
            width: self.width,
            height: self.height,
            data: ImageData::Raw {
                rgb,
                alpha: has_alpha.then_some(alpha),
            },
        }
    }
}

struct Staging {
    pixmap: Pixmap,
}

/// Renders mockup view trees into a shared staging pixmap and encodes the
/// results.
///
/// Captures must run one at a time: the staging surface is cleared and
/// repopulated per mockup, so the `Mutex` around it is a correctness
/// requirement, not contention tuning. `capture_all` additionally walks
/// jobs in their given order.
pub(crate) struct CaptureEngine {
    registry: Arc<FontRegistry>,
    codec: CaptureCodec,
    logo: Option<LogoAsset>,
    staging: Mutex<Staging>,
}

impl CaptureEngine {
    pub fn new(
        registry: Arc<FontRegistry>,
        codec: CaptureCodec,
        logo: Option<LogoAsset>,
    ) -> Result<CaptureEngine, BrandbookError> {
        let (max_w, max_h) = MockupKind::ALL.iter().fold((1, 1), |(w, h), kind| {
            let (kw, kh) = kind.stage_size();
            (w.max(kw), h.max(kh))
        });
        let pixmap = Pixmap::new(max_w, max_h).ok_or_else(|| {
            BrandbookError::Capture(format!("staging surface {max_w}x{max_h} allocation failed"))
        })?;
        Ok(CaptureEngine {
            registry,
            codec,
            logo,
            staging: Mutex::new(Staging { pixmap }),
        })
    }

    /// Captures every job sequentially. Failures are logged and carried as
    /// outcomes; the batch always completes.
    pub fn capture_all(
        &self,
        jobs: &[CaptureJob],
        profile: &BrandProfile,
        timings: &GenerationTimings,
    ) -> Vec<CaptureOutcome> {
        let batch_start = Instant::now();
        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            let start = Instant::now();
            let outcome = match self.capture_one(job, profile) {
                Ok(record) => CaptureOutcome::Captured(record),
                Err(err) => {
                    log::warn!("capture of {} failed: {err}; page skipped", job.kind.id());
                    CaptureOutcome::Failed {
                        kind: job.kind,
                        reason: err.to_string(),
                    }
                }
            };
            timings.record_mockup(job.kind.id(), elapsed_ms(start));
            outcomes.push(outcome);
        }
        timings.record_phase("captures", elapsed_ms(batch_start));
        outcomes
    }

    fn capture_one(
        &self,
        job: &CaptureJob,
        profile: &BrandProfile,
    ) -> Result<CaptureRecord, BrandbookError> {
        let tree = job.kind.template(profile);
        if tree.width == 0 || tree.height == 0 {
            return Err(BrandbookError::Capture(format!(
                "{} template has a zero dimension",
                job.kind.id()
            )));
        }

        let mut staging = self
            .staging
            .lock()
            .map_err(|_| BrandbookError::Capture("staging surface lock poisoned".to_string()))?;
        if staging.pixmap.width() < tree.width || staging.pixmap.height() < tree.height {
            return Err(BrandbookError::Capture(format!(
                "{} at {}x{} exceeds the staging surface",
                job.kind.id(),
                tree.width,
                tree.height
            )));
        }

        self.render_tree(&mut staging.pixmap, &tree, profile);
        let rgba = extract_region(&staging.pixmap, tree.width, tree.height);
        drop(staging);

        let bytes = encode_capture(&rgba, tree.width, tree.height, self.codec)?;

        // Confirm dimensions from the actual decoded asset; a mismatch
        // means the encode went wrong and the page must be skipped.
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| BrandbookError::Capture(format!("{} decode: {e}", job.kind.id())))?;
        if decoded.dimensions() != (tree.width, tree.height) {
            return Err(BrandbookError::Capture(format!(
                "{} decoded to {:?}, expected {}x{}",
                job.kind.id(),
                decoded.dimensions(),
                tree.width,
                tree.height
            )));
        }

        Ok(CaptureRecord {
            kind: job.kind,
            page_label: job.page_label.clone(),
            bytes,
            codec: self.codec,
            width: tree.width,
            height: tree.height,
        })
    }

    fn render_tree(&self, pixmap: &mut Pixmap, tree: &ViewTree, profile: &BrandProfile) {
        pixmap.fill(to_skia_color(tree.background));
        for node in &tree.nodes {
            match node {
                ViewNode::Rect {
                    x,
                    y,
                    w,
                    h,
                    radius,
                    color,
                } => {
                    if let Some(path) = rounded_rect_path(*x, *y, *w, *h, *radius) {
                        fill_path(pixmap, &path, *color);
                    }
                }
                ViewNode::Circle { cx, cy, r, color } => {
                    let mut pb = PathBuilder::new();
                    pb.push_circle(*cx, *cy, *r);
                    if let Some(path) = pb.finish() {
                        fill_path(pixmap, &path, *color);
                    }
                }
                ViewNode::Text {
                    x,
                    y,
                    size,
                    font,
                    color,
                    anchor,
                    content,
                } => {
                    self.draw_text(pixmap, profile, *x, *y, *size, *font, *color, *anchor, content);
                }
                ViewNode::Logo { x, y, w, h } => {
                    if let Some(logo) = &self.logo {
                        draw_logo(pixmap, logo, *x, *y, *w, *h);
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        profile: &BrandProfile,
        x: f32,
        y: f32,
        size: f32,
        slot: FontSlot,
        color: Color,
        anchor: TextAnchor,
        content: &str,
    ) {
        let family = match slot {
            FontSlot::Primary => profile.typography.primary.family.as_str(),
            FontSlot::Secondary => profile
                .typography
                .secondary
                .as_ref()
                .map(|f| f.family.as_str())
                .unwrap_or(profile.typography.primary.family.as_str()),
        };
        let font = self
            .registry
            .resolve(family)
            .or_else(|| self.registry.fallback());
        let Some(font) = font else {
            log::debug!("no usable font for '{family}'; text skipped in capture");
            return;
        };
        let Ok(face) = ttf_parser::Face::parse(&font.data, 0) else {
            log::warn!("font '{}' failed to parse; text skipped", font.name);
            return;
        };

        let placements = layout_glyphs(&face, content, size);
        let total_advance = placements.last().map(|p| p.pen_after).unwrap_or(0.0);
        let origin_x = match anchor {
            TextAnchor::Start => x,
            TextAnchor::Middle => x - total_advance / 2.0,
        };

        let paint = solid_paint(color);
        for placement in &placements {
            let mut builder =
                GlyphPathBuilder::new(origin_x + placement.pen_before, y, placement.scale);
            if face
                .outline_glyph(GlyphId(placement.glyph_id), &mut builder)
                .is_none()
            {
                continue;
            }
            let Some(path) = builder.finish() else {
                continue;
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

struct GlyphPlacement {
    glyph_id: u16,
    pen_before: f32,
    pen_after: f32,
    scale: f32,
}

/// Direct codepoint-to-glyph layout with horizontal advances. Missing
/// glyphs advance half an em so spacing stays plausible.
fn layout_glyphs(face: &ttf_parser::Face<'_>, text: &str, font_size: f32) -> Vec<GlyphPlacement> {
    let units_per_em = face.units_per_em().max(1) as f32;
    let scale = font_size / units_per_em;

    let mut out = Vec::new();
    let mut pen_x = 0.0f32;
    for ch in text.chars() {
        let gid = face.glyph_index(ch).map(|id| id.0).unwrap_or(0);
        if gid == 0 {
            pen_x += font_size * 0.5;
            continue;
        }
        let advance_units = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0) as f32;
        let mut advance = advance_units * scale;
        if advance <= 0.0 {
            advance = font_size * 0.5;
        }
        out.push(GlyphPlacement {
            glyph_id: gid,
            pen_before: pen_x,
            pen_after: pen_x + advance,
            scale,
        });
        pen_x += advance;
    }
    out
}

/// Builds a tiny-skia path from a glyph outline. Font units are y-up, the
/// pixmap is y-down, hence the flip around the baseline.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x2 * self.scale,
            self.origin_y - y2 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    if radius <= 0.0 {
        pb.push_rect(tiny_skia::Rect::from_xywh(x, y, w, h)?);
        return pb.finish();
    }
    let r = radius.min(w / 2.0).min(h / 2.0);
    let k = 0.552_284_8 * r;
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

fn fill_path(pixmap: &mut Pixmap, path: &Path, color: Color) {
    let paint = solid_paint(color);
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        1.0,
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}

fn draw_logo(pixmap: &mut Pixmap, logo: &LogoAsset, x: f32, y: f32, w: f32, h: f32) {
    let Some((fit_w, fit_h)) = fit_within(logo.width as f32, logo.height as f32, w, h) else {
        return;
    };
    let scale_x = fit_w / logo.width as f32;
    let scale_y = fit_h / logo.height as f32;
    let tx = x + (w - fit_w) / 2.0;
    let ty = y + (h - fit_h) / 2.0;
    let mut paint = PixmapPaint::default();
    paint.quality = FilterQuality::Bilinear;
    pixmap.draw_pixmap(
        0,
        0,
        logo.pixmap.as_ref(),
        &paint,
        Transform::from_row(scale_x, 0.0, 0.0, scale_y, tx, ty),
        None,
    );
}

/// Copies the top-left `width`×`height` region out of the (larger) staging
/// pixmap as straight RGBA rows.
fn extract_region(pixmap: &Pixmap, width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    let stride = pixmap.width() as usize;
    let pixels = pixmap.pixels();
    for row in 0..height as usize {
        let start = row * stride;
        for pixel in &pixels[start..start + width as usize] {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
    }
    rgba
}

fn encode_capture(
    rgba: &[u8],
    width: u32,
    height: u32,
    codec: CaptureCodec,
) -> Result<Vec<u8>, BrandbookError> {
    let mut bytes = Vec::new();
    match codec {
        CaptureCodec::Jpeg { quality } => {
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            for pixel in rgba.chunks_exact(4) {
                rgb.extend_from_slice(&pixel[..3]);
            }
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .map_err(|e| BrandbookError::Capture(format!("jpeg encode: {e}")))?;
        }
        CaptureCodec::Png => {
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
                .map_err(|e| BrandbookError::Capture(format!("png encode: {e}")))?;
        }
    }
    Ok(bytes)
}
