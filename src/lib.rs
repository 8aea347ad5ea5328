//! Brand identity PDF composer.
//!
//! `brandbook` turns a [`BrandProfile`] (name, colors, typography, optional
//! logo) into a multi-page A4 brand book: a themed cover, palette and
//! typography pages, rasterized stationery mockups and a scannable share
//! page. Mockups are rendered at several times print resolution through
//! tiny-skia, captured as JPEG or PNG, then fitted onto their pages without
//! cropping. Output is deterministic: the same profile and generation date
//! produce byte-identical PDFs.
//!
//! ```no_run
//! use brandbook::{Brandbook, BrandColor, BrandColors, BrandProfile, FontChoice, Logo, Typography};
//!
//! let profile = BrandProfile {
//!     name: "Acme".to_string(),
//!     colors: BrandColors {
//!         primary: BrandColor::new("#FF5733", "Sunset Orange"),
//!         secondary: BrandColor::new("#2C3E50", "Midnight Blue"),
//!         accent: None,
//!     },
//!     typography: Typography {
//!         primary: FontChoice::new("Montserrat", "Headings"),
//!         secondary: None,
//!     },
//!     logo: Logo::none(),
//! };
//! let pdf = Brandbook::new().generate_pdf(&profile)?;
//! # Ok::<(), brandbook::BrandbookError>(())
//! ```

mod canvas;
mod capture;
mod draw;
mod error;
mod fit;
mod font;
mod images;
mod mockup;
mod pages;
mod pdf;
mod perf;
mod profile;
mod qr;
mod svg;
mod types;

pub use canvas::{Canvas, Command, Document, Page};
pub use capture::{CaptureCodec, CaptureRecord};
pub use error::BrandbookError;
pub use fit::{LayoutDescriptor, fit_within, layout_for};
pub use mockup::MockupKind;
pub use profile::{
    BrandColor, BrandColors, BrandProfile, FontChoice, Logo, LogoData, SharePayload, Typography,
};
pub use types::{Color, Pt, Rgb, Size};

use capture::{CaptureEngine, CaptureJob, CaptureOutcome, LogoAsset};
use chrono::NaiveDate;
use draw::PageFrame;
use font::FontRegistry;
use images::{ImageData, ImageStore, StoredImage};
use pages::{
    PageContext, logo_page, mockup_page, palette_page, share_page, title_page, typography_page,
};
use perf::GenerationTimings;
use profile::parse_data_url;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_SHARE_BASE_URL: &str = "https://brandbook.app/share";

/// Longest edge of a rasterized logo. Large enough to stay crisp inside
/// the biggest mockup stage.
const LOGO_RASTER_MAX_PX: u32 = 1024;

/// Configures a [`Brandbook`] generator. Every setting is optional; the
/// default generator uses JPEG captures, no brand fonts and the hosted
/// share endpoint.
#[derive(Debug, Default)]
pub struct BrandbookBuilder {
    font_dirs: Vec<PathBuf>,
    font_files: Vec<PathBuf>,
    font_blobs: Vec<Vec<u8>>,
    codec: CaptureCodec,
    share_base_url: Option<String>,
    timing_report: bool,
    timing_report_dir: Option<PathBuf>,
    generated_on: Option<NaiveDate>,
}

impl BrandbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every `.ttf`/`.otf` file under `path` for mockup text.
    pub fn font_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(path.into());
        self
    }

    pub fn font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_files.push(path.into());
        self
    }

    /// Registers an in-memory font. Invalid data is skipped with a warning
    /// at build time.
    pub fn font_bytes(mut self, data: Vec<u8>) -> Self {
        self.font_blobs.push(data);
        self
    }

    pub fn capture_codec(mut self, codec: CaptureCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Base URL the share payload is appended to as a `b=` parameter.
    pub fn share_base_url(mut self, url: impl Into<String>) -> Self {
        self.share_base_url = Some(url.into());
        self
    }

    /// Opt-in timing instrumentation. The breakdown is logged after every
    /// generation.
    pub fn timing_report(mut self, enabled: bool) -> Self {
        self.timing_report = enabled;
        self
    }

    /// Also writes each timing report to a timestamped file under `dir`.
    /// Implies [`timing_report`](Self::timing_report).
    pub fn timing_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.timing_report = true;
        self.timing_report_dir = Some(dir.into());
        self
    }

    /// Pins the date printed on the cover. Defaults to the local date at
    /// generation time; pinning it makes output fully reproducible.
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn build(self) -> Brandbook {
        let mut fonts = FontRegistry::new();
        for dir in &self.font_dirs {
            fonts.register_dir(dir);
        }
        for file in &self.font_files {
            fonts.register_file(file);
        }
        for blob in self.font_blobs {
            if let Err(err) = fonts.register_bytes(blob, None) {
                log::warn!("embedded font rejected: {err}");
            }
        }
        Brandbook {
            fonts: Arc::new(fonts),
            codec: self.codec,
            share_base_url: self
                .share_base_url
                .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string()),
            timing_report: self.timing_report,
            timing_report_dir: self.timing_report_dir,
            generated_on: self.generated_on,
        }
    }
}

/// The brand book generator. Cheap to keep around and reuse; each
/// `generate_*` call works on its own canvas, image table and timing
/// recorder, so a generator is safe to share across threads.
pub struct Brandbook {
    fonts: Arc<FontRegistry>,
    codec: CaptureCodec,
    share_base_url: String,
    timing_report: bool,
    timing_report_dir: Option<PathBuf>,
    generated_on: Option<NaiveDate>,
}

impl Default for Brandbook {
    fn default() -> Self {
        Self::new()
    }
}

struct PagePlan {
    logo_label: Option<String>,
    jobs: Vec<CaptureJob>,
    share_label: String,
}

/// Page labels are assigned up front from the logo decision and never
/// renumbered afterwards; a failed capture leaves a visible gap in the
/// ordinals while the footer count stays contiguous.
fn plan_pages(has_logo: bool) -> PagePlan {
    let mut next = 4u32;
    let logo_label = has_logo.then(|| {
        let label = format!("{next:02}");
        next += 1;
        label
    });
    let jobs = MockupKind::ALL
        .iter()
        .map(|kind| {
            let label = format!("{next:02}");
            next += 1;
            CaptureJob {
                kind: *kind,
                page_label: label,
            }
        })
        .collect();
    PagePlan {
        logo_label,
        jobs,
        share_label: format!("{next:02}"),
    }
}

impl Brandbook {
    pub fn new() -> Self {
        BrandbookBuilder::new().build()
    }

    pub fn builder() -> BrandbookBuilder {
        BrandbookBuilder::new()
    }

    /// Generates the complete brand book and returns the PDF bytes.
    pub fn generate_pdf(&self, profile: &BrandProfile) -> Result<Vec<u8>, BrandbookError> {
        let (document, images, timings) = self.generate_document(profile)?;
        let title = format!("{} Brand Book", profile.name);
        let bytes = timings.time_phase("pdf write", || pdf::write_pdf(&document, &images, &title));
        if let Some(report) = timings.report() {
            log::info!("{report}");
            if let Some(dir) = &self.timing_report_dir {
                match timings.write_report(dir) {
                    Ok(Some(path)) => log::info!("timing report written to {}", path.display()),
                    Ok(None) => {}
                    Err(err) => log::warn!("timing report not written: {err}"),
                }
            }
        }
        Ok(bytes)
    }

    /// Generates the brand book and writes it to
    /// `<dir>/<slug>-brandbook.pdf`, creating `dir` if needed. Returns the
    /// written path.
    pub fn generate_to_dir(
        &self,
        profile: &BrandProfile,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, BrandbookError> {
        let bytes = self.generate_pdf(profile)?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(profile.output_file_name());
        std::fs::write(&path, &bytes)?;
        Ok(path)
    }

    /// Builds the page list without serializing it. Mockup captures run on
    /// a worker thread while the vector-only pages are recorded here, then
    /// the two halves are joined in page order.
    fn generate_document(
        &self,
        profile: &BrandProfile,
    ) -> Result<(Document, ImageStore, GenerationTimings), BrandbookError> {
        profile.validate()?;
        let timings = GenerationTimings::new(self.timing_report);

        let logo = timings.time_phase("logo", || self.load_logo(profile));
        let plan = plan_pages(logo.is_some());
        let engine = CaptureEngine::new(Arc::clone(&self.fonts), self.codec, logo.clone())?;

        let mut canvas = Canvas::new(Size::a4());
        let mut images = ImageStore::new();
        let generated_on = self.generated_on_text();
        let logo_resource = logo
            .as_ref()
            .map(|asset| (images.insert(asset.to_stored()), asset.width, asset.height));

        let outcomes = std::thread::scope(|scope| {
            let worker = scope.spawn(|| engine.capture_all(&plan.jobs, profile, &timings));
            timings.time_phase("static pages", || {
                let ctx = PageContext {
                    profile,
                    frame: PageFrame::new(Size::a4()),
                    generated_on: &generated_on,
                };
                let logo_ref = logo_resource
                    .as_ref()
                    .map(|(id, w, h)| (id.as_str(), *w, *h));
                title_page(&mut canvas, &ctx, logo_ref, 1);
                palette_page(&mut canvas, &ctx, 2);
                typography_page(&mut canvas, &ctx, 3);
                if let (Some(label), Some(logo_ref)) = (&plan.logo_label, logo_ref) {
                    logo_page(&mut canvas, &ctx, logo_ref, label, 4);
                }
            });
            worker.join()
        });
        let outcomes = outcomes.unwrap_or_else(|_| {
            log::error!("capture worker panicked; every mockup page is skipped");
            plan.jobs
                .iter()
                .map(|job| CaptureOutcome::Failed {
                    kind: job.kind,
                    reason: "capture worker panicked".to_string(),
                })
                .collect()
        });

        let footer_start = if plan.logo_label.is_some() { 5 } else { 4 };
        self.assemble(
            profile,
            &generated_on,
            &mut canvas,
            &mut images,
            &outcomes,
            &plan.share_label,
            footer_start,
            &timings,
        );
        Ok((canvas.finish(), images, timings))
    }

    /// Appends the mockup pages for successful captures, in capture order,
    /// then the share page. Failed captures leave no page behind.
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        profile: &BrandProfile,
        generated_on: &str,
        canvas: &mut Canvas,
        images: &mut ImageStore,
        outcomes: &[CaptureOutcome],
        share_label: &str,
        mut footer_index: u32,
        timings: &GenerationTimings,
    ) {
        let ctx = PageContext {
            profile,
            frame: PageFrame::new(Size::a4()),
            generated_on,
        };

        timings.time_phase("mockup pages", || {
            for outcome in outcomes {
                let CaptureOutcome::Captured(record) = outcome else {
                    continue;
                };
                match record.to_stored() {
                    Ok(stored) => {
                        let resource_id = images.insert(stored);
                        mockup_page(canvas, &ctx, record, &resource_id, footer_index);
                        footer_index += 1;
                    }
                    Err(err) => {
                        log::warn!("{} capture dropped: {err}; page skipped", record.kind.id());
                    }
                }
            }
        });

        timings.time_phase("share page", || {
            let url = profile.share_url(&self.share_base_url);
            let qr = qr::qr_raster(&url, 8).map(|(rgb, w, h)| {
                let id = images.insert(StoredImage {
                    width: w,
                    height: h,
                    data: ImageData::Raw { rgb, alpha: None },
                });
                (id, w, h)
            });
            if qr.is_none() {
                log::warn!("share link could not be encoded as a QR code; panel left empty");
            }
            share_page(
                canvas,
                &ctx,
                &url,
                qr.as_ref().map(|(id, w, h)| (id.as_str(), *w, *h)),
                share_label,
                footer_index,
            );
        });
    }

    /// Decodes the profile's logo into a reusable raster. Any failure is
    /// downgraded to the no-logo rendition with a warning.
    fn load_logo(&self, profile: &BrandProfile) -> Option<LogoAsset> {
        let asset = match profile.logo.data()? {
            LogoData::Svg(xml) => {
                let Some((rgba, w, h)) = svg::rasterize_svg(xml, LOGO_RASTER_MAX_PX) else {
                    log::warn!("logo svg could not be rasterized; continuing without a logo");
                    return None;
                };
                LogoAsset::from_rgba(rgba, w, h)
            }
            LogoData::PngDataUrl(url) => {
                let Some((mime, bytes)) = parse_data_url(url) else {
                    log::warn!("logo data url is malformed; continuing without a logo");
                    return None;
                };
                if !mime.eq_ignore_ascii_case("image/png") {
                    log::warn!("logo data url declares {mime}, decoding anyway");
                }
                match image::load_from_memory(&bytes) {
                    Ok(decoded) => {
                        let rgba = decoded.to_rgba8();
                        let (w, h) = rgba.dimensions();
                        LogoAsset::from_rgba(rgba.into_raw(), w, h)
                    }
                    Err(err) => {
                        log::warn!("logo raster rejected: {err}; continuing without a logo");
                        return None;
                    }
                }
            }
        };
        if asset.is_none() {
            log::warn!("logo raster has invalid dimensions; continuing without a logo");
        }
        asset
    }

    fn generated_on_text(&self) -> String {
        match self.generated_on {
            Some(date) => date.format("%-d %B %Y").to_string(),
            None => chrono::Local::now().format("%-d %B %Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn sample_profile() -> BrandProfile {
        BrandProfile {
            name: "Acme".to_string(),
            colors: BrandColors {
                primary: BrandColor::new("#FF5733", "Sunset Orange"),
                secondary: BrandColor::new("#2C3E50", "Midnight Blue"),
                accent: Some(BrandColor::new("#1ABC9C", "Lagoon")),
            },
            typography: Typography {
                primary: FontChoice::new("Montserrat", "Headings"),
                secondary: Some(FontChoice::new("Lora", "Body copy")),
            },
            logo: Logo::none(),
        }
    }

    fn png_logo_data_url() -> String {
        let mut bytes = Vec::new();
        let pixels: Vec<u8> = vec![
            255, 87, 51, 255, 44, 62, 80, 255, 44, 62, 80, 255, 255, 87, 51, 255,
        ];
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(&pixels, 2, 2, image::ExtendedColorType::Rgba8)
            .expect("encodes");
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        )
    }

    fn generator() -> Brandbook {
        Brandbook::builder()
            .generated_on(NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date"))
            .build()
    }

    fn page_contains_text(page: &Page, needle: &str) -> bool {
        page.commands.iter().any(
            |c| matches!(c, Command::DrawString { text, .. } if text.contains(needle)),
        )
    }

    use image::ImageEncoder;

    #[test]
    fn document_without_logo_has_nine_pages() {
        let profile = sample_profile();
        let (document, images, _) = generator()
            .generate_document(&profile)
            .expect("generation succeeds");
        assert_eq!(document.pages.len(), 9);
        // Cover, palette, typography.
        assert!(page_contains_text(&document.pages[0], "Acme"));
        assert!(page_contains_text(
            &document.pages[0],
            "Generated on 12 March 2026"
        ));
        assert!(page_contains_text(&document.pages[1], "Sunset Orange"));
        assert!(page_contains_text(&document.pages[2], "Montserrat"));
        // Mockups start at 04 when no logo page is present.
        assert!(page_contains_text(&document.pages[3], "04"));
        assert!(page_contains_text(&document.pages[3], "Business Card"));
        assert!(page_contains_text(&document.pages[7], "08"));
        assert!(page_contains_text(&document.pages[7], "Presentation Slide"));
        assert!(page_contains_text(&document.pages[8], "09"));
        // Five captures plus one QR symbol.
        assert_eq!(images.len(), 6);
    }

    #[test]
    fn logo_adds_a_page_and_shifts_labels() {
        let mut profile = sample_profile();
        profile.logo.set_png_data_url(png_logo_data_url());
        let (document, _, _) = generator()
            .generate_document(&profile)
            .expect("generation succeeds");
        assert_eq!(document.pages.len(), 10);
        assert!(page_contains_text(&document.pages[3], "Logo"));
        assert!(page_contains_text(&document.pages[3], "04"));
        // First mockup moves from 04 to 05, the share page from 09 to 10.
        assert!(page_contains_text(&document.pages[4], "05"));
        assert!(page_contains_text(&document.pages[4], "Business Card"));
        assert!(page_contains_text(&document.pages[9], "10"));
    }

    #[test]
    fn failed_capture_skips_its_page_but_keeps_labels() {
        let profile = sample_profile();
        let generator = generator();
        let mut canvas = Canvas::new(Size::a4());
        let mut images = ImageStore::new();
        let timings = GenerationTimings::new(false);

        let record = |kind: MockupKind, label: &str| CaptureRecord {
            kind,
            page_label: label.to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            codec: CaptureCodec::default(),
            width: 1050,
            height: 600,
        };
        let outcomes = vec![
            CaptureOutcome::Captured(record(MockupKind::BusinessCard, "04")),
            CaptureOutcome::Failed {
                kind: MockupKind::Letterhead,
                reason: "staged failure".to_string(),
            },
            CaptureOutcome::Captured(record(MockupKind::Envelope, "06")),
        ];
        generator.assemble(
            &profile,
            "12 March 2026",
            &mut canvas,
            &mut images,
            &outcomes,
            "09",
            4,
            &timings,
        );
        let document = canvas.finish();
        // Two mockup pages and the share page; letterhead left a gap.
        assert_eq!(document.pages.len(), 3);
        assert!(page_contains_text(&document.pages[0], "Business Card"));
        assert!(!document
            .pages
            .iter()
            .any(|p| page_contains_text(p, "Letterhead")));
        // The envelope keeps its pre-assigned ordinal but the footer
        // advances by one, not two.
        assert!(page_contains_text(&document.pages[1], "06"));
        assert!(page_contains_text(&document.pages[1], "05"));
        assert!(page_contains_text(&document.pages[2], "09"));
        assert!(page_contains_text(&document.pages[2], "06"));
    }

    #[test]
    fn generation_is_deterministic() {
        let profile = sample_profile();
        let generator = generator();
        let a = generator.generate_pdf(&profile).expect("first run");
        let b = generator.generate_pdf(&profile).expect("second run");
        assert_eq!(a, b);
        assert!(a.starts_with(b"%PDF-1.7"));
        assert!(a.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn pdf_title_comes_from_the_profile() {
        let profile = sample_profile();
        let bytes = generator().generate_pdf(&profile).expect("generates");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Acme Brand Book)"));
    }

    #[test]
    fn generate_to_dir_uses_the_slug_filename() {
        let profile = sample_profile();
        let dir = std::env::temp_dir().join(format!("brandbook-out-{}", std::process::id()));
        let path = generator()
            .generate_to_dir(&profile, &dir)
            .expect("writes the file");
        assert!(path.ends_with("acme-brandbook.pdf"));
        let written = std::fs::read(&path).expect("file exists");
        assert!(written.starts_with(b"%PDF-1.7"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_name_is_rejected_before_any_capture() {
        let mut profile = sample_profile();
        profile.name = "   ".to_string();
        let err = generator().generate_pdf(&profile).expect_err("must fail");
        assert!(matches!(err, BrandbookError::EmptyBrandName));
    }

    #[test]
    fn malformed_logo_degrades_to_the_no_logo_book() {
        let mut profile = sample_profile();
        profile
            .logo
            .set_png_data_url("data:image/png;base64,bm90LWEtcG5n");
        let (document, _, _) = generator()
            .generate_document(&profile)
            .expect("generation succeeds");
        // No logo page; mockups start at 04 again.
        assert_eq!(document.pages.len(), 9);
        assert!(page_contains_text(&document.pages[3], "Business Card"));
    }

    #[test]
    fn timing_report_covers_every_phase() {
        let profile = sample_profile();
        let generator = Brandbook::builder()
            .generated_on(NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date"))
            .timing_report(true)
            .build();
        let (_, _, timings) = generator
            .generate_document(&profile)
            .expect("generation succeeds");
        let report = timings.report().expect("instrumentation on");
        for phase in ["logo", "captures", "static pages", "mockup pages", "share page", "total"] {
            assert!(report.contains(phase), "missing phase {phase}");
        }
        for kind in MockupKind::ALL {
            assert!(report.contains(kind.id()), "missing bucket {}", kind.id());
        }
    }

    #[test]
    fn share_url_respects_the_configured_base() {
        let profile = sample_profile();
        let generator = Brandbook::builder()
            .share_base_url("https://example.org/b?src=pdf")
            .generated_on(NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date"))
            .build();
        let (document, _, _) = generator
            .generate_document(&profile)
            .expect("generation succeeds");
        let share = document.pages.last().expect("share page");
        assert!(page_contains_text(share, "https://example.org/b?src=pdf&b="));
    }
}
