use crate::canvas::Canvas;
use crate::capture::CaptureRecord;
use crate::draw::PageFrame;
use crate::fit::{fit_within, layout_for};
use crate::profile::{BrandColor, BrandProfile};
use crate::types::{Color, Pt, Rgb};

pub(crate) const PAGE_MARGIN_MM: f32 = 20.0;
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM;

/// Steps in the title ribbon. Discrete blocks, not a shading dictionary,
/// so the output stays byte-identical across viewers.
const GRADIENT_STEPS: usize = 24;

const INK: Color = Color {
    r: 0.13,
    g: 0.145,
    b: 0.16,
};
const MUTED: Color = Color {
    r: 0.42,
    g: 0.46,
    b: 0.49,
};
const PAPER: Color = Color {
    r: 0.965,
    g: 0.968,
    b: 0.976,
};

const HEADING_FONT: &str = "Helvetica-Bold";
const BODY_FONT: &str = "Helvetica";
const LABEL_FONT: &str = "Helvetica-Oblique";

/// Shared inputs for every page builder in one generation run.
pub(crate) struct PageContext<'a> {
    pub profile: &'a BrandProfile,
    pub frame: PageFrame,
    /// Pre-formatted generation date, e.g. "12 March 2026".
    pub generated_on: &'a str,
}

impl PageContext<'_> {
    fn primary(&self) -> Rgb {
        self.profile.colors.primary.rgb().unwrap_or(Rgb {
            r: 0,
            g: 0,
            b: 0,
        })
    }

    fn secondary(&self) -> Rgb {
        self.profile.colors.secondary.rgb().unwrap_or(Rgb {
            r: 64,
            g: 64,
            b: 64,
        })
    }

    fn accent(&self) -> Rgb {
        self.profile
            .colors
            .accent
            .as_ref()
            .and_then(BrandColor::rgb)
            .unwrap_or_else(|| self.primary())
    }
}

/// Brand name bottom-left, zero-padded page index bottom-right. The index
/// stays contiguous even when capture failures skip pages.
fn footer(canvas: &mut Canvas, ctx: &PageContext<'_>, index: u32) {
    let frame = ctx.frame;
    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        PAGE_HEIGHT_MM - 12.0,
        LABEL_FONT,
        Pt::from_f32(8.0),
        MUTED,
        &ctx.profile.name,
    );
    frame.text_right(
        canvas,
        PAGE_WIDTH_MM - PAGE_MARGIN_MM,
        PAGE_HEIGHT_MM - 12.0,
        BODY_FONT,
        Pt::from_f32(8.0),
        MUTED,
        &format!("{index:02}"),
    );
}

/// Section chrome for the interior pages: oversized label, title, accent
/// tick and a hairline rule.
fn section_header(canvas: &mut Canvas, ctx: &PageContext<'_>, label: &str, title: &str) {
    let frame = ctx.frame;
    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        38.0,
        HEADING_FONT,
        Pt::from_f32(30.0),
        ctx.accent().to_color(),
        label,
    );
    frame.text(
        canvas,
        PAGE_MARGIN_MM + 24.0,
        38.0,
        HEADING_FONT,
        Pt::from_f32(20.0),
        INK,
        title,
    );
    canvas.set_fill_color(ctx.accent().to_color());
    frame.fill_rect(canvas, PAGE_MARGIN_MM, 43.0, 12.0, 1.2);
    frame.stroke_line(
        canvas,
        PAGE_MARGIN_MM + 14.0,
        43.6,
        PAGE_WIDTH_MM - PAGE_MARGIN_MM,
        43.6,
        Pt::from_f32(0.4),
        PAPER,
    );
}

/// Cover: gradient ribbon, centred logo, brand name and the swatch row.
pub(crate) fn title_page(
    canvas: &mut Canvas,
    ctx: &PageContext<'_>,
    logo: Option<(&str, u32, u32)>,
    footer_index: u32,
) {
    let frame = ctx.frame;
    let ramp = Rgb::gradient_steps(ctx.primary(), ctx.secondary(), GRADIENT_STEPS);
    let step_w = PAGE_WIDTH_MM / ramp.len().max(1) as f32;
    for (i, rgb) in ramp.iter().enumerate() {
        canvas.set_fill_color(rgb.to_color());
        // Slight overlap hides hairline seams between the blocks.
        let w = if i + 1 == ramp.len() {
            step_w
        } else {
            step_w + 0.2
        };
        frame.fill_rect(canvas, i as f32 * step_w, 0.0, w, 9.0);
    }

    if let Some((resource_id, px_w, px_h)) = logo {
        if let Some((w, h)) = fit_within(px_w as f32, px_h as f32, 70.0, 45.0) {
            frame.image(
                canvas,
                (PAGE_WIDTH_MM - w) / 2.0,
                70.0 + (45.0 - h) / 2.0,
                w,
                h,
                resource_id,
            );
        }
    }

    frame.text_centered(
        canvas,
        PAGE_WIDTH_MM / 2.0,
        138.0,
        HEADING_FONT,
        Pt::from_f32(32.0),
        INK,
        &ctx.profile.name,
    );
    frame.text_centered(
        canvas,
        PAGE_WIDTH_MM / 2.0,
        150.0,
        LABEL_FONT,
        Pt::from_f32(13.0),
        MUTED,
        "Brand Identity Guidelines",
    );
    canvas.set_fill_color(ctx.accent().to_color());
    frame.fill_rect(canvas, (PAGE_WIDTH_MM - 40.0) / 2.0, 158.0, 40.0, 1.0);

    let mut swatches: Vec<&BrandColor> =
        vec![&ctx.profile.colors.primary, &ctx.profile.colors.secondary];
    if let Some(accent) = &ctx.profile.colors.accent {
        swatches.push(accent);
    }
    let spacing = 34.0;
    let start = PAGE_WIDTH_MM / 2.0 - spacing * (swatches.len() as f32 - 1.0) / 2.0;
    for (i, color) in swatches.iter().enumerate() {
        let cx = start + i as f32 * spacing;
        if let Some(rgb) = color.rgb() {
            canvas.set_fill_color(rgb.to_color());
            frame.fill_circle(canvas, cx, 185.0, 6.5);
        }
        frame.text_centered(
            canvas,
            cx,
            198.0,
            BODY_FONT,
            Pt::from_f32(8.0),
            MUTED,
            &color.hex.to_uppercase(),
        );
    }

    frame.text_centered(
        canvas,
        PAGE_WIDTH_MM / 2.0,
        268.0,
        BODY_FONT,
        Pt::from_f32(9.0),
        MUTED,
        &format!("Generated on {}", ctx.generated_on),
    );
    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

fn color_usage(role: &str) -> &'static str {
    match role {
        "Primary" => "Lead surfaces, hero sections and calls to action.",
        "Secondary" => "Supporting panels, headings and footers.",
        _ => "Highlights, links and small interface accents.",
    }
}

/// Palette: one card per brand color with hex, RGB triple and usage note.
pub(crate) fn palette_page(canvas: &mut Canvas, ctx: &PageContext<'_>, footer_index: u32) {
    let frame = ctx.frame;
    section_header(canvas, ctx, "02", "Color Palette");

    let mut entries: Vec<(&str, &BrandColor)> = vec![
        ("Primary", &ctx.profile.colors.primary),
        ("Secondary", &ctx.profile.colors.secondary),
    ];
    if let Some(accent) = &ctx.profile.colors.accent {
        entries.push(("Accent", accent));
    }

    let card_h = 62.0;
    let mut top = 58.0;
    for (role, color) in entries {
        canvas.set_fill_color(PAPER);
        frame.fill_rounded_rect(canvas, PAGE_MARGIN_MM, top, CONTENT_WIDTH_MM, card_h, 3.0);
        if let Some(rgb) = color.rgb() {
            canvas.set_fill_color(rgb.to_color());
            frame.fill_rounded_rect(canvas, PAGE_MARGIN_MM + 8.0, top + 8.0, 46.0, card_h - 16.0, 2.0);
            frame.text(
                canvas,
                PAGE_MARGIN_MM + 62.0,
                top + 30.0,
                BODY_FONT,
                Pt::from_f32(10.0),
                MUTED,
                &format!(
                    "{}   rgb({}, {}, {})",
                    color.hex.to_uppercase(),
                    rgb.r,
                    rgb.g,
                    rgb.b
                ),
            );
        }
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 62.0,
            top + 20.0,
            HEADING_FONT,
            Pt::from_f32(14.0),
            INK,
            &format!("{} · {}", role, color.name),
        );
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 62.0,
            top + 42.0,
            BODY_FONT,
            Pt::from_f32(9.0),
            MUTED,
            color_usage(role),
        );
        top += card_h + 10.0;
    }

    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

const SPECIMEN_LINES: [(&str, f32); 3] = [
    ("Aa Bb Cc Dd Ee Ff Gg Hh Ii Jj", 16.0),
    ("0 1 2 3 4 5 6 7 8 9", 13.0),
    ("The quick brown fox jumps over the lazy dog", 10.0),
];

/// Typography: a specimen card per declared font choice.
pub(crate) fn typography_page(canvas: &mut Canvas, ctx: &PageContext<'_>, footer_index: u32) {
    let frame = ctx.frame;
    section_header(canvas, ctx, "03", "Typography");

    let mut choices = vec![("Primary", &ctx.profile.typography.primary)];
    if let Some(secondary) = &ctx.profile.typography.secondary {
        choices.push(("Secondary", secondary));
    }

    let card_h = 78.0;
    let mut top = 58.0;
    for (role, font) in choices {
        canvas.set_fill_color(PAPER);
        frame.fill_rounded_rect(canvas, PAGE_MARGIN_MM, top, CONTENT_WIDTH_MM, card_h, 3.0);
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 10.0,
            top + 16.0,
            HEADING_FONT,
            Pt::from_f32(18.0),
            INK,
            &font.family,
        );
        frame.text_right(
            canvas,
            PAGE_WIDTH_MM - PAGE_MARGIN_MM - 10.0,
            top + 16.0,
            LABEL_FONT,
            Pt::from_f32(9.0),
            ctx.accent().to_color(),
            &format!("{} · {}", role, font.usage),
        );
        let mut line_y = top + 34.0;
        for (sample, size) in SPECIMEN_LINES {
            frame.text(
                canvas,
                PAGE_MARGIN_MM + 10.0,
                line_y,
                BODY_FONT,
                Pt::from_f32(size),
                INK,
                sample,
            );
            line_y += size * 0.55 + 8.0;
        }
        top += card_h + 12.0;
    }

    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

const BACKGROUND_TILE_LABELS: [&str; 4] = ["Primary", "Secondary", "White", "Black"];

/// Logo usage: large presentation panel plus background contrast tiles.
/// Built only when the profile carries a logo.
pub(crate) fn logo_page(
    canvas: &mut Canvas,
    ctx: &PageContext<'_>,
    logo: (&str, u32, u32),
    page_label: &str,
    footer_index: u32,
) {
    let frame = ctx.frame;
    let (resource_id, px_w, px_h) = logo;
    section_header(canvas, ctx, page_label, "Logo");

    canvas.set_fill_color(PAPER);
    frame.fill_rounded_rect(canvas, PAGE_MARGIN_MM, 58.0, CONTENT_WIDTH_MM, 85.0, 3.0);
    if let Some((w, h)) = fit_within(px_w as f32, px_h as f32, 120.0, 65.0) {
        frame.image(
            canvas,
            (PAGE_WIDTH_MM - w) / 2.0,
            58.0 + (85.0 - h) / 2.0,
            w,
            h,
            resource_id,
        );
    }

    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        162.0,
        HEADING_FONT,
        Pt::from_f32(12.0),
        INK,
        "Backgrounds",
    );
    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        170.0,
        BODY_FONT,
        Pt::from_f32(9.0),
        MUTED,
        "Keep clear space of at least half the mark's height on every side.",
    );

    let tile = 38.0;
    let gap = (CONTENT_WIDTH_MM - 4.0 * tile) / 3.0;
    let fills = [
        ctx.primary().to_color(),
        ctx.secondary().to_color(),
        Color::WHITE,
        Color::BLACK,
    ];
    for (i, fill) in fills.iter().enumerate() {
        let x = PAGE_MARGIN_MM + i as f32 * (tile + gap);
        canvas.set_fill_color(PAPER);
        frame.fill_rounded_rect(canvas, x - 1.0, 179.0, tile + 2.0, tile + 2.0, 2.5);
        canvas.set_fill_color(*fill);
        frame.fill_rounded_rect(canvas, x, 180.0, tile, tile, 2.0);
        if let Some((w, h)) = fit_within(px_w as f32, px_h as f32, tile - 10.0, tile - 14.0) {
            frame.image(
                canvas,
                x + (tile - w) / 2.0,
                180.0 + (tile - h) / 2.0,
                w,
                h,
                resource_id,
            );
        }
        frame.text_centered(
            canvas,
            x + tile / 2.0,
            225.0,
            BODY_FONT,
            Pt::from_f32(8.0),
            MUTED,
            BACKGROUND_TILE_LABELS[i],
        );
    }

    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

/// One mockup page: dark header band with the pre-assigned ordinal label,
/// then the capture fitted under its layout descriptor.
pub(crate) fn mockup_page(
    canvas: &mut Canvas,
    ctx: &PageContext<'_>,
    record: &CaptureRecord,
    resource_id: &str,
    footer_index: u32,
) {
    let frame = ctx.frame;
    canvas.set_fill_color(ctx.secondary().to_color());
    frame.fill_rect(canvas, 0.0, 0.0, PAGE_WIDTH_MM, 30.0);
    canvas.set_fill_color(ctx.accent().to_color());
    frame.fill_rect(canvas, 0.0, 30.0, PAGE_WIDTH_MM, 1.5);

    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        22.0,
        HEADING_FONT,
        Pt::from_f32(28.0),
        ctx.accent().to_color(),
        &record.page_label,
    );
    frame.text(
        canvas,
        PAGE_MARGIN_MM + 26.0,
        22.0,
        HEADING_FONT,
        Pt::from_f32(17.0),
        Color::WHITE,
        record.kind.title(),
    );

    let layout = layout_for(record.kind);
    if let Some((w, h)) = fit_within(
        record.width as f32,
        record.height as f32,
        layout.max_width_mm,
        layout.max_height_mm,
    ) {
        canvas.set_fill_color(PAPER);
        frame.fill_rounded_rect(
            canvas,
            (PAGE_WIDTH_MM - w) / 2.0 - 3.0,
            layout.vertical_offset_mm - 3.0,
            w + 6.0,
            h + 6.0,
            2.0,
        );
        frame.image(
            canvas,
            (PAGE_WIDTH_MM - w) / 2.0,
            layout.vertical_offset_mm,
            w,
            h,
            resource_id,
        );
    }

    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

const SHARE_STEPS: [&str; 3] = [
    "Scan the code or open the link on any device.",
    "The link carries the palette and typography, never the logo file.",
    "Import the payload to start a new draft of this identity.",
];

/// Share page: QR panel, the wrapped share link, instructions and a short
/// palette recap.
pub(crate) fn share_page(
    canvas: &mut Canvas,
    ctx: &PageContext<'_>,
    share_url: &str,
    qr: Option<(&str, u32, u32)>,
    page_label: &str,
    footer_index: u32,
) {
    let frame = ctx.frame;
    section_header(canvas, ctx, page_label, "Share This Identity");

    canvas.set_fill_color(PAPER);
    frame.fill_rounded_rect(canvas, (PAGE_WIDTH_MM - 64.0) / 2.0, 56.0, 64.0, 64.0, 3.0);
    if let Some((resource_id, px_w, px_h)) = qr {
        if let Some((w, h)) = fit_within(px_w as f32, px_h as f32, 54.0, 54.0) {
            frame.image(
                canvas,
                (PAGE_WIDTH_MM - w) / 2.0,
                56.0 + (64.0 - h) / 2.0,
                w,
                h,
                resource_id,
            );
        }
    }

    let mut url_y = 130.0;
    for line in wrap_chars(share_url, 76) {
        frame.text_centered(
            canvas,
            PAGE_WIDTH_MM / 2.0,
            url_y,
            BODY_FONT,
            Pt::from_f32(7.5),
            MUTED,
            &line,
        );
        url_y += 4.5;
    }

    let mut step_y = url_y + 14.0;
    for step in SHARE_STEPS {
        canvas.set_fill_color(ctx.accent().to_color());
        frame.fill_circle(canvas, PAGE_MARGIN_MM + 3.0, step_y - 1.2, 1.4);
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 9.0,
            step_y,
            BODY_FONT,
            Pt::from_f32(10.0),
            INK,
            step,
        );
        step_y += 9.0;
    }

    let recap_top = step_y + 12.0;
    frame.text(
        canvas,
        PAGE_MARGIN_MM,
        recap_top,
        HEADING_FONT,
        Pt::from_f32(11.0),
        INK,
        "In the payload",
    );
    let mut recap_y = recap_top + 9.0;
    let mut colors: Vec<&BrandColor> =
        vec![&ctx.profile.colors.primary, &ctx.profile.colors.secondary];
    if let Some(accent) = &ctx.profile.colors.accent {
        colors.push(accent);
    }
    for color in colors {
        if let Some(rgb) = color.rgb() {
            canvas.set_fill_color(rgb.to_color());
            frame.fill_circle(canvas, PAGE_MARGIN_MM + 3.0, recap_y - 1.2, 2.0);
        }
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 9.0,
            recap_y,
            BODY_FONT,
            Pt::from_f32(9.0),
            MUTED,
            &format!("{}  {}", color.name, color.hex.to_uppercase()),
        );
        recap_y += 7.0;
    }
    frame.text(
        canvas,
        PAGE_MARGIN_MM + 9.0,
        recap_y,
        BODY_FONT,
        Pt::from_f32(9.0),
        MUTED,
        &ctx.profile.typography.primary.family,
    );
    if let Some(secondary) = &ctx.profile.typography.secondary {
        recap_y += 7.0;
        frame.text(
            canvas,
            PAGE_MARGIN_MM + 9.0,
            recap_y,
            BODY_FONT,
            Pt::from_f32(9.0),
            MUTED,
            &secondary.family,
        );
    }

    footer(canvas, ctx, footer_index);
    canvas.show_page();
}

/// Hard character wrap for unbroken strings like share links.
fn wrap_chars(text: &str, per_line: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(per_line.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
