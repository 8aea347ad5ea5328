use crate::canvas::{Command, Document};
use crate::images::{ImageData, ImageStore};
use crate::types::{Color, Pt};
use std::collections::{BTreeMap, BTreeSet};

/// Serializes a recorded document into PDF 1.7 bytes.
///
/// Every collection walked here is ordered, object numbers are assigned by
/// a fixed scheme and no timestamps are embedded, so identical input
/// produces identical bytes. Text uses the standard Helvetica family with
/// WinAnsi encoding; images ride as hex-encoded XObjects.
pub(crate) fn write_pdf(doc: &Document, images: &ImageStore, title: &str) -> Vec<u8> {
    let fonts = collect_fonts(doc);

    // Object layout: 1 catalog, 2 page tree, then page/content pairs,
    // fonts, image streams (soft mask directly before its image), info.
    let page_count = doc.pages.len();
    let mut next_id = 3 + 2 * page_count as u32;

    let mut font_ids: BTreeMap<&str, (String, u32)> = BTreeMap::new();
    for (index, name) in fonts.iter().enumerate() {
        font_ids.insert(name, (format!("F{}", index + 1), next_id));
        next_id += 1;
    }

    let mut image_ids: BTreeMap<&str, (u32, Option<u32>)> = BTreeMap::new();
    for (id, image) in images.iter() {
        let smask = match &image.data {
            ImageData::Raw {
                alpha: Some(_), ..
            } => {
                let sid = next_id;
                next_id += 1;
                Some(sid)
            }
            _ => None,
        };
        image_ids.insert(id, (next_id, smask));
        next_id += 1;
    }

    let info_id = next_id;
    let object_count = info_id as usize + 1;

    let mut out = PdfOutput::new(object_count);
    out.buf.extend_from_slice(b"%PDF-1.7\n%");
    out.buf.extend_from_slice(&[0xE2, 0xE3, 0xCF, 0xD3]);
    out.buf.push(b'\n');

    out.begin_obj(1);
    out.push_str("<< /Type /Catalog /Pages 2 0 R >>\n");
    out.end_obj();

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();
    out.begin_obj(2);
    out.push_str(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {} {}] >>\n",
        kids.join(" "),
        page_count,
        fmt_pt(doc.page_size.width),
        fmt_pt(doc.page_size.height),
    ));
    out.end_obj();

    let resources = resources_dict(&font_ids, &image_ids);
    for (index, page) in doc.pages.iter().enumerate() {
        let page_id = 3 + 2 * index as u32;
        let content_id = page_id + 1;

        out.begin_obj(page_id);
        out.push_str(&format!(
            "<< /Type /Page /Parent 2 0 R /Resources {resources} /Contents {content_id} 0 R >>\n"
        ));
        out.end_obj();

        let stream = content_stream(&page.commands, &font_ids);
        out.begin_obj(content_id);
        out.push_str(&format!("<< /Length {} >>\nstream\n", stream.len()));
        out.push_str(&stream);
        out.push_str("endstream\n");
        out.end_obj();
    }

    for (name, (_, id)) in &font_ids {
        out.begin_obj(*id);
        out.push_str(&format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{name} /Encoding /WinAnsiEncoding >>\n"
        ));
        out.end_obj();
    }

    for (id, image) in images.iter() {
        let (object_id, smask_id) = image_ids[id.as_str()];
        match &image.data {
            ImageData::Jpeg(bytes) => {
                let hex = hex_stream(bytes);
                out.begin_obj(object_id);
                out.push_str(&format!(
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
/ColorSpace /DeviceRGB /BitsPerComponent 8 \
/Filter [/ASCIIHexDecode /DCTDecode] /Length {} >>\nstream\n",
                    image.width,
                    image.height,
                    hex.len()
                ));
                out.push_str(&hex);
                out.push_str("endstream\n");
                out.end_obj();
            }
            ImageData::Raw { rgb, alpha } => {
                if let (Some(alpha), Some(smask_id)) = (alpha, smask_id) {
                    let hex = hex_stream(alpha);
                    out.begin_obj(smask_id);
                    out.push_str(&format!(
                        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
/ColorSpace /DeviceGray /BitsPerComponent 8 \
/Filter /ASCIIHexDecode /Length {} >>\nstream\n",
                        image.width,
                        image.height,
                        hex.len()
                    ));
                    out.push_str(&hex);
                    out.push_str("endstream\n");
                    out.end_obj();
                }
                let hex = hex_stream(rgb);
                let smask_entry = smask_id
                    .map(|sid| format!("/SMask {sid} 0 R "))
                    .unwrap_or_default();
                out.begin_obj(object_id);
                out.push_str(&format!(
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
/ColorSpace /DeviceRGB /BitsPerComponent 8 {}\
/Filter /ASCIIHexDecode /Length {} >>\nstream\n",
                    image.width,
                    image.height,
                    smask_entry,
                    hex.len()
                ));
                out.push_str(&hex);
                out.push_str("endstream\n");
                out.end_obj();
            }
        }
    }

    out.begin_obj(info_id);
    out.push_str(&format!(
        "<< /Title ({}) /Producer (brandbook) >>\n",
        escape_text(title)
    ));
    out.end_obj();

    let xref_offset = out.buf.len();
    out.push_str(&format!("xref\n0 {object_count}\n"));
    out.push_str("0000000000 65535 f \n");
    for id in 1..object_count {
        out.push_str(&format!("{:010} 00000 n \n", out.offsets[id]));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {object_count} /Root 1 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
    ));
    out.buf
}

struct PdfOutput {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfOutput {
    fn new(object_count: usize) -> Self {
        Self {
            buf: Vec::new(),
            offsets: vec![0; object_count],
        }
    }

    fn begin_obj(&mut self, id: u32) {
        self.offsets[id as usize] = self.buf.len();
        self.push_str(&format!("{id} 0 obj\n"));
    }

    fn end_obj(&mut self) {
        self.push_str("endobj\n");
    }

    fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }
}

/// Every font name the document can select, including the default active
/// before the first setter.
fn collect_fonts(doc: &Document) -> BTreeSet<String> {
    let mut fonts = BTreeSet::new();
    fonts.insert("Helvetica".to_string());
    for page in &doc.pages {
        for command in &page.commands {
            if let Command::SetFontName(name) = command {
                fonts.insert(name.clone());
            }
        }
    }
    fonts
}

fn resources_dict(
    font_ids: &BTreeMap<&str, (String, u32)>,
    image_ids: &BTreeMap<&str, (u32, Option<u32>)>,
) -> String {
    let mut dict = String::from("<< /Font << ");
    for (tag, id) in font_ids.values() {
        dict.push_str(&format!("/{tag} {id} 0 R "));
    }
    dict.push_str(">> ");
    if !image_ids.is_empty() {
        dict.push_str("/XObject << ");
        for (name, (id, _)) in image_ids {
            dict.push_str(&format!("/{name} {id} 0 R "));
        }
        dict.push_str(">> ");
    }
    dict.push_str(">>");
    dict
}

fn content_stream(commands: &[Command], font_ids: &BTreeMap<&str, (String, u32)>) -> String {
    let mut out = String::new();
    let mut font_name = "Helvetica".to_string();
    let mut font_size = Pt::from_f32(12.0);
    for command in commands {
        match command {
            Command::SetFillColor(color) => {
                out.push_str(&format!("{} rg\n", fmt_color(*color)));
            }
            Command::SetStrokeColor(color) => {
                out.push_str(&format!("{} RG\n", fmt_color(*color)));
            }
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFontName(name) => font_name = name.clone(),
            Command::SetFontSize(size) => font_size = *size,
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} {} {} c\n",
                    fmt_pt(*x1),
                    fmt_pt(*y1),
                    fmt_pt(*x2),
                    fmt_pt(*y2),
                    fmt_pt(*x),
                    fmt_pt(*y),
                ));
            }
            Command::ClosePath => out.push_str("h\n"),
            Command::Fill => out.push_str("f\n"),
            Command::Stroke => out.push_str("S\n"),
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\n",
                    fmt_pt(*x),
                    fmt_pt(*y),
                    fmt_pt(*width),
                    fmt_pt(*height),
                ));
            }
            Command::DrawString { x, y, text } => {
                let tag = font_ids
                    .get(font_name.as_str())
                    .map(|(tag, _)| tag.as_str())
                    .unwrap_or("F1");
                out.push_str(&format!(
                    "BT /{} {} Tf {} {} Td ({}) Tj ET\n",
                    tag,
                    fmt_pt(font_size),
                    fmt_pt(*x),
                    fmt_pt(*y),
                    escape_text(text),
                ));
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                out.push_str(&format!(
                    "q {} 0 0 {} {} {} cm /{} Do Q\n",
                    fmt_pt(*width),
                    fmt_pt(*height),
                    fmt_pt(*x),
                    fmt_pt(*y),
                    resource_id,
                ));
            }
        }
    }
    out
}

/// Millipoint-exact decimal rendering, trailing zeros trimmed.
fn fmt_pt(value: Pt) -> String {
    let milli = value.to_milli_i64();
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.unsigned_abs();
    let int = abs / 1000;
    let frac = abs % 1000;
    if frac == 0 {
        format!("{sign}{int}")
    } else {
        let mut frac = format!("{frac:03}");
        while frac.ends_with('0') {
            frac.pop();
        }
        format!("{sign}{int}.{frac}")
    }
}

fn fmt_color(color: Color) -> String {
    format!(
        "{} {} {}",
        fmt_component(color.r),
        fmt_component(color.g),
        fmt_component(color.b),
    )
}

fn fmt_component(value: f32) -> String {
    let milli = (value.clamp(0.0, 1.0) * 1000.0).round() as i64;
    fmt_pt(Pt::from_milli_i64(milli))
}

/// Escapes a string for a PDF literal. Characters outside Latin-1 are
/// replaced; bytes above ASCII are written as octal escapes.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 32 => out.push_str(&format!("\\{:03o}", c as u32)),
            c if (c as u32) < 127 => out.push(c),
            c if (c as u32) <= 255 => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// ASCII-hex stream body with the EOD marker, wrapped at 64 columns.
fn hex_stream(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / 32 + 2);
    for (index, byte) in bytes.iter().enumerate() {
        out.push_str(&format!("{byte:02X}"));
        if index % 32 == 31 {
            out.push('\n');
        }
    }
    out.push_str(">\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::images::StoredImage;
    use crate::types::Size;

    fn count_token(bytes: &[u8], token: &[u8]) -> usize {
        bytes
            .windows(token.len())
            .filter(|window| *window == token)
            .count()
    }

    fn sample_doc() -> Document {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::rgb(1.0, 0.341, 0.2));
        canvas.draw_rect(
            Pt::from_f32(10.0),
            Pt::from_f32(10.0),
            Pt::from_f32(100.0),
            Pt::from_f32(50.0),
        );
        canvas.fill();
        canvas.set_font_name("Helvetica-Bold");
        canvas.set_font_size(Pt::from_f32(24.0));
        canvas.draw_string(Pt::from_f32(72.0), Pt::from_f32(700.0), "Acme (Ltd)");
        canvas.show_page();
        canvas.draw_image(
            Pt::from_f32(100.0),
            Pt::from_f32(100.0),
            Pt::from_f32(200.0),
            Pt::from_f32(120.0),
            "img1",
        );
        canvas.finish()
    }

    #[test]
    fn structure_has_header_xref_and_trailer() {
        let doc = sample_doc();
        let bytes = write_pdf(&doc, &ImageStore::new(), "Acme Brand Book");
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count_token(&bytes, b"xref"), count_token(&bytes, b"startxref") + 1);
        assert_eq!(count_token(&bytes, b"/Type /Page "), 2);
        assert_eq!(count_token(&bytes, b"/Count 2"), 1);
        assert!(count_token(&bytes, b"/Title (Acme Brand Book)") == 1);
    }

    #[test]
    fn image_placement_restores_state_inline() {
        let doc = sample_doc();
        let bytes = write_pdf(&doc, &ImageStore::new(), "Acme");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("q 200 0 0 120 100 100 cm /img1 Do Q"));
        assert_eq!(count_token(&bytes, b"q "), count_token(&bytes, b" Q\n"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let doc = sample_doc();
        let bytes = write_pdf(&doc, &ImageStore::new(), "Acme");
        let text = String::from_utf8_lossy(&bytes);
        let xref_at = text.rfind("xref\n").expect("xref table");
        let mut lines = text[xref_at..].lines().skip(2);
        let free = lines.next().expect("free entry");
        assert!(free.starts_with("0000000000 65535 f"));
        for (index, line) in lines.enumerate() {
            if !line.ends_with(" n ") {
                break;
            }
            let offset: usize = line[..10].parse().expect("decimal offset");
            let expected = format!("{} 0 obj", index + 1);
            assert!(
                text[offset..].starts_with(&expected),
                "object {} not at {offset}",
                index + 1
            );
        }
    }

    #[test]
    fn text_runs_select_registered_fonts_and_escape() {
        let doc = sample_doc();
        let bytes = write_pdf(&doc, &ImageStore::new(), "Acme");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Acme \\(Ltd\\)) Tj"));
        assert!(text.contains("24 Tf"));
        // Both base-14 variants are declared once each.
        assert_eq!(count_token(&bytes, b"/BaseFont /Helvetica-Bold"), 1);
        assert_eq!(count_token(&bytes, b"/BaseFont /Helvetica "), 1);
        assert_eq!(count_token(&bytes, b"/Encoding /WinAnsiEncoding"), 2);
    }

    #[test]
    fn jpeg_images_pass_through_dctdecode() {
        let mut images = ImageStore::new();
        let id = images.insert(StoredImage {
            width: 8,
            height: 4,
            data: ImageData::Jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]),
        });
        let doc = sample_doc();
        let bytes = write_pdf(&doc, &images, "Acme");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter [/ASCIIHexDecode /DCTDecode]"));
        assert!(text.contains("FFD8FFD9"));
        assert!(text.contains(&format!("/XObject << /{id} ")));
    }

    #[test]
    fn alpha_images_carry_a_soft_mask() {
        let mut images = ImageStore::new();
        images.insert(StoredImage {
            width: 1,
            height: 2,
            data: ImageData::Raw {
                rgb: vec![255, 0, 0, 0, 255, 0],
                alpha: Some(vec![255, 128]),
            },
        });
        let bytes = write_pdf(&sample_doc(), &images, "Acme");
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(count_token(&bytes, b"/SMask"), 1);
        assert!(text.contains("/ColorSpace /DeviceGray"));
        // Mask bytes 255, 128 hex-encoded.
        assert!(text.contains("FF80>"));
    }

    #[test]
    fn identical_input_produces_identical_bytes() {
        let mut images_a = ImageStore::new();
        images_a.insert(StoredImage {
            width: 2,
            height: 2,
            data: ImageData::Raw {
                rgb: vec![9; 12],
                alpha: None,
            },
        });
        let mut images_b = ImageStore::new();
        images_b.insert(StoredImage {
            width: 2,
            height: 2,
            data: ImageData::Raw {
                rgb: vec![9; 12],
                alpha: None,
            },
        });
        let a = write_pdf(&sample_doc(), &images_a, "Acme");
        let b = write_pdf(&sample_doc(), &images_b, "Acme");
        assert_eq!(a, b);
    }

    #[test]
    fn fmt_pt_trims_trailing_zeros() {
        assert_eq!(fmt_pt(Pt::from_f32(12.0)), "12");
        assert_eq!(fmt_pt(Pt::from_f32(12.5)), "12.5");
        assert_eq!(fmt_pt(Pt::from_f32(-0.25)), "-0.25");
        assert_eq!(fmt_pt(Pt::from_milli_i64(226772)), "226.772");
    }
}
