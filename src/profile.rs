use crate::error::BrandbookError;
use crate::types::Rgb;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One named brand color, stored as a `#`-prefixed 6-digit hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColor {
    pub hex: String,
    pub name: String,
}

impl BrandColor {
    pub fn new(hex: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            name: name.into(),
        }
    }

    pub fn rgb(&self) -> Option<Rgb> {
        Rgb::from_hex(&self.hex)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: BrandColor,
    pub secondary: BrandColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<BrandColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontChoice {
    pub family: String,
    pub usage: String,
}

impl FontChoice {
    pub fn new(family: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            usage: usage.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typography {
    pub primary: FontChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<FontChoice>,
}

/// Brand logo slots. At most one representation is set at a time; setting
/// one clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    png: Option<String>,
}

/// Borrowed view of the active logo representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoData<'a> {
    /// Raw SVG markup.
    Svg(&'a str),
    /// A `data:image/png;base64,...` URL.
    PngDataUrl(&'a str),
}

impl Logo {
    pub fn none() -> Self {
        Self::default()
    }

    /// Stores SVG markup and clears the raster slot.
    pub fn set_svg(&mut self, svg_xml: impl Into<String>) {
        self.svg = Some(svg_xml.into());
        self.png = None;
    }

    /// Stores a PNG data URL and clears the vector slot.
    pub fn set_png_data_url(&mut self, data_url: impl Into<String>) {
        self.png = Some(data_url.into());
        self.svg = None;
    }

    pub fn clear(&mut self) {
        self.svg = None;
        self.png = None;
    }

    pub fn is_set(&self) -> bool {
        self.svg.is_some() || self.png.is_some()
    }

    /// Active representation, preferring vector over raster.
    pub fn data(&self) -> Option<LogoData<'_>> {
        if let Some(svg) = &self.svg {
            return Some(LogoData::Svg(svg));
        }
        self.png.as_deref().map(LogoData::PngDataUrl)
    }
}

/// The full brand definition consumed by the generation pipeline. The
/// pipeline reads it as an immutable snapshot; it never writes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    pub colors: BrandColors,
    pub typography: Typography,
    #[serde(default)]
    pub logo: Logo,
}

impl BrandProfile {
    pub fn validate(&self) -> Result<(), BrandbookError> {
        if self.name.trim().is_empty() {
            return Err(BrandbookError::EmptyBrandName);
        }
        let mut check = |label: &str, color: &BrandColor| -> Result<(), BrandbookError> {
            if color.rgb().is_none() {
                return Err(BrandbookError::InvalidProfile(format!(
                    "{} color has malformed hex value {:?}",
                    label, color.hex
                )));
            }
            Ok(())
        };
        check("primary", &self.colors.primary)?;
        check("secondary", &self.colors.secondary)?;
        if let Some(accent) = &self.colors.accent {
            check("accent", accent)?;
        }
        Ok(())
    }

    /// Filename-safe slug of the brand name: lowercased ASCII alphanumerics
    /// with runs of anything else collapsed to single dashes.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        let mut pending_dash = false;
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            slug.push_str("brand");
        }
        slug
    }

    pub fn output_file_name(&self) -> String {
        format!("{}-brandbook.pdf", self.slug())
    }

    pub fn to_json(&self) -> Result<String, BrandbookError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BrandbookError::Asset(format!("profile serialization failed: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self, BrandbookError> {
        serde_json::from_str(json)
            .map_err(|e| BrandbookError::InvalidProfile(format!("profile parse failed: {e}")))
    }

    /// The shareable subset: colors and typography only. The logo payload
    /// is deliberately excluded to keep share URLs short.
    pub fn share_payload(&self) -> SharePayload {
        SharePayload {
            name: self.name.clone(),
            colors: self.colors.clone(),
            typography: self.typography.clone(),
        }
    }

    /// `<base>?b=<base64url(json)>` carrying the share payload.
    pub fn share_url(&self, base: &str) -> String {
        let json = serde_json::to_string(&self.share_payload()).unwrap_or_default();
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes());
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}b={encoded}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub name: String,
    pub colors: BrandColors,
    pub typography: Typography,
}

impl SharePayload {
    pub fn decode(encoded: &str) -> Result<Self, BrandbookError> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| BrandbookError::InvalidProfile(format!("share payload base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BrandbookError::InvalidProfile(format!("share payload json: {e}")))
    }
}

/// Splits a `data:` URL into mime type and decoded bytes.
pub(crate) fn parse_data_url(uri: &str) -> Option<(String, Vec<u8>)> {
    if !uri.starts_with("data:") {
        return None;
    }
    let (header, data_part) = uri.split_once(',')?;
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = if header.contains("base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data_part)
            .ok()?
    } else {
        data_part.as_bytes().to_vec()
    };
    Some((mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BrandProfile {
        BrandProfile {
            name: "Acme".to_string(),
            colors: BrandColors {
                primary: BrandColor::new("#FF5733", "Sunset Orange"),
                secondary: BrandColor::new("#2C3E50", "Midnight Blue"),
                accent: None,
            },
            typography: Typography {
                primary: FontChoice::new("Montserrat", "Headings"),
                secondary: None,
            },
            logo: Logo::none(),
        }
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut p = profile();
        p.name = "  ".to_string();
        assert!(matches!(
            p.validate(),
            Err(BrandbookError::EmptyBrandName)
        ));
    }

    #[test]
    fn validate_rejects_bad_hex() {
        let mut p = profile();
        p.colors.secondary.hex = "2C3E50".to_string();
        assert!(matches!(
            p.validate(),
            Err(BrandbookError::InvalidProfile(_))
        ));
    }

    #[test]
    fn logo_slots_are_mutually_exclusive() {
        let mut logo = Logo::none();
        logo.set_png_data_url("data:image/png;base64,AAAA");
        assert!(matches!(logo.data(), Some(LogoData::PngDataUrl(_))));

        logo.set_svg("<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        assert!(matches!(logo.data(), Some(LogoData::Svg(_))));
        // Raster slot must have been cleared by the vector upload.
        logo.clear();
        assert!(logo.data().is_none());
    }

    #[test]
    fn vector_logo_wins_accessor() {
        let mut p = profile();
        p.logo.set_svg("<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        match p.logo.data() {
            Some(LogoData::Svg(xml)) => assert!(xml.starts_with("<svg")),
            other => panic!("expected svg, got {other:?}"),
        }
    }

    #[test]
    fn slug_collapses_punctuation() {
        let mut p = profile();
        p.name = "Acme & Sons, Ltd.".to_string();
        assert_eq!(p.slug(), "acme-sons-ltd");
        assert_eq!(p.output_file_name(), "acme-sons-ltd-brandbook.pdf");
    }

    #[test]
    fn share_payload_excludes_logo() {
        let mut p = profile();
        p.logo.set_png_data_url("data:image/png;base64,AAAA");
        let url = p.share_url("https://brandbook.example");
        let encoded = url.split("?b=").nth(1).expect("payload param");
        let payload = SharePayload::decode(encoded).expect("decodable payload");
        assert_eq!(payload.colors, p.colors);
        assert_eq!(payload.typography, p.typography);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("logo"));
    }

    #[test]
    fn json_round_trip() {
        let p = profile();
        let json = p.to_json().unwrap();
        assert_eq!(BrandProfile::from_json(&json).unwrap(), p);
    }

    #[test]
    fn data_url_parses_base64() {
        let (mime, data) = parse_data_url("data:image/png;base64,AQID").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, vec![1, 2, 3]);
        assert!(parse_data_url("http://not-a-data-url").is_none());
    }
}
