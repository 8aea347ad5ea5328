use crate::error::BrandbookError;
use crate::types::Pt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Brand font registry. Families registered here render inside mockup
/// captures; anything unresolved falls back to whatever substitute is
/// available (or to skipping glyph paint entirely).
#[derive(Debug, Default)]
pub(crate) struct FontRegistry {
    fonts: Vec<RegisteredFont>,
    lookup: HashMap<String, usize>,
}

#[derive(Debug)]
pub(crate) struct RegisteredFont {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Ok(entries) = fs::read_dir(path) else {
            log::warn!("font directory {} is not readable; skipping", path.display());
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                self.register_file(path);
            }
        }
    }

    /// Registers one `.ttf`/`.otf` file. Unreadable or unparsable files
    /// are skipped with a warning, never a hard failure.
    pub fn register_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(ext) = path.extension().and_then(|v| v.to_str()) else {
            return;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" {
            return;
        }
        let Ok(data) = fs::read(path) else {
            log::warn!("font file {} is not readable; skipping", path.display());
            return;
        };
        if let Err(err) = self.register_bytes(data, path.to_str()) {
            log::warn!("font file {} rejected: {err}", path.display());
        }
    }

    pub fn register_bytes(
        &mut self,
        data: Vec<u8>,
        source_name: Option<&str>,
    ) -> Result<String, BrandbookError> {
        let source = source_name.unwrap_or("embedded font");
        let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
            return Err(BrandbookError::Asset(format!(
                "invalid font data for {source}"
            )));
        };

        let name = family_name(&face)
            .or_else(|| {
                Path::new(source)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("font-{}", self.fonts.len()));

        let index = self.fonts.len();
        self.fonts.push(RegisteredFont {
            name: name.clone(),
            data,
        });
        let key = normalize_name(&name);
        if !key.is_empty() {
            self.lookup.entry(key).or_insert(index);
        }
        Ok(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&RegisteredFont> {
        let key = normalize_name(name);
        self.lookup
            .get(&key)
            .and_then(|index| self.fonts.get(*index))
    }

    /// First registered font, used as the generic substitute when a brand
    /// family cannot be resolved.
    pub fn fallback(&self) -> Option<&RegisteredFont> {
        self.fonts.first()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Width estimate for base-14 page text: 0.6 em per glyph, floored at a
/// point so short strings still occupy space.
pub(crate) fn approx_text_width(font_size: Pt, text: &str) -> Pt {
    let char_width = (font_size * 0.6).max(Pt::from_f32(1.0));
    char_width * (text.chars().count() as i32)
}

fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let mut full_name = None;
    for name in face.names() {
        if !name.is_unicode() {
            continue;
        }
        match name.name_id {
            ttf_parser::name_id::FAMILY => {
                if let Some(value) = name.to_string() {
                    return Some(value);
                }
            }
            ttf_parser::name_id::FULL_NAME => {
                if full_name.is_none() {
                    full_name = name.to_string();
                }
            }
            _ => {}
        }
    }
    full_name
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_width_scales_with_glyph_count() {
        let width = approx_text_width(Pt::from_f32(10.0), "abcd");
        assert_eq!(width.to_milli_i64(), Pt::from_f32(24.0).to_milli_i64());
    }

    #[test]
    fn bogus_font_bytes_are_rejected() {
        let mut registry = FontRegistry::new();
        let err = registry.register_bytes(vec![0, 1, 2, 3], Some("junk.ttf"));
        assert!(err.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn normalization_ignores_case_and_spacing() {
        assert_eq!(normalize_name("Open Sans"), normalize_name("open-sans"));
    }
}
