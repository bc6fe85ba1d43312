use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ab_glyph::{Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont, point};
use bw_utils::EngravingSpec;
use image::Rgba;
use tracing::{debug, info, warn};

use crate::{Canvas, SynthesisError};

/// Font selection for one text engraving.
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    /// CSS-style comma separated family list.
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontRequest {
    pub fn from_spec(spec: &EngravingSpec) -> Self {
        Self {
            family: spec.font_family().to_string(),
            size: spec.font_size(),
            bold: spec.bold,
            italic: spec.italic,
        }
    }

    fn key(&self) -> FontKey {
        FontKey {
            family: self.family.clone(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Measured extent of one line. `ascent`/`descent` are the ink extents above
/// and below the baseline, `None` when the line has no ink to measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMeasure {
    pub width: f32,
    pub ascent: Option<f32>,
    pub descent: Option<f32>,
}

/// Text measurement and glyph drawing, in logical units.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, line: &str, font: &FontRequest) -> Result<LineMeasure, SynthesisError>;

    /// Draws `line` with its left edge at `x` and baseline at `baseline`.
    fn draw_line(
        &self,
        line: &str,
        font: &FontRequest,
        x: f32,
        baseline: f32,
        color: Rgba<u8>,
        canvas: &mut Canvas,
    ) -> Result<(), SynthesisError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FamilyName {
    Named(String),
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
}

impl FamilyName {
    fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if name.is_empty() {
            return None;
        }
        Some(match name.to_ascii_lowercase().as_str() {
            "serif" => Self::Serif,
            "sans-serif" | "system-ui" | "-apple-system" | "blinkmacsystemfont" => Self::SansSerif,
            "monospace" => Self::Monospace,
            "cursive" => Self::Cursive,
            "fantasy" => Self::Fantasy,
            _ => Self::Named(name.to_string()),
        })
    }

    fn as_family(&self) -> fontdb::Family<'_> {
        match self {
            Self::Named(name) => fontdb::Family::Name(name),
            Self::Serif => fontdb::Family::Serif,
            Self::SansSerif => fontdb::Family::SansSerif,
            Self::Monospace => fontdb::Family::Monospace,
            Self::Cursive => fontdb::Family::Cursive,
            Self::Fantasy => fontdb::Family::Fantasy,
        }
    }
}

fn parse_family_list(list: &str) -> Vec<FamilyName> {
    let mut names: Vec<FamilyName> = list.split(',').filter_map(FamilyName::parse).collect();
    names.dedup();
    names
}

/// Fonts installed on the system plus an optional bundled directory.
pub struct SystemFonts {
    db: fontdb::Database,
    loaded: Mutex<HashMap<FontKey, Arc<FontVec>>>,
}

impl SystemFonts {
    pub fn new(extra_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir
            && dir.is_dir()
        {
            db.load_fonts_dir(dir);
        }
        info!(faces = db.len(), "font database ready");
        Self {
            db,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    fn font(&self, request: &FontRequest) -> Result<Arc<FontVec>, SynthesisError> {
        let key = request.key();
        if let Ok(cache) = self.loaded.lock()
            && let Some(font) = cache.get(&key)
        {
            return Ok(font.clone());
        }

        let font = Arc::new(self.load(request)?);
        if let Ok(mut cache) = self.loaded.lock() {
            cache.insert(key, font.clone());
        }
        Ok(font)
    }

    fn load(&self, request: &FontRequest) -> Result<FontVec, SynthesisError> {
        let unavailable = || SynthesisError::FontUnavailable {
            family: request.family.clone(),
        };
        let names = parse_family_list(&request.family);
        let families: Vec<fontdb::Family<'_>> = names.iter().map(FamilyName::as_family).collect();
        let weight = if request.bold {
            fontdb::Weight::BOLD
        } else {
            fontdb::Weight::NORMAL
        };
        let style = if request.italic {
            fontdb::Style::Italic
        } else {
            fontdb::Style::Normal
        };

        let query = |families: &[fontdb::Family<'_>]| {
            self.db.query(&fontdb::Query {
                families,
                weight,
                stretch: fontdb::Stretch::Normal,
                style,
            })
        };

        let id = query(&families)
            .or_else(|| query(&[fontdb::Family::SansSerif]))
            .or_else(|| {
                debug!(family = %request.family, "no family match, using first installed face");
                self.db.faces().next().map(|face| face.id)
            })
            .ok_or_else(unavailable)?;

        self.db
            .with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
            })
            .and_then(|parsed| {
                parsed
                    .map_err(|err| warn!(family = %request.family, "unreadable font face: {err}"))
                    .ok()
            })
            .ok_or_else(unavailable)
    }
}

/// Pixel scale whose em square is `px_per_em` pixels, the way CSS sizes fonts.
fn em_scale(font: &FontVec, px_per_em: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(px_per_em * font.height_unscaled() / units_per_em)
}

/// Positions glyphs along a baseline at y = 0 and returns them with the
/// total advance.
fn shape_line(font: &FontVec, line: &str, px_per_em: f32) -> (Vec<Glyph>, f32) {
    let scaled = font.as_scaled(em_scale(font, px_per_em));
    let mut glyphs = Vec::with_capacity(line.len());
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    for ch in line.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let mut glyph = scaled.scaled_glyph(ch);
        glyph.position = point(caret, 0.0);
        caret += scaled.h_advance(id);
        previous = Some(id);
        glyphs.push(glyph);
    }
    (glyphs, caret)
}

impl TextMeasurer for SystemFonts {
    fn measure(&self, line: &str, font: &FontRequest) -> Result<LineMeasure, SynthesisError> {
        let face = self.font(font)?;
        let (glyphs, width) = shape_line(&face, line, font.size);
        let mut ink: Option<(f32, f32)> = None;
        for glyph in glyphs {
            if let Some(outlined) = face.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (ascent, descent) = ink.unwrap_or((f32::MIN, f32::MIN));
                ink = Some((ascent.max(-bounds.min.y), descent.max(bounds.max.y)));
            }
        }
        Ok(LineMeasure {
            width,
            ascent: ink.map(|(a, _)| a),
            descent: ink.map(|(_, d)| d),
        })
    }

    fn draw_line(
        &self,
        line: &str,
        font: &FontRequest,
        x: f32,
        baseline: f32,
        color: Rgba<u8>,
        canvas: &mut Canvas,
    ) -> Result<(), SynthesisError> {
        let face = self.font(font)?;
        let scale = canvas.scale();
        let (glyphs, _) = shape_line(&face, line, font.size * scale);
        let origin_x = x * scale;
        let origin_y = baseline * scale;
        for mut glyph in glyphs {
            glyph.position = point(glyph.position.x + origin_x, origin_y);
            let Some(outlined) = face.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let left = bounds.min.x as i64;
            let top = bounds.min.y as i64;
            outlined.draw(|gx, gy, coverage| {
                canvas.blend(left + gx as i64, top + gy as i64, coverage, color);
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_lists_parse_like_css() {
        let names = parse_family_list(r#""Times New Roman", Times, Georgia, serif"#);
        assert_eq!(
            names,
            vec![
                FamilyName::Named("Times New Roman".into()),
                FamilyName::Named("Times".into()),
                FamilyName::Named("Georgia".into()),
                FamilyName::Serif,
            ]
        );
    }

    #[test]
    fn system_aliases_map_to_sans_serif() {
        let names = parse_family_list(r#"-apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif"#);
        assert_eq!(names[0], FamilyName::SansSerif);
        assert_eq!(names[2], FamilyName::Named("Segoe UI".into()));
        // consecutive duplicates collapse
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn blank_entries_are_skipped() {
        assert!(parse_family_list(" , '' ,").is_empty());
        assert_eq!(parse_family_list("monospace,"), vec![FamilyName::Monospace]);
    }

    #[test]
    fn request_uses_sanitised_spec_values() {
        let mut spec = EngravingSpec::text("x");
        spec.size = 0.0;
        spec.bold = true;
        let request = FontRequest::from_spec(&spec);
        assert_eq!(request.family, "Arial, sans-serif");
        assert_eq!(request.size, 70.0);
        assert!(request.bold && !request.italic);
    }
}
