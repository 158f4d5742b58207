use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use ttf_parser::Face;

/// Label measurement contract the geometry computation depends on.
///
/// Widths are reported rounded up to whole units. `max_ascent_descent` is the
/// single per-line vertical unit used to stack labels uniformly.
pub trait TextMetrics {
    fn string_width(&self, bold: bool, text: &str) -> i32;
    fn max_ascent_descent(&self) -> i32;
}

/// Deterministic metrics with one width per character. Used by tests and by
/// callers that want layout results independent of installed fonts.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub char_width: i32,
    pub bold_char_width: i32,
    pub ascent_descent: i32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 7,
            bold_char_width: 8,
            ascent_descent: 14,
        }
    }
}

impl TextMetrics for FixedMetrics {
    fn string_width(&self, bold: bool, text: &str) -> i32 {
        let per_char = if bold {
            self.bold_char_width
        } else {
            self.char_width
        };
        text.chars().filter(|&ch| ch != '\n').count() as i32 * per_char
    }

    fn max_ascent_descent(&self) -> i32 {
        self.ascent_descent
    }
}

static FONT_DB: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    db
});

/// Metrics backed by a system font resolved through fontdb.
///
/// Advance widths for ASCII are read from the face once at construction;
/// other characters fall back to the face's average advance, which keeps
/// measurement allocation-free and lock-free afterwards.
pub struct FontMetrics {
    regular: FaceMetrics,
    bold: FaceMetrics,
    font_size: f32,
}

#[derive(Clone)]
struct FaceMetrics {
    units_per_em: f32,
    ascent_descent_units: f32,
    ascii_advances: [u16; 128],
    fallback_advance: f32,
}

impl FontMetrics {
    /// Resolves `font_family` (a CSS-style comma-separated list) against the
    /// system font database. Returns `None` when no face matches.
    pub fn new(font_family: &str, font_size: f32) -> Option<Self> {
        if font_size <= 0.0 {
            return None;
        }
        let regular = load_face_metrics(font_family, Weight::NORMAL)?;
        let bold =
            load_face_metrics(font_family, Weight::BOLD).unwrap_or_else(|| regular.clone());
        Some(Self {
            regular,
            bold,
            font_size,
        })
    }
}

impl TextMetrics for FontMetrics {
    fn string_width(&self, bold: bool, text: &str) -> i32 {
        let face = if bold { &self.bold } else { &self.regular };
        let scale = self.font_size / face.units_per_em;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                let units = face.ascii_advances[ch as usize];
                if units == 0 {
                    face.fallback_advance
                } else {
                    units as f32
                }
            } else {
                face.fallback_advance
            };
            width += advance * scale;
        }
        width.max(0.0).ceil() as i32
    }

    fn max_ascent_descent(&self) -> i32 {
        let face = &self.regular;
        let units = face.ascent_descent_units.max(1.0);
        (units / face.units_per_em * self.font_size).ceil() as i32
    }
}

fn load_face_metrics(font_family: &str, weight: Weight) -> Option<FaceMetrics> {
    let mut names: Vec<String> = Vec::new();
    let mut generics: Vec<Family<'static>> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        match raw.to_ascii_lowercase().as_str() {
            "serif" => generics.push(Family::Serif),
            "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                generics.push(Family::SansSerif)
            }
            "monospace" | "ui-monospace" => generics.push(Family::Monospace),
            "cursive" => generics.push(Family::Cursive),
            "fantasy" => generics.push(Family::Fantasy),
            _ => names.push(raw.to_string()),
        }
    }
    let mut families: Vec<Family<'_>> = names.iter().map(|n| Family::Name(n.as_str())).collect();
    families.extend(generics);
    if families.is_empty() {
        families.push(Family::SansSerif);
    }

    let query = Query {
        families: &families,
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = FONT_DB.query(&query)?;
    let mut loaded: Option<FaceMetrics> = None;
    FONT_DB.with_face_data(id, |data, index| {
        if let Ok(face) = Face::parse(data, index) {
            let units_per_em = face.units_per_em().max(1) as f32;
            let ascent_descent_units =
                (face.ascender() as i32 - face.descender() as i32).max(1) as f32;
            let mut ascii_advances = [0u16; 128];
            let mut sum = 0u32;
            let mut count = 0u32;
            for byte in 0u8..=127 {
                if let Some(glyph) = face.glyph_index(byte as char)
                    && let Some(advance) = face.glyph_hor_advance(glyph)
                {
                    ascii_advances[byte as usize] = advance;
                    if advance > 0 {
                        sum += advance as u32;
                        count += 1;
                    }
                }
            }
            let fallback_advance = if count > 0 {
                sum as f32 / count as f32
            } else {
                units_per_em * 0.56
            };
            loaded = Some(FaceMetrics {
                units_per_em,
                ascent_descent_units,
                ascii_advances,
                fallback_advance,
            });
        }
    });
    loaded
}
