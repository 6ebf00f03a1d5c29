//! Font faces used by the raster layout.
//!
//! `FontdueFace` rasterizes TrueType glyphs with fontdue. `BlockFace` draws every
//! glyph as a solid box with fixed advances and needs no font files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use tracing::{debug, info, warn};

use crate::layout::raster::RasterImage;
use crate::render::tree::{Color, FontKind, Weight};

pub trait FontFace: Send + Sync {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32;

    /// Ascent and descent (both positive) for a line at `size`.
    fn vertical_metrics(&self, size: f32) -> (f32, f32);

    /// Draws `text` with its baseline at `baseline`, starting at `x`.
    fn draw(
        &self,
        canvas: &mut RasterImage,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        weight: Weight,
        color: Color,
    );
}

/// A regular font plus an optional bold one. Without a bold file, bold text is
/// drawn twice one pixel apart.
pub struct FontdueFace {
    regular: Font,
    bold: Option<Font>,
}

impl FontdueFace {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            regular: load_font(path)?,
            bold: None,
        })
    }

    pub fn with_bold(mut self, path: &Path) -> Result<Self> {
        self.bold = Some(load_font(path)?);
        Ok(self)
    }

    fn font_for(&self, weight: Weight) -> (&Font, bool) {
        match (weight, &self.bold) {
            (Weight::Bold, Some(bold)) => (bold, false),
            (Weight::Bold, None) => (&self.regular, true),
            _ => (&self.regular, false),
        }
    }
}

fn load_font(path: &Path) -> Result<Font> {
    let font_data = fs::read(path)
        .with_context(|| format!("Failed to read font file: {}", path.display()))?;
    Font::from_bytes(font_data, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))
}

impl FontFace for FontdueFace {
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32 {
        let (font, faux_bold) = self.font_for(weight);
        let width: f32 = text
            .chars()
            .map(|ch| font.metrics(ch, size).advance_width)
            .sum();
        if faux_bold && !text.is_empty() {
            width + 1.0
        } else {
            width
        }
    }

    fn vertical_metrics(&self, size: f32) -> (f32, f32) {
        match self.regular.horizontal_line_metrics(size) {
            Some(m) => (m.ascent, -m.descent),
            None => (size * 0.8, size * 0.2),
        }
    }

    fn draw(
        &self,
        canvas: &mut RasterImage,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        weight: Weight,
        color: Color,
    ) {
        let (font, faux_bold) = self.font_for(weight);
        let passes: &[i32] = if faux_bold { &[0, 1] } else { &[0] };
        let baseline = baseline.round() as i32;
        let mut pen = x;

        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, size);
            let left = pen.round() as i32 + metrics.xmin;
            // Glyph top relative to the baseline
            let top = baseline - (metrics.height as i32 + metrics.ymin);

            for dx in passes {
                for gy in 0..metrics.height {
                    for gx in 0..metrics.width {
                        let coverage = bitmap[gy * metrics.width + gx] as f32 / 255.0;
                        if coverage > 0.0 {
                            canvas.blend(left + gx as i32 + dx, top + gy as i32, color, coverage);
                        }
                    }
                }
            }
            pen += metrics.advance_width;
        }
    }
}

/// Fixed-advance face that paints each visible character as a filled box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl BlockFace {
    const ADVANCE: f32 = 0.5;
    const ASCENT: f32 = 0.8;
    const DESCENT: f32 = 0.2;
}

impl FontFace for BlockFace {
    fn measure(&self, text: &str, size: f32, _weight: Weight) -> f32 {
        text.chars().count() as f32 * size * Self::ADVANCE
    }

    fn vertical_metrics(&self, size: f32) -> (f32, f32) {
        (size * Self::ASCENT, size * Self::DESCENT)
    }

    fn draw(
        &self,
        canvas: &mut RasterImage,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        _weight: Weight,
        color: Color,
    ) {
        let advance = size * Self::ADVANCE;
        let glyph_h = size * (Self::ASCENT - 0.1);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + i as f32 * advance;
            canvas.fill_rect(gx + 1.0, baseline - glyph_h, advance - 2.0, glyph_h, color);
        }
    }
}

/// One face per font family used by the templates.
#[derive(Clone)]
pub struct FontSet {
    serif: Arc<dyn FontFace>,
    sans: Arc<dyn FontFace>,
    mono: Arc<dyn FontFace>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet").finish_non_exhaustive()
    }
}

const SERIF_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSerif.ttf",
        "/usr/share/fonts/TTF/DejaVuSerif-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    ),
    (
        "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSerif-Bold.ttf",
    ),
    (
        "/Library/Fonts/Times New Roman.ttf",
        "/Library/Fonts/Times New Roman Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\times.ttf", "C:\\Windows\\Fonts\\timesbd.ttf"),
];

const SANS_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    ),
    ("/Library/Fonts/Arial.ttf", "/Library/Fonts/Arial Bold.ttf"),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

const MONO_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf",
    ),
    (
        "/usr/share/fonts/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationMono-Bold.ttf",
    ),
    ("/Library/Fonts/Courier New.ttf", "/Library/Fonts/Courier New Bold.ttf"),
    ("C:\\Windows\\Fonts\\cour.ttf", "C:\\Windows\\Fonts\\courbd.ttf"),
];

fn first_available(candidates: &[(&str, &str)]) -> Option<Arc<dyn FontFace>> {
    for (regular, bold) in candidates {
        let Ok(face) = FontdueFace::from_path(Path::new(regular)) else {
            continue;
        };
        let face = match face.with_bold(Path::new(bold)) {
            Ok(face) => face,
            Err(e) => {
                debug!(path = %bold, error = %e, "Bold variant unavailable, using faux bold");
                FontdueFace::from_path(Path::new(regular)).ok()?
            }
        };
        info!(path = %regular, "Loaded font");
        return Some(Arc::new(face));
    }
    None
}

impl FontSet {
    /// Uses the same face for every family.
    pub fn uniform(face: Arc<dyn FontFace>) -> Self {
        Self {
            serif: face.clone(),
            sans: face.clone(),
            mono: face,
        }
    }

    /// Box glyphs for every family.
    pub fn blocks() -> Self {
        Self::uniform(Arc::new(BlockFace))
    }

    /// Loads `override_path` for every family when given, otherwise searches
    /// well-known system locations per family. A family with no match borrows
    /// whichever family was found.
    pub fn system(override_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = override_path {
            let face = FontdueFace::from_path(path)?;
            info!(path = %path.display(), "Loaded configured font");
            return Ok(Self::uniform(Arc::new(face)));
        }

        let serif = first_available(SERIF_CANDIDATES);
        let sans = first_available(SANS_CANDIDATES);
        let mono = first_available(MONO_CANDIDATES);

        let fallback = sans
            .clone()
            .or_else(|| serif.clone())
            .or_else(|| mono.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Could not find any system fonts. Set RESUME_FONT_PATH to a TrueType file"
                )
            })?;

        for (kind, face) in [("serif", &serif), ("sans", &sans), ("mono", &mono)] {
            if face.is_none() {
                warn!(family = kind, "No system font found for family, substituting");
            }
        }

        Ok(Self {
            serif: serif.unwrap_or_else(|| fallback.clone()),
            sans: sans.unwrap_or_else(|| fallback.clone()),
            mono: mono.unwrap_or(fallback),
        })
    }

    pub fn face(&self, kind: FontKind) -> &dyn FontFace {
        match kind {
            FontKind::Serif => self.serif.as_ref(),
            FontKind::Sans => self.sans.as_ref(),
            FontKind::Mono => self.mono.as_ref(),
        }
    }
}
