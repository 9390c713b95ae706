use crate::{
    error::{Error, Result},
    types::{PixelPoint, Rgb},
};

use std::{
    cell::OnceCell,
    path::Path,
    sync::{Arc, OnceLock},
};

use svg::{Document, node::element::Text};
use tiny_skia::{ColorU8, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::event;
use usvg::fontdb::{Database, Family, Query};

/// A drawing surface the renderer paints on.
pub trait Canvas {
    fn size(&self) -> (u32, u32);

    /// Strokes a straight segment `width` pixels wide.
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, width: u32, color: Rgb);

    /// Overwrites a single pixel. Points outside the canvas are ignored.
    fn set_pixel(&mut self, at: PixelPoint, color: Rgb);

    /// Draws `text` horizontally centered on `at.x`, hanging below `at.y`.
    fn draw_text_centered(&mut self, at: PixelPoint, text: &str, color: Rgb) -> Result<()>;
}

pub const DEFAULT_LABEL_FONT_SIZE: f32 = 14.0;

/// Largest raster, in pixels, the renderer will allocate (1 GiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 256 * 1024 * 1024;

// Tried in order when the font database has no face for the generic `sans-serif` family.
const FALLBACK_SANS_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "FreeSans",
];

/// An RGB raster backed by a tiny-skia pixmap.
pub struct RasterCanvas {
    pixmap: Pixmap,
    label_font_size: f32,
    fonts: Option<Arc<Database>>,
    label_options: OnceCell<usvg::Options<'static>>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self> {
        if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
            return Err(Error::InvalidCanvasSize { width, height });
        }

        let mut pixmap =
            Pixmap::new(width, height).ok_or(Error::InvalidCanvasSize { width, height })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            0xff,
        ));

        Ok(RasterCanvas {
            pixmap,
            label_font_size: DEFAULT_LABEL_FONT_SIZE,
            fonts: None,
            label_options: OnceCell::new(),
        })
    }

    /// Draws labels with the faces in `database` instead of the system fonts.
    pub fn with_fonts(mut self, mut database: Database) -> Self {
        resolve_sans_serif(&mut database);
        self.fonts = Some(Arc::new(database));
        self.label_options = OnceCell::new();
        self
    }

    pub fn with_label_font_size(mut self, size: f32) -> Self {
        self.label_font_size = size;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The color at `(x, y)`. The canvas is always opaque, so no alpha is reported.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.pixmap.pixel(x, y).map(|pixel| {
            let color = pixel.demultiply();
            Rgb::new(color.red(), color.green(), color.blue())
        })
    }

    /// Raw premultiplied RGBA bytes, row by row.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|err| Error::Encode(err.to_string()))
    }

    /// Encodes the whole image before touching `path`, so a failed encode leaves no file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn label_options(&self) -> &usvg::Options<'static> {
        self.label_options.get_or_init(|| {
            let mut options = usvg::Options::default();
            options.fontdb = self.fonts.clone().unwrap_or_else(system_fonts);
            options
        })
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, width: u32, color: Rgb) {
        let path = {
            let mut builder = PathBuilder::new();
            builder.move_to(from.x as f32, from.y as f32);
            builder.line_to(to.x as f32, to.y as f32);
            builder.finish()
        };

        let Some(path) = path else {
            event!(
                tracing::Level::TRACE,
                "Skipping segment {} -> {} with no drawable extent",
                from,
                to
            );
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 0xff);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn set_pixel(&mut self, at: PixelPoint, color: Rgb) {
        let (width, height) = self.size();
        if at.x < 0 || at.y < 0 || at.x as u32 >= width || at.y as u32 >= height {
            return;
        }

        let idx = at.y as usize * width as usize + at.x as usize;
        self.pixmap.pixels_mut()[idx] =
            ColorU8::from_rgba(color.r, color.g, color.b, 0xff).premultiply();
    }

    fn draw_text_centered(&mut self, at: PixelPoint, text: &str, color: Rgb) -> Result<()> {
        let (width, height) = self.size();

        let label = Text::new(text)
            .set("x", at.x)
            .set("y", at.y)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "hanging")
            .set("font-family", "sans-serif")
            .set("font-size", self.label_font_size)
            .set("fill", color.to_hex());

        let document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0_u32, 0_u32, width, height))
            .add(label);

        let tree = usvg::Tree::from_str(&document.to_string(), self.label_options()).map_err(
            |err| Error::Label {
                label: text.to_owned(),
                reason: err.to_string(),
            },
        )?;

        if !tree.root().has_children() {
            event!(
                tracing::Level::WARN,
                "Label {:?} was not drawn, no font face could render it",
                text
            );
            return Ok(());
        }

        resvg::render(&tree, Transform::identity(), &mut self.pixmap.as_mut());

        Ok(())
    }
}

// Loading the system fonts is slow, so every canvas in the process shares one database.
fn system_fonts() -> Arc<Database> {
    static FONTS: OnceLock<Arc<Database>> = OnceLock::new();

    FONTS
        .get_or_init(|| {
            let mut database = Database::new();
            database.load_system_fonts();
            resolve_sans_serif(&mut database);
            event!(
                tracing::Level::DEBUG,
                "Loaded {} system font faces for labels",
                database.len()
            );
            Arc::new(database)
        })
        .clone()
}

// fontdb maps `sans-serif` to Arial, which most Linux hosts lack. Point it at a face that exists.
fn resolve_sans_serif(database: &mut Database) {
    fn has_face(database: &Database, family: Family<'_>) -> bool {
        let families = [family];
        let query = Query {
            families: &families,
            ..Query::default()
        };
        database.query(&query).is_some()
    }

    if has_face(database, Family::SansSerif) {
        return;
    }

    let fallback = FALLBACK_SANS_FAMILIES
        .iter()
        .find(|&&family| has_face(database, Family::Name(family)))
        .map(|family| family.to_string())
        .or_else(|| {
            database
                .faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        });

    match fallback {
        Some(family) => {
            event!(
                tracing::Level::DEBUG,
                "Using {} for sans-serif labels",
                family
            );
            database.set_sans_serif_family(family);
        }
        None => event!(
            tracing::Level::WARN,
            "No font faces are available, labels will not be drawn"
        ),
    }
}
