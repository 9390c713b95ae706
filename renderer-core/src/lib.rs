mod canvas;
mod error;
mod graph;
mod markup;
mod parser;
mod projection;
mod renderer;
mod style;
mod types;

use std::{io::BufRead, path::Path};

use tracing::{Level, event, span};

pub use canvas::{Canvas, DEFAULT_LABEL_FONT_SIZE, RasterCanvas};
pub use error::{Error, Result};
pub use graph::MapGraph;
pub use markup::{Attributes, MarkupHandler, drive as drive_markup};
pub use parser::{parse, parse_file, parse_into};
pub use projection::Projector;
pub use renderer::{DEFAULT_CANVAS_WIDTH, RasterRenderer, RenderConfig};
pub use style::{HighwayStyle, RoadClass, StyleResolver};
pub use types::{BoundingBox, Node, NodeId, PixelPoint, Rgb, Tags, Way, WayId};

/// Parses an OSM XML extract from `source` and renders it.
pub fn render_map<R: BufRead>(source: R, config: &RenderConfig) -> Result<RasterCanvas> {
    let span = span!(Level::DEBUG, "render_map");
    let _guard = span.enter();

    let graph = parse(source)?;
    graph.finalize()?;

    RasterRenderer::new(&graph, config)?.render()
}

/// Renders the extract at `input` into a PNG at `output`.
///
/// The output file is only created once the whole image has been drawn and encoded.
pub fn render_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<()> {
    let span = span!(Level::DEBUG, "render_file");
    let _guard = span.enter();

    let graph = parse_file(input)?;
    graph.finalize()?;

    let canvas = RasterRenderer::new(&graph, config)?.render()?;

    let output = output.as_ref();
    event!(Level::INFO, "Saving map as PNG to: {}", output.display());
    canvas.save_png(output)
}
