use crate::{
    canvas::{Canvas, DEFAULT_LABEL_FONT_SIZE, RasterCanvas},
    error::{Error, Result},
    graph::MapGraph,
    projection::Projector,
    style::{HighwayStyle, StyleResolver},
    types::{PixelPoint, Rgb},
};

use tracing::event;

pub const DEFAULT_CANVAS_WIDTH: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    // Canvas width in pixels. The height follows from the map's aspect ratio.
    pub width: u32,
    pub background: Rgb,
    pub marker_color: Rgb,
    pub label_color: Rgb,
    pub label_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: DEFAULT_CANVAS_WIDTH,
            background: Rgb::WHITE,
            marker_color: Rgb::RED,
            label_color: Rgb::BLACK,
            label_font_size: DEFAULT_LABEL_FONT_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn with_width(width: u32) -> Self {
        RenderConfig {
            width,
            ..Self::default()
        }
    }
}

/// Paints a [`MapGraph`] in three passes: ways, then node markers, then way names.
///
/// Every pass paints over the previous ones. Before a way is drawn all of its node
/// references are resolved, so a dangling reference fails the render without leaving a
/// partially drawn way behind.
pub struct RasterRenderer<'m, S = HighwayStyle> {
    graph: &'m MapGraph,
    projector: Projector,
    style: S,
    config: RenderConfig,
}

impl<'m> RasterRenderer<'m> {
    pub fn new(graph: &'m MapGraph, config: &RenderConfig) -> Result<Self> {
        let bounds = graph.bounds()?;
        let projector = Projector::new(bounds, config.width)?;

        event!(
            tracing::Level::DEBUG,
            "Canvas is {}x{} for bounds {}",
            projector.width(),
            projector.height(),
            bounds
        );

        Ok(RasterRenderer {
            graph,
            projector,
            style: HighwayStyle::default(),
            config: *config,
        })
    }
}

impl<'m, S: StyleResolver> RasterRenderer<'m, S> {
    pub fn with_style<T: StyleResolver>(self, style: T) -> RasterRenderer<'m, T> {
        RasterRenderer {
            graph: self.graph,
            projector: self.projector,
            style,
            config: self.config,
        }
    }

    /// Renders onto a fresh raster sized by the projector, and hands it over once complete.
    pub fn render(&self) -> Result<RasterCanvas> {
        let mut canvas = RasterCanvas::new(
            self.projector.width(),
            self.projector.height(),
            self.config.background,
        )?
        .with_label_font_size(self.config.label_font_size);

        self.render_onto(&mut canvas)?;

        Ok(canvas)
    }

    pub fn render_onto<C: Canvas>(&self, canvas: &mut C) -> Result<()> {
        let render_start = std::time::Instant::now();

        event!(tracing::Level::INFO, "Printing lines");
        self.draw_ways(canvas)?;
        let ways_time = std::time::Instant::now();

        event!(tracing::Level::INFO, "Printing dots");
        self.draw_node_markers(canvas);
        let nodes_time = std::time::Instant::now();

        event!(tracing::Level::INFO, "Printing labels");
        let labels = self.draw_labels(canvas)?;
        let labels_time = std::time::Instant::now();

        event!(
            tracing::Level::DEBUG,
            "Drew {} ways in {:.2}ms, {} nodes in {:.2}ms and {} labels in {:.2}ms",
            self.graph.way_count(),
            ways_time.duration_since(render_start).as_millis(),
            self.graph.node_count(),
            nodes_time.duration_since(ways_time).as_millis(),
            labels,
            labels_time.duration_since(nodes_time).as_millis()
        );

        Ok(())
    }

    fn draw_ways<C: Canvas>(&self, canvas: &mut C) -> Result<()> {
        for (way_id, way) in self.graph.ways() {
            let points = self
                .graph
                .resolve_way(way_id, way)?
                .into_iter()
                .map(|node| self.projector.to_pixel(node.lon, node.lat))
                .collect::<Vec<_>>();

            if points.len() < 2 {
                continue;
            }

            let width = self.style.width_for(way);
            let color = self.style.color_for(way);

            for segment in points.windows(2) {
                canvas.draw_line(segment[0], segment[1], width, color);
            }
        }

        Ok(())
    }

    fn draw_node_markers<C: Canvas>(&self, canvas: &mut C) {
        for (_, node) in self.graph.nodes() {
            let at = self.projector.to_pixel(node.lon, node.lat);
            canvas.set_pixel(at, self.config.marker_color);
        }
    }

    fn draw_labels<C: Canvas>(&self, canvas: &mut C) -> Result<usize> {
        let mut drawn = 0;

        for (way_id, way) in self.graph.ways() {
            let Some(name) = way.name() else {
                continue;
            };
            let Some(anchor_id) = way.label_anchor() else {
                continue;
            };

            let anchor = self
                .graph
                .node(anchor_id)
                .ok_or_else(|| Error::DanglingReference {
                    way: way_id.clone(),
                    node: anchor_id.clone(),
                })?;
            let at: PixelPoint = self.projector.to_pixel(anchor.lon, anchor.lat);

            canvas.draw_text_centered(at, name, self.config.label_color)?;
            drawn += 1;
        }

        Ok(drawn)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parser,
        types::{Node, NodeId, Way, WayId},
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Line(PixelPoint, PixelPoint, u32, Rgb),
        Pixel(PixelPoint, Rgb),
        Text(PixelPoint, String, Rgb),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        ops: Vec<Op>,
    }

    impl RecordingCanvas {
        fn lines(&self) -> Vec<&Op> {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Line(..)))
                .collect()
        }

        fn texts(&self) -> Vec<&Op> {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Text(..)))
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (u32, u32) {
            (0, 0)
        }

        fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, width: u32, color: Rgb) {
            self.ops.push(Op::Line(from, to, width, color));
        }

        fn set_pixel(&mut self, at: PixelPoint, color: Rgb) {
            self.ops.push(Op::Pixel(at, color));
        }

        fn draw_text_centered(&mut self, at: PixelPoint, text: &str, color: Rgb) -> Result<()> {
            self.ops.push(Op::Text(at, text.to_owned(), color));
            Ok(())
        }
    }

    const ROAD: Rgb = Rgb::new(0x33, 0x99, 0xff);

    // An L-shaped motorway through a, b, c plus an untagged way from c to d, on a 101x101
    // canvas so that every node lands on a whole pixel.
    fn l_shape(motorway_name: Option<&str>) -> MapGraph {
        let mut graph = MapGraph::new();
        graph.insert_node(NodeId::from("a"), Node::new(None, 10.0, 0.0));
        graph.insert_node(NodeId::from("b"), Node::new(None, 0.0, 0.0));
        graph.insert_node(NodeId::from("c"), Node::new(None, 0.0, 10.0));
        graph.insert_node(NodeId::from("d"), Node::new(None, 5.0, 10.0));

        let mut motorway = Way {
            nodes: vec![NodeId::from("a"), NodeId::from("b"), NodeId::from("c")],
            ..Way::default()
        };
        motorway
            .tags
            .insert("highway".to_string(), "motorway".to_string());
        if let Some(name) = motorway_name {
            motorway.tags.insert("name".to_string(), name.to_string());
        }
        graph.insert_way(WayId::from("1"), motorway);

        graph.insert_way(
            WayId::from("2"),
            Way {
                nodes: vec![NodeId::from("c"), NodeId::from("d")],
                ..Way::default()
            },
        );

        graph
    }

    fn record(graph: &MapGraph, width: u32) -> Result<RecordingCanvas> {
        let renderer = RasterRenderer::new(graph, &RenderConfig::with_width(width))?;
        let mut canvas = RecordingCanvas::default();
        renderer.render_onto(&mut canvas)?;
        Ok(canvas)
    }

    #[test]
    fn l_shaped_motorway_and_untagged_way_use_their_widths() {
        let canvas = record(&l_shape(None), 101).unwrap();

        assert_eq!(
            canvas.lines(),
            vec![
                &Op::Line(PixelPoint::new(0, 0), PixelPoint::new(0, 100), 20, ROAD),
                &Op::Line(PixelPoint::new(0, 100), PixelPoint::new(100, 100), 20, ROAD),
                &Op::Line(PixelPoint::new(100, 100), PixelPoint::new(100, 50), 2, ROAD),
            ]
        );
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn named_way_gets_a_label_at_its_middle_node() {
        let canvas = record(&l_shape(Some("A1")), 101).unwrap();

        assert_eq!(
            canvas.texts(),
            vec![&Op::Text(
                PixelPoint::new(0, 100),
                "A1".to_string(),
                Rgb::BLACK
            )]
        );
    }

    #[test]
    fn passes_run_in_order() {
        let canvas = record(&l_shape(Some("A1")), 101).unwrap();

        let kinds = canvas
            .ops
            .iter()
            .map(|op| match op {
                Op::Line(..) => 'l',
                Op::Pixel(..) => 'p',
                Op::Text(..) => 't',
            })
            .collect::<String>();

        assert_eq!(kinds, "lllppppt");
    }

    #[test]
    fn every_node_gets_a_marker_even_when_unreferenced() {
        let mut graph = l_shape(None);
        graph.insert_node(NodeId::from("lonely"), Node::new(None, 5.0, 5.0));
        graph.invalidate();

        let canvas = record(&graph, 101).unwrap();

        let markers = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Pixel(_, Rgb::RED)))
            .count();
        assert_eq!(markers, 5);
        assert!(canvas.ops.contains(&Op::Pixel(PixelPoint::new(50, 50), Rgb::RED)));
    }

    #[test]
    fn short_ways_draw_nothing() {
        let mut graph = l_shape(None);
        graph.insert_way(
            WayId::from("3"),
            Way {
                nodes: vec![NodeId::from("a")],
                ..Way::default()
            },
        );
        graph.insert_way(WayId::from("4"), Way::default());

        let canvas = record(&graph, 101).unwrap();

        assert_eq!(canvas.lines().len(), 3);
    }

    #[test]
    fn dangling_reference_fails_before_drawing_the_way() {
        let mut graph = l_shape(None);
        graph.insert_way(
            WayId::from("0"),
            Way {
                nodes: vec![NodeId::from("a"), NodeId::from("b"), NodeId::from("ghost")],
                ..Way::default()
            },
        );

        let renderer = RasterRenderer::new(&graph, &RenderConfig::with_width(101)).unwrap();
        let mut canvas = RecordingCanvas::default();

        match renderer.render_onto(&mut canvas) {
            Err(Error::DanglingReference { way, node }) => {
                assert_eq!(way, WayId::from("0"));
                assert_eq!(node, NodeId::from("ghost"));
            }
            other => panic!("expected a dangling reference, got {:?}", other),
        }
        // Way "0" sorts first, so nothing at all was drawn.
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn single_node_map_cannot_be_projected() {
        let graph = parser::parse(r#"<osm><node id="1" lat="3" lon="4"/></osm>"#.as_bytes())
            .unwrap();

        assert!(graph.bounds().is_ok());
        assert!(matches!(
            RasterRenderer::new(&graph, &RenderConfig::default()),
            Err(Error::DegenerateBounds(_))
        ));
    }

    #[test]
    fn empty_map_has_no_bounds() {
        let graph = parser::parse("<osm></osm>".as_bytes()).unwrap();

        assert!(matches!(
            RasterRenderer::new(&graph, &RenderConfig::default()),
            Err(Error::EmptyGraph)
        ));
    }

    #[test]
    fn markers_are_painted_over_lines() {
        let graph = l_shape(None);
        let renderer = RasterRenderer::new(&graph, &RenderConfig::with_width(101)).unwrap();

        let canvas = renderer.render().unwrap();

        assert_eq!(canvas.size(), (101, 101));
        // Node "b" sits under the motorway stroke, its marker must still show.
        assert_eq!(canvas.pixel(0, 100), Some(Rgb::RED));
        assert_eq!(canvas.pixel(50, 99), Some(ROAD));
        assert_eq!(canvas.pixel(50, 50), Some(Rgb::WHITE));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let graph = l_shape(None);
        let renderer = RasterRenderer::new(&graph, &RenderConfig::with_width(101)).unwrap();

        let first = renderer.render().unwrap();
        let second = renderer.render().unwrap();

        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn custom_styles_are_used_for_every_way() {
        struct Thin;

        impl StyleResolver for Thin {
            fn width_for(&self, _: &Way) -> u32 {
                1
            }

            fn color_for(&self, _: &Way) -> Rgb {
                Rgb::BLACK
            }
        }

        let graph = l_shape(None);
        let renderer = RasterRenderer::new(&graph, &RenderConfig::with_width(101))
            .unwrap()
            .with_style(Thin);
        let mut canvas = RecordingCanvas::default();
        renderer.render_onto(&mut canvas).unwrap();

        assert!(
            canvas
                .lines()
                .iter()
                .all(|op| matches!(op, Op::Line(_, _, 1, Rgb::BLACK)))
        );
    }
}
