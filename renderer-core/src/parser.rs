use crate::{
    error::{Error, Result},
    graph::MapGraph,
    markup::{self, Attributes, MarkupHandler},
    types::{Node, NodeId, Way, WayId},
};

use std::{fs::File, io::BufRead, io::BufReader, path::Path};

use tracing::{Level, event, span};

/// Parses an OSM XML extract into a new [`MapGraph`].
///
/// The input is streamed: memory use grows with the number of nodes and ways, never with the
/// size of the document tree.
pub fn parse<R: BufRead>(source: R) -> Result<MapGraph> {
    let mut graph = MapGraph::new();
    parse_into(source, &mut graph)?;
    Ok(graph)
}

/// Parses an OSM XML extract, adding its nodes and ways to `graph`. Bounds are left untouched.
pub fn parse_into<R: BufRead>(source: R, graph: &mut MapGraph) -> Result<()> {
    let span = span!(Level::DEBUG, "parse");
    let _guard = span.enter();

    let parse_start = std::time::Instant::now();

    let mut parser = GeoParser::new(graph);
    markup::drive(source, &mut parser)?;

    event!(
        Level::DEBUG,
        "Parsed {} nodes and {} ways in {:.2}ms",
        graph.node_count(),
        graph.way_count(),
        parse_start.elapsed().as_millis()
    );

    Ok(())
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<MapGraph> {
    let path = path.as_ref();

    event!(Level::INFO, "Opening {}", path.display());
    let file = File::open(path)?;

    event!(Level::INFO, "Parsing");
    parse(BufReader::new(file))
}

struct PendingWay {
    id: WayId,
    way: Way,
}

/// State machine fed by markup callbacks. At most one way is in progress at any time.
struct GeoParser<'g> {
    graph: &'g mut MapGraph,
    current_way: Option<PendingWay>,
}

impl<'g> GeoParser<'g> {
    fn new(graph: &'g mut MapGraph) -> Self {
        GeoParser {
            graph,
            current_way: None,
        }
    }

    fn open_node(&mut self, attributes: &Attributes) -> Result<()> {
        let id = NodeId::new(attributes.require("node", "id")?);
        let lat = coordinate(&id, attributes, "lat", 90.0)?;
        let lon = coordinate(&id, attributes, "lon", 180.0)?;
        let uid = attributes.get("uid").map(str::to_owned);

        self.graph.insert_node(id, Node::new(uid, lat, lon));

        Ok(())
    }

    fn open_way(&mut self, attributes: &Attributes) -> Result<()> {
        if let Some(pending) = &self.current_way {
            return Err(Error::MalformedInput {
                position: 0,
                reason: format!("way opened while way {} is still open", pending.id),
            });
        }

        let id = WayId::new(attributes.require("way", "id")?);
        let way = Way {
            uid: attributes.get("uid").map(str::to_owned),
            ..Way::default()
        };

        self.current_way = Some(PendingWay { id, way });

        Ok(())
    }

    fn close_way(&mut self) {
        if let Some(PendingWay { id, way }) = self.current_way.take() {
            self.graph.insert_way(id, way);
        }
    }
}

impl MarkupHandler for GeoParser<'_> {
    fn element_open(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        match name {
            "node" => self.open_node(attributes),
            "way" => self.open_way(attributes),
            "nd" => {
                if let Some(pending) = self.current_way.as_mut() {
                    let node_ref = attributes.require("nd", "ref")?;
                    pending.way.nodes.push(NodeId::new(node_ref));
                }
                Ok(())
            }
            "tag" => {
                if let Some(pending) = self.current_way.as_mut() {
                    let key = attributes.require("tag", "k")?;
                    let value = attributes.require("tag", "v")?;
                    pending.way.tags.insert(key.to_owned(), value.to_owned());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn element_close(&mut self, name: &str) -> Result<()> {
        if name == "way" {
            self.close_way();
        }
        Ok(())
    }
}

fn coordinate(
    node: &NodeId,
    attributes: &Attributes,
    attribute: &'static str,
    limit: f64,
) -> Result<f64> {
    let raw = attributes.require("node", attribute)?;

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
        _ => Err(Error::InvalidCoordinate {
            node: node.clone(),
            attribute,
            value: raw.to_owned(),
        }),
    }
}
