use crate::{
    error::{Error, Result},
    types::{BoundingBox, Node, NodeId, Way, WayId},
};

use std::{cell::OnceCell, collections::BTreeMap};

use tracing::event;

/// The parsed map: every node and way of the extract, plus the memoized bounds.
///
/// The bounds are computed at most once. Adding nodes afterwards does not refresh them;
/// call [`MapGraph::invalidate`] for that.
#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    nodes: BTreeMap<NodeId, Node>,
    ways: BTreeMap<WayId, Way>,
    bounds: OnceCell<BoundingBox>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
    }

    pub fn insert_way(&mut self, id: WayId, way: Way) {
        self.ways.insert(id, way);
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn way(&self, id: &WayId) -> Option<&Way> {
        self.ways.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn ways(&self) -> impl Iterator<Item = (&WayId, &Way)> {
        self.ways.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// Resolves every node of `way_id` in order, failing on the first id the graph lacks.
    pub fn resolve_way(&self, way_id: &WayId, way: &Way) -> Result<Vec<&Node>> {
        way.nodes
            .iter()
            .map(|node_id| {
                self.nodes
                    .get(node_id)
                    .ok_or_else(|| Error::DanglingReference {
                        way: way_id.clone(),
                        node: node_id.clone(),
                    })
            })
            .collect()
    }

    /// Computes the bounds once parsing is done. Equivalent to [`MapGraph::bounds`], kept as
    /// the explicit freeze point between parsing and rendering.
    pub fn finalize(&self) -> Result<BoundingBox> {
        self.bounds()
    }

    /// Returns `(lon_min, lon_max, lat_min, lat_max)` over all nodes, computing it on first use.
    pub fn bounds(&self) -> Result<BoundingBox> {
        if let Some(bounds) = self.bounds.get() {
            return Ok(*bounds);
        }

        let bounds = self.compute_bounds()?;

        Ok(*self.bounds.get_or_init(|| bounds))
    }

    pub fn invalidate(&mut self) {
        self.bounds.take();
    }

    fn compute_bounds(&self) -> Result<BoundingBox> {
        event!(tracing::Level::INFO, "Finding bounding box");

        let mut nodes = self.nodes.values();
        let first = nodes.next().ok_or(Error::EmptyGraph)?;

        let mut bounds = BoundingBox {
            lon_min: first.lon,
            lon_max: first.lon,
            lat_min: first.lat,
            lat_max: first.lat,
        };

        // Both axes are checked for every node. Within an axis a value can only be a new
        // minimum or a new maximum since the running values come from a real node.
        for node in nodes {
            if node.lon < bounds.lon_min {
                bounds.lon_min = node.lon;
            } else if node.lon > bounds.lon_max {
                bounds.lon_max = node.lon;
            }

            if node.lat < bounds.lat_min {
                bounds.lat_min = node.lat;
            } else if node.lat > bounds.lat_max {
                bounds.lat_max = node.lat;
            }
        }

        event!(
            tracing::Level::DEBUG,
            "Longitude {} .. {} (span {})",
            bounds.lon_min,
            bounds.lon_max,
            bounds.lon_span()
        );
        event!(
            tracing::Level::DEBUG,
            "Latitude {} .. {} (span {})",
            bounds.lat_min,
            bounds.lat_max,
            bounds.lat_span()
        );

        Ok(bounds)
    }
}
