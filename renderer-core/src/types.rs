use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Self {
        NodeId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        NodeId::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WayId(String);

impl WayId {
    pub fn new(raw: impl Into<String>) -> Self {
        WayId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WayId {
    fn from(raw: &str) -> Self {
        WayId::new(raw)
    }
}

/// A single geographic point, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub uid: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(uid: Option<String>, lat: f64, lon: f64) -> Self {
        Node { uid, lat, lon }
    }
}

pub type Tags = BTreeMap<String, String>;

/// An ordered path through nodes. The order of `nodes` defines the drawn polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Way {
    pub uid: Option<String>,
    pub nodes: Vec<NodeId>,
    pub tags: Tags,
}

impl Way {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    // Approximates the middle of the way by the node halfway along the sequence,
    // not by arc length.
    pub fn label_anchor(&self) -> Option<&NodeId> {
        self.nodes.get(self.nodes.len() / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn is_degenerate(&self) -> bool {
        self.lon_span() <= 0.0 || self.lat_span() <= 0.0
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[lon {} .. {}, lat {} .. {}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A position on the canvas. Row 0 is the top of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        PixelPoint { x, y }
    }
}

impl Display for PixelPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
