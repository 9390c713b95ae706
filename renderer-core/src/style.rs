use crate::types::{Rgb, Way};

use std::fmt::{Display, Formatter};

pub(crate) const ROAD_COLOR: Rgb = Rgb::new(0x33, 0x99, 0xff);

/// Decides how a way is stroked.
pub trait StyleResolver {
    fn width_for(&self, way: &Way) -> u32;

    fn color_for(&self, way: &Way) -> Rgb;
}

/// Road importance taken from the `highway` tag, most important first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    Residential,
    Service,
    Other,
}

impl RoadClass {
    pub const ALL: [RoadClass; 9] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Unclassified,
        RoadClass::Residential,
        RoadClass::Service,
        RoadClass::Other,
    ];

    /// Total over every tag value; unknown values and a missing tag are [`RoadClass::Other`].
    pub fn from_highway(value: Option<&str>) -> Self {
        match value {
            Some("motorway") => RoadClass::Motorway,
            Some("trunk") => RoadClass::Trunk,
            Some("primary") => RoadClass::Primary,
            Some("secondary") => RoadClass::Secondary,
            Some("tertiary") => RoadClass::Tertiary,
            Some("unclassified") => RoadClass::Unclassified,
            Some("residential") => RoadClass::Residential,
            Some("service") => RoadClass::Service,
            _ => RoadClass::Other,
        }
    }

    pub fn of(way: &Way) -> Self {
        Self::from_highway(way.tag("highway"))
    }

    pub fn stroke_width(&self) -> u32 {
        match self {
            RoadClass::Motorway => 20,
            RoadClass::Trunk => 18,
            RoadClass::Primary => 16,
            RoadClass::Secondary => 14,
            RoadClass::Tertiary => 12,
            RoadClass::Unclassified => 8,
            RoadClass::Residential => 6,
            RoadClass::Service => 4,
            RoadClass::Other => 2,
        }
    }
}

impl Display for RoadClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadClass::Motorway => write!(f, "motorway"),
            RoadClass::Trunk => write!(f, "trunk"),
            RoadClass::Primary => write!(f, "primary"),
            RoadClass::Secondary => write!(f, "secondary"),
            RoadClass::Tertiary => write!(f, "tertiary"),
            RoadClass::Unclassified => write!(f, "unclassified"),
            RoadClass::Residential => write!(f, "residential"),
            RoadClass::Service => write!(f, "service"),
            RoadClass::Other => write!(f, "other"),
        }
    }
}

/// Width by road class, a single color for everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighwayStyle {
    pub color: Rgb,
}

impl Default for HighwayStyle {
    fn default() -> Self {
        HighwayStyle { color: ROAD_COLOR }
    }
}

impl StyleResolver for HighwayStyle {
    fn width_for(&self, way: &Way) -> u32 {
        RoadClass::of(way).stroke_width()
    }

    fn color_for(&self, _way: &Way) -> Rgb {
        self.color
    }
}
