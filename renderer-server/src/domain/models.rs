use derive_more::From;
use thiserror::Error;
use uuid::Uuid;

/// A uniquely identifiable rendered map image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderedMap {
    id: Uuid,
    width: CanvasWidth,
    height: u32,
    png: Vec<u8>,
}

impl RenderedMap {
    pub fn new(id: Uuid, width: CanvasWidth, height: u32, png: Vec<u8>) -> Self {
        Self {
            id,
            width,
            height,
            png,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn width(&self) -> CanvasWidth {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }
}

/// A requested canvas width, between one pixel and the configured maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanvasWidth(u32);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CanvasWidthError {
    #[error("canvas width cannot be zero")]
    Zero,
    #[error("canvas width {width} exceeds the maximum of {max}")]
    TooWide { width: u32, max: u32 },
}

impl CanvasWidth {
    pub fn new(raw: u32, max: u32) -> Result<Self, CanvasWidthError> {
        if raw == 0 {
            return Err(CanvasWidthError::Zero);
        }
        if raw > max {
            return Err(CanvasWidthError::TooWide { width: raw, max });
        }

        Ok(Self(raw))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// The fields required by the domain to render a [RenderedMap].
#[derive(Clone, Debug, PartialEq, Eq, Hash, From)]
pub struct RenderMapRequest {
    width: CanvasWidth,
    source: Vec<u8>,
}

impl RenderMapRequest {
    pub fn new(width: CanvasWidth, source: Vec<u8>) -> Self {
        Self { width, source }
    }

    pub fn width(&self) -> CanvasWidth {
        self.width
    }

    pub fn raw_width(&self) -> u32 {
        self.width.0
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn into_source(self) -> Vec<u8> {
        self.source
    }
}

/// The raw output of a render, before it is given an identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: CanvasWidth,
    pub height: u32,
    pub png: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RenderMapError {
    #[error("invalid map: {0}")]
    InvalidMap(renderer_core::Error),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<renderer_core::Error> for RenderMapError {
    fn from(err: renderer_core::Error) -> Self {
        if err.is_input_error() {
            RenderMapError::InvalidMap(err)
        } else {
            RenderMapError::Unknown(anyhow::Error::new(err))
        }
    }
}
