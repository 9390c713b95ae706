use crate::{
    canvas::MAX_CANVAS_PIXELS,
    error::{Error, Result},
    types::{BoundingBox, PixelPoint},
};

/// Linear mapping from longitude/latitude to canvas pixels.
///
/// The canvas height follows the aspect ratio of the bounds, so one degree of longitude and
/// one degree of latitude cover the same number of pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    bounds: BoundingBox,
    width: u32,
    height: u32,
}

impl Projector {
    pub fn new(bounds: BoundingBox, width: u32) -> Result<Self> {
        if bounds.is_degenerate() {
            return Err(Error::DegenerateBounds(bounds));
        }

        let height = Self::height_for(&bounds, width)?;

        Ok(Projector {
            bounds,
            width,
            height,
        })
    }

    /// Canvas height preserving the aspect ratio of `bounds`. Never less than one row, and
    /// never so tall that the canvas exceeds [`MAX_CANVAS_PIXELS`].
    pub fn height_for(bounds: &BoundingBox, width: u32) -> Result<u32> {
        if width == 0 {
            return Err(Error::InvalidCanvasSize { width, height: 0 });
        }
        if bounds.is_degenerate() {
            return Err(Error::DegenerateBounds(*bounds));
        }

        let height = (width as f64 * bounds.lat_span() / bounds.lon_span()).round();

        if !height.is_finite() || height > u32::MAX as f64 {
            return Err(Error::InvalidCanvasSize {
                width,
                height: u32::MAX,
            });
        }

        let height = (height as u32).max(1);
        if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
            return Err(Error::InvalidCanvasSize { width, height });
        }

        Ok(height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Projects a point. Fractional pixels are truncated, and rows grow southwards.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> PixelPoint {
        let lon_norm = (lon - self.bounds.lon_min) / self.bounds.lon_span();
        let lat_norm = (lat - self.bounds.lat_min) / self.bounds.lat_span();

        let x = (lon_norm * (self.width - 1) as f64).trunc() as i32;
        let lat_px = (lat_norm * (self.height - 1) as f64).trunc() as i32;

        PixelPoint::new(x, (self.height - 1) as i32 - lat_px)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn bounds(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> BoundingBox {
        BoundingBox {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    #[test]
    fn height_preserves_aspect_ratio() {
        let projector = Projector::new(bounds(0.0, 2.0, 0.0, 1.0), 2000).unwrap();

        assert_eq!(projector.width(), 2000);
        assert_eq!(projector.height(), 1000);
    }

    #[test]
    fn height_is_rounded() {
        // 3 * 1/2 = 1.5 rounds away from zero.
        let projector = Projector::new(bounds(0.0, 2.0, 0.0, 1.0), 3).unwrap();

        assert_eq!(projector.height(), 2);
    }

    #[test]
    fn very_flat_bounds_keep_one_row() {
        let projector = Projector::new(bounds(0.0, 100.0, 0.0, 0.001), 10).unwrap();

        assert_eq!(projector.height(), 1);
        assert_eq!(projector.to_pixel(50.0, 0.0005), PixelPoint::new(4, 0));
    }

    #[test]
    fn corners_map_to_canvas_corners() {
        let b = bounds(-74.02, -73.93, 40.70, 40.80);
        let projector = Projector::new(b, 900).unwrap();
        let (w, h) = (projector.width() as i32, projector.height() as i32);

        let corners = [
            ((b.lon_min, b.lat_max), (0, 0)),
            ((b.lon_max, b.lat_max), (w - 1, 0)),
            ((b.lon_min, b.lat_min), (0, h - 1)),
            ((b.lon_max, b.lat_min), (w - 1, h - 1)),
        ];

        for ((lon, lat), (x, y)) in corners {
            let pixel = projector.to_pixel(lon, lat);
            assert!((pixel.x - x).abs() <= 1, "x of {:?} was {}", (lon, lat), pixel);
            assert!((pixel.y - y).abs() <= 1, "y of {:?} was {}", (lon, lat), pixel);
        }
    }

    #[test]
    fn fractional_pixels_are_truncated() {
        let projector = Projector::new(bounds(0.0, 10.0, 0.0, 10.0), 11).unwrap();

        // 0.99 * 10 = 9.9 -> 9, never rounded up to 10.
        assert_eq!(projector.to_pixel(9.9, 0.0).x, 9);
        assert_eq!(projector.to_pixel(0.0, 9.9).y, 10 - 9);
    }

    #[test]
    fn projection_is_deterministic() {
        let projector = Projector::new(bounds(5.0, 6.0, 45.0, 46.0), 512).unwrap();

        assert_eq!(
            projector.to_pixel(5.3, 45.7),
            projector.to_pixel(5.3, 45.7)
        );
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        for b in [
            bounds(1.0, 1.0, 2.0, 2.0),
            bounds(1.0, 1.0, 2.0, 3.0),
            bounds(1.0, 3.0, 2.0, 2.0),
        ] {
            assert!(matches!(
                Projector::new(b, 100),
                Err(Error::DegenerateBounds(_))
            ));
        }
    }

    #[test]
    fn tall_thin_bounds_exceeding_the_pixel_cap_are_rejected() {
        // 2000 * 80 / 0.0016 would need a 2000x100000000 raster.
        assert!(matches!(
            Projector::new(bounds(0.0, 0.0016, 0.0, 80.0), 2000),
            Err(Error::InvalidCanvasSize {
                width: 2000,
                height: 100_000_000
            })
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(matches!(
            Projector::new(bounds(0.0, 1.0, 0.0, 1.0), 0),
            Err(Error::InvalidCanvasSize { width: 0, .. })
        ));
    }
}
