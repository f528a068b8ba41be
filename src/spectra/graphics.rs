//! Graphics Support for EPDs
//!
//! Lets `embedded-graphics` draw straight into a [`BitPlane`]. `BinaryColor::On`
//! is ink on that plane. Coordinates are logical, rotated onto the RAM by the
//! [`Rotation`] of the panel configuration.

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    Pixel,
};

use crate::spectra::config::Rotation;
use crate::spectra::plane::BitPlane;

impl BitPlane {
    /// Map a logical point to native RAM coordinates.
    fn to_ram(&self, point: Point) -> Option<(u16, u16)> {
        let geometry = self.geometry();
        let x = u16::try_from(point.x).ok()?;
        let y = u16::try_from(point.y).ok()?;
        if x >= geometry.width() || y >= geometry.height() {
            return None;
        }

        let (ram_width, ram_height) = (geometry.ram_width(), geometry.ram_height());
        Some(match geometry.rotation() {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (ram_width - 1 - y, x),
            Rotation::Deg180 => (ram_width - 1 - x, ram_height - 1 - y),
            Rotation::Deg270 => (y, ram_height - 1 - x),
        })
    }
}

impl DrawTarget for BitPlane {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some((x, y)) = self.to_ram(point) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}

impl OriginDimensions for BitPlane {
    fn size(&self) -> Size {
        let geometry = self.geometry();
        Size::new(u32::from(geometry.width()), u32::from(geometry.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectra::config::PanelConfig;
    use crate::spectra::mock::RecordingTransport;
    use crate::spectra::plane::Plane;
    use crate::PanelController;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    fn plane(rotation: Rotation) -> BitPlane {
        let config = PanelConfig::new(16, 8).rotation(rotation);
        let panel = PanelController::new(config, RecordingTransport::new()).unwrap();
        panel.plane(Plane::Black).clone()
    }

    #[test]
    fn size_follows_rotation() {
        assert_eq!(plane(Rotation::Deg0).size(), Size::new(16, 8));
        assert_eq!(plane(Rotation::Deg90).size(), Size::new(8, 16));
        assert_eq!(plane(Rotation::Deg180).size(), Size::new(16, 8));
        assert_eq!(plane(Rotation::Deg270).size(), Size::new(8, 16));
    }

    #[test]
    fn origin_maps_to_each_corner() {
        let cases = [
            (Rotation::Deg0, (0, 0)),
            (Rotation::Deg90, (15, 0)),
            (Rotation::Deg180, (15, 7)),
            (Rotation::Deg270, (0, 7)),
        ];
        for (rotation, (x, y)) in cases {
            let mut plane = plane(rotation);
            Pixel(Point::zero(), BinaryColor::On)
                .draw(&mut plane)
                .unwrap();
            assert_eq!(plane.pixel(x, y), Some(true), "{rotation:?}");
        }
    }

    #[test]
    fn off_screen_pixels_are_dropped() {
        let mut plane = plane(Rotation::Deg0);
        plane
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(16, 0), BinaryColor::On),
                Pixel(Point::new(0, 8), BinaryColor::On),
            ])
            .unwrap();
        assert!(plane.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn filled_rectangle_sets_whole_bytes() {
        let mut plane = plane(Rotation::Deg0);
        Rectangle::new(Point::new(8, 0), Size::new(8, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut plane)
            .unwrap();
        assert_eq!(&plane.as_bytes()[..4], &[0x00, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn clear_fills_the_plane() {
        let mut plane = plane(Rotation::Deg90);
        plane.clear(BinaryColor::On).unwrap();
        assert!(plane.as_bytes().iter().all(|&b| b == 0xFF));
    }
}
