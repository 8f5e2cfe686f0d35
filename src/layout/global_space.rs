//! Shared coordinate space that enabled outputs are placed in.

use crate::utils::geometry::{Point, Rectangle};

#[derive(Debug, Default)]
pub struct GlobalSpace {
    /// Mapped outputs in the order they were placed.
    outputs: Vec<(String, Rectangle)>,
}

impl GlobalSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    pub fn map_output(&mut self, name: &str, geometry: Rectangle) {
        match self.outputs.iter_mut().find(|(n, _)| n == name) {
            Some((_, geo)) => *geo = geometry,
            None => self.outputs.push((name.to_owned(), geometry)),
        }
    }

    pub fn unmap_output(&mut self, name: &str) -> bool {
        let len = self.outputs.len();
        self.outputs.retain(|(n, _)| n != name);
        self.outputs.len() != len
    }

    pub fn output_geometry(&self, name: &str) -> Option<Rectangle> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, geo)| *geo)
    }

    /// Finds the output containing the point.
    pub fn output_under(&self, point: impl Into<Point>) -> Option<&str> {
        let point = point.into();
        self.outputs
            .iter()
            .find(|(_, geo)| geo.contains(point))
            .map(|(name, _)| name.as_str())
    }

    pub fn overlaps_any(&self, geometry: Rectangle) -> bool {
        self.outputs.iter().any(|(_, geo)| geo.overlaps(geometry))
    }

    /// Location for a new output: right of everything placed so far, at the top.
    pub fn place_auto(&self) -> Point {
        let x = self
            .outputs
            .iter()
            .map(|(_, geo)| geo.right())
            .max()
            .unwrap_or(0);
        Point::new(x, 0)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, Rectangle)> + '_ {
        self.outputs.iter().map(|(name, geo)| (name.as_str(), *geo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_placement_goes_right() {
        let mut space = GlobalSpace::new();
        assert_eq!(space.place_auto(), Point::new(0, 0));

        space.map_output("DP-1", Rectangle::new((0, 0), (1920, 1080)));
        assert_eq!(space.place_auto(), Point::new(1920, 0));

        space.map_output("DP-2", Rectangle::new((-1280, 500), (1280, 720)));
        assert_eq!(space.place_auto(), Point::new(1920, 0));

        space.map_output("DP-3", Rectangle::new((1920, 0), (2560, 1440)));
        assert_eq!(space.place_auto(), Point::new(4480, 0));
    }

    #[test]
    fn point_lookup() {
        let mut space = GlobalSpace::new();
        space.map_output("DP-1", Rectangle::new((0, 0), (1920, 1080)));
        space.map_output("DP-2", Rectangle::new((1920, 0), (1280, 720)));

        assert_eq!(space.output_under((0, 0)), Some("DP-1"));
        assert_eq!(space.output_under((1920, 0)), Some("DP-2"));
        assert_eq!(space.output_under((2000, 800)), None);
        assert_eq!(space.output_under((-1, 10)), None);
    }

    #[test]
    fn remapping_replaces_geometry() {
        let mut space = GlobalSpace::new();
        space.map_output("DP-1", Rectangle::new((0, 0), (1920, 1080)));
        space.map_output("DP-1", Rectangle::new((100, 0), (1920, 1080)));

        assert_eq!(space.outputs().count(), 1);
        assert_eq!(
            space.output_geometry("DP-1"),
            Some(Rectangle::new((100, 0), (1920, 1080)))
        );

        assert!(space.unmap_output("DP-1"));
        assert!(!space.unmap_output("DP-1"));
        assert_eq!(space.output_geometry("DP-1"), None);
    }

    #[test]
    fn overlap_check() {
        let mut space = GlobalSpace::new();
        space.map_output("DP-1", Rectangle::new((0, 0), (1920, 1080)));

        assert!(space.overlaps_any(Rectangle::new((1000, 0), (1920, 1080))));
        assert!(!space.overlaps_any(Rectangle::new((1920, 0), (1920, 1080))));
        assert!(!space.overlaps_any(Rectangle::new((0, 1080), (1920, 1080))));
    }
}
