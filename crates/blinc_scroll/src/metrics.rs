//! Scroll metrics and axis conventions

use std::fmt;

/// Direction in which scroll offsets increase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    /// Offsets increase upwards
    Up,
    /// Offsets increase to the right
    Right,
    /// Offsets increase downwards
    #[default]
    Down,
    /// Offsets increase to the left
    Left,
}

impl AxisDirection {
    pub fn axis(self) -> Axis {
        match self {
            AxisDirection::Up | AxisDirection::Down => Axis::Vertical,
            AxisDirection::Left | AxisDirection::Right => Axis::Horizontal,
        }
    }

    /// Whether offsets grow against the reading/screen direction
    pub fn is_reversed(self) -> bool {
        matches!(self, AxisDirection::Up | AxisDirection::Left)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Which way the user is scrolling, relative to the axis direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    #[default]
    Idle,
    /// Content moves so that later content is revealed
    Forward,
    /// Content moves so that earlier content is revealed
    Reverse,
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Idle => write!(f, "idle"),
            ScrollDirection::Forward => write!(f, "forward"),
            ScrollDirection::Reverse => write!(f, "reverse"),
        }
    }
}

/// Immutable snapshot of a scroll position.
///
/// `pixels` may lie outside `[min_scroll_extent, max_scroll_extent]` while
/// overscrolled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub min_scroll_extent: f64,
    pub max_scroll_extent: f64,
    pub pixels: f64,
    pub viewport_dimension: f64,
    pub axis_direction: AxisDirection,
}

impl ScrollMetrics {
    pub fn new(
        min_scroll_extent: f64,
        max_scroll_extent: f64,
        pixels: f64,
        viewport_dimension: f64,
        axis_direction: AxisDirection,
    ) -> Self {
        Self {
            min_scroll_extent,
            max_scroll_extent,
            pixels,
            viewport_dimension,
            axis_direction,
        }
    }

    /// Same metrics at a different offset
    pub fn with_pixels(self, pixels: f64) -> Self {
        Self { pixels, ..self }
    }

    pub fn axis(&self) -> Axis {
        self.axis_direction.axis()
    }

    pub fn out_of_range(&self) -> bool {
        self.pixels < self.min_scroll_extent || self.pixels > self.max_scroll_extent
    }

    pub fn at_edge(&self) -> bool {
        self.pixels == self.min_scroll_extent || self.pixels == self.max_scroll_extent
    }

    /// Content scrolled off before the leading edge of the viewport
    pub fn extent_before(&self) -> f64 {
        (self.pixels - self.min_scroll_extent).max(0.0)
    }

    /// Viewport space covered by content, i.e. the viewport minus overscroll
    pub fn extent_inside(&self) -> f64 {
        let viewport = self.viewport_dimension;
        viewport
            - (self.min_scroll_extent - self.pixels).clamp(0.0, viewport)
            - (self.pixels - self.max_scroll_extent).clamp(0.0, viewport)
    }

    /// Content remaining past the trailing edge of the viewport
    pub fn extent_after(&self) -> f64 {
        (self.max_scroll_extent - self.pixels).max(0.0)
    }
}

impl fmt::Display for ScrollMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}..[{:.1}]..{:.1}",
            self.extent_before(),
            self.extent_inside(),
            self.extent_after()
        )
    }
}

/// Sign of `value`, zero for zero
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pixels: f64) -> ScrollMetrics {
        ScrollMetrics::new(0.0, 1000.0, pixels, 400.0, AxisDirection::Down)
    }

    #[test]
    fn test_extents_in_range() {
        let m = metrics(250.0);
        assert_eq!(m.extent_before(), 250.0);
        assert_eq!(m.extent_inside(), 400.0);
        assert_eq!(m.extent_after(), 750.0);
        assert!(!m.out_of_range());
        assert!(!m.at_edge());
    }

    #[test]
    fn test_extents_when_overscrolled() {
        let m = metrics(-100.0);
        assert!(m.out_of_range());
        assert_eq!(m.extent_before(), 0.0);
        assert_eq!(m.extent_inside(), 300.0);
        assert_eq!(m.extent_after(), 1100.0);

        let m = metrics(1600.0);
        assert_eq!(m.extent_inside(), 0.0);
        assert_eq!(m.extent_after(), 0.0);
    }

    #[test]
    fn test_at_edge() {
        assert!(metrics(0.0).at_edge());
        assert!(metrics(1000.0).at_edge());
    }

    #[test]
    fn test_axis_direction() {
        assert!(AxisDirection::Up.is_reversed());
        assert!(AxisDirection::Left.is_reversed());
        assert!(!AxisDirection::Down.is_reversed());
        assert_eq!(AxisDirection::Left.axis(), Axis::Horizontal);
        assert_eq!(metrics(0.0).axis(), Axis::Vertical);
    }

    #[test]
    fn test_sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(metrics(250.0).to_string(), "250.0..[400.0]..750.0");
    }
}
