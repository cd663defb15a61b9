// SPDX: CC0-1.0

use crate::{sample::Sample, screen, Canvas, Number, Point, Viewport};

// one connected polyline in screen coordinates; segments are drawn
// independently, which is what keeps a curve from being bridged straight
// across an asymptote
pub type PathSegment = Vec<Point<Number>>;

// closes the open segment at every gap; runs of gaps produce no empty
// segments
pub fn build_path(samples: &[Sample], view: &Viewport, canvas: Canvas) -> Vec<PathSegment> {
    let mut segments: Vec<PathSegment> = Vec::new();
    let mut current: PathSegment = Vec::new();

    for entry in samples {
        match entry {
            Sample::Point(point) => current.push(screen::to_screen(*point, view, canvas)),
            Sample::Gap => {
                if !current.is_empty() {
                    segments.push(core::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas {
        width: 600.0,
        height: 400.0,
    };

    fn point(x: Number, y: Number) -> Sample {
        Sample::Point(Point { x, y })
    }

    #[test]
    fn gap_splits_the_path() {
        let samples = [point(0.0, 0.0), point(1.0, 1.0), Sample::Gap, point(2.0, 2.0)];
        let segments = build_path(&samples, &Viewport::DEFAULT, CANVAS);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 1);
    }

    #[test]
    fn consecutive_gaps_produce_no_empty_segments() {
        let samples = [
            Sample::Gap,
            point(0.0, 0.0),
            Sample::Gap,
            Sample::Gap,
            point(1.0, 1.0),
            Sample::Gap,
        ];
        let segments = build_path(&samples, &Viewport::DEFAULT, CANVAS);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|segment| !segment.is_empty()));
    }

    #[test]
    fn all_gaps_yield_no_segments() {
        let samples = [Sample::Gap; 5];
        assert!(build_path(&samples, &Viewport::DEFAULT, CANVAS).is_empty());
    }

    #[test]
    fn points_are_mapped_to_screen_coordinates() {
        let samples = [point(0.0, 0.0)];
        let segments = build_path(&samples, &Viewport::DEFAULT, CANVAS);
        assert_eq!(segments[0][0], Point { x: 300.0, y: 200.0 });
    }
}
