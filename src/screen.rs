// SPDX: CC0-1.0

use crate::{Canvas, Number, Point, Viewport};

// fixed axis divisions; tick spacing follows the viewport, not the other way
// around
pub const X_DIVISIONS: usize = 12;
pub const Y_DIVISIONS: usize = 8;

// ticks this close to zero are suppressed, no redundant label at the origin
pub const ZERO_EPS: Number = 0.1;

// screen y grows downward while data y grows upward, hence the flip
pub fn to_screen(point: Point<Number>, view: &Viewport, canvas: Canvas) -> Point<Number> {
    Point {
        x: (point.x - view.x_min) / view.width() * canvas.width,
        y: canvas.height - (point.y - view.y_min) / view.height() * canvas.height,
    }
}

// inverse of to_screen: canvas pixel back to data coordinates
pub fn to_data(point: Point<Number>, view: &Viewport, canvas: Canvas) -> Point<Number> {
    Point {
        x: view.x_min + point.x / canvas.width * view.width(),
        y: view.y_min + (canvas.height - point.y) / canvas.height * view.height(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub at: Number,
    pub value: Number,
    pub label: String,
}

fn tick(at: Number, value: Number) -> Option<Tick> {
    if value.abs() > ZERO_EPS {
        Some(Tick {
            at,
            value,
            label: format!("{value:.1}"),
        })
    } else {
        None
    }
}

pub fn x_ticks(view: &Viewport, canvas: Canvas) -> Vec<Tick> {
    (1..X_DIVISIONS)
        .filter_map(|i| {
            let frac = i as Number / X_DIVISIONS as Number;
            tick(frac * canvas.width, view.x_min + frac * view.width())
        })
        .collect()
}

// pixel offsets measured from the top of the canvas, consistent with
// to_screen's flipped y
pub fn y_ticks(view: &Viewport, canvas: Canvas) -> Vec<Tick> {
    (1..Y_DIVISIONS)
        .filter_map(|i| {
            let frac = i as Number / Y_DIVISIONS as Number;
            tick(
                canvas.height - frac * canvas.height,
                view.y_min + frac * view.height(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CANVAS: Canvas = Canvas {
        width: 600.0,
        height: 400.0,
    };

    #[test]
    fn corners_map_to_corners() {
        let view = Viewport::DEFAULT;
        let bottom_left = to_screen(Point { x: -10.0, y: -10.0 }, &view, CANVAS);
        assert_relative_eq!(bottom_left.x, 0.0);
        assert_relative_eq!(bottom_left.y, 400.0);
        let top_right = to_screen(Point { x: 10.0, y: 10.0 }, &view, CANVAS);
        assert_relative_eq!(top_right.x, 600.0);
        assert_relative_eq!(top_right.y, 0.0);
        let center = to_screen(Point { x: 0.0, y: 0.0 }, &view, CANVAS);
        assert_relative_eq!(center.x, 300.0);
        assert_relative_eq!(center.y, 200.0);
    }

    #[test]
    fn to_data_inverts_to_screen() {
        let view = Viewport {
            x_min: -2.0,
            x_max: 6.0,
            y_min: 1.0,
            y_max: 5.0,
        };
        let original = Point { x: 1.5, y: 3.25 };
        let round_tripped = to_data(to_screen(original, &view, CANVAS), &view, CANVAS);
        assert_relative_eq!(round_tripped.x, original.x);
        assert_relative_eq!(round_tripped.y, original.y);
    }

    #[test]
    fn zero_ticks_are_suppressed() {
        let view = Viewport::DEFAULT;
        // division 6 of 12 lands exactly on zero
        let ticks = x_ticks(&view, CANVAS);
        assert_eq!(ticks.len(), X_DIVISIONS - 2);
        assert!(ticks.iter().all(|t| t.value.abs() > ZERO_EPS));
        // same on the y axis at division 4 of 8
        let ticks = y_ticks(&view, CANVAS);
        assert_eq!(ticks.len(), Y_DIVISIONS - 2);
    }

    #[test]
    fn tick_labels_use_one_decimal() {
        let ticks = x_ticks(&Viewport::DEFAULT, CANVAS);
        assert_eq!(ticks[0].label, "-8.3");
        assert_relative_eq!(ticks[0].at, 50.0);
    }

    #[test]
    fn y_tick_offsets_follow_the_flipped_axis() {
        let ticks = y_ticks(&Viewport::DEFAULT, CANVAS);
        // the first tick is the lowest value, near the bottom of the canvas
        assert_relative_eq!(ticks[0].value, -7.5);
        assert_relative_eq!(ticks[0].at, 350.0);
    }
}
