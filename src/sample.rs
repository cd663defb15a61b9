// SPDX: CC0-1.0

use crate::{
    eval::{self, Expr},
    Number, Point, Viewport,
};

// samples per plot; balances smoothness against per-plot cost, not
// user-exposed
pub const STEPS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Point(Point<Number>),
    Gap,
}

impl Sample {
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap)
    }
}

// walks steps + 1 uniform positions over the x-range; non-finite results and
// results outside the y-range become gaps, one classification for "not
// plottable here" whatever the cause
pub fn sample(expr: &Expr, view: &Viewport, steps: usize) -> Vec<Sample> {
    let step = view.width() / steps as Number;
    (0..=steps)
        .map(|i| {
            let x = view.x_min + step * i as Number;
            let y = eval::eval(expr, x);
            if y.is_finite() && y >= view.y_min && y <= view.y_max {
                Sample::Point(Point { x, y })
            } else {
                Sample::Gap
            }
        })
        .collect()
}
