// SPDX: CC0-1.0

pub mod api;
pub mod buffer;
pub mod eval;
pub mod format;
pub mod history;
pub mod lex;
pub mod matrix;
pub mod parse;
pub mod path;
pub mod prefs;
pub mod sample;
pub mod screen;
pub mod session;
pub mod shell;
pub mod stdlib;
pub mod storage;

use core::fmt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

// pixel size of the plotting surface; the renderer owns the real thing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: Number,
    pub height: Number,
}

// invariant: x_min < x_max and y_min < y_max
// (serializes with the camelCase keys of the stored graphRange record)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub x_min: Number,
    pub x_max: Number,
    pub y_min: Number,
    pub y_max: Number,
}

impl Viewport {
    pub const DEFAULT: Viewport = Viewport {
        x_min: -10.0,
        x_max: 10.0,
        y_min: -10.0,
        y_max: 10.0,
    };

    pub fn is_valid(&self) -> bool {
        self.x_min.is_finite()
            && self.x_max.is_finite()
            && self.y_min.is_finite()
            && self.y_max.is_finite()
            && self.x_min < self.x_max
            && self.y_min < self.y_max
    }

    pub fn width(&self) -> Number {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> Number {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point<Number> {
        Point {
            x: (self.x_min + self.x_max) / 2.0,
            y: (self.y_min + self.y_max) / 2.0,
        }
    }

    // factor < 1 zooms in, > 1 zooms out; the center stays put
    pub fn zoom(&self, factor: Number) -> Viewport {
        let center = self.center();
        let half_x = self.width() * factor / 2.0;
        let half_y = self.height() * factor / 2.0;
        Viewport {
            x_min: center.x - half_x,
            x_max: center.x + half_x,
            y_min: center.y - half_y,
            y_max: center.y + half_y,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x in [{}, {}], y in [{}, {}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

#[derive(Clone, Debug)]
pub struct Plot {
    pub segments: Vec<path::PathSegment>,
    pub x_ticks: Vec<screen::Tick>,
    pub y_ticks: Vec<screen::Tick>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotErr {
    NoValidPoints,
}

impl fmt::Display for PlotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValidPoints => write!(f, "no valid points to plot"),
        }
    }
}

// case-folds and drops an optional "f(x) =" prefix before lexing
pub fn compile(src: &str) -> Result<eval::Expr, parse::ParseErr> {
    let mut cleaned = src.trim().to_ascii_lowercase();
    for prefix in ["f(x) =", "f(x)="] {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim_start().to_string();
            break;
        }
    }
    parse::parse(&Arc::new(cleaned))
}

// fails only when no sample lands in the viewport; the caller must then drop
// any previously rendered path instead of leaving it stale
pub fn plot(expr: &eval::Expr, view: &Viewport, canvas: Canvas) -> Result<Plot, PlotErr> {
    let samples = sample::sample(expr, view, sample::STEPS);
    let segments = path::build_path(&samples, view, canvas);
    if segments.is_empty() {
        return Err(PlotErr::NoValidPoints);
    }
    Ok(Plot {
        segments,
        x_ticks: screen::x_ticks(view, canvas),
        y_ticks: screen::y_ticks(view, canvas),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zoom_preserves_center() {
        let view = Viewport {
            x_min: -4.0,
            x_max: 8.0,
            y_min: -2.0,
            y_max: 10.0,
        };
        let zoomed = view.zoom(0.5);
        assert_relative_eq!(zoomed.center().x, view.center().x);
        assert_relative_eq!(zoomed.center().y, view.center().y);
        assert_relative_eq!(zoomed.width(), view.width() * 0.5);
        assert_relative_eq!(zoomed.height(), view.height() * 0.5);
    }

    #[test]
    fn zoom_in_then_out_restores_bounds() {
        let view = Viewport::DEFAULT;
        let round_tripped = view.zoom(0.8).zoom(1.25);
        assert_relative_eq!(round_tripped.x_min, view.x_min);
        assert_relative_eq!(round_tripped.x_max, view.x_max);
        assert_relative_eq!(round_tripped.y_min, view.y_min);
        assert_relative_eq!(round_tripped.y_max, view.y_max);
    }

    #[test]
    fn degenerate_viewports_are_invalid() {
        let mut view = Viewport::DEFAULT;
        assert!(view.is_valid());
        view.x_max = view.x_min;
        assert!(!view.is_valid());
        view.x_max = Number::NAN;
        assert!(!view.is_valid());
    }

    #[test]
    fn compile_accepts_prefixed_and_mixed_case_input() {
        let expr = compile("F(x) = Sin(X)^2").unwrap();
        assert_relative_eq!(
            eval::eval(&expr, core::f64::consts::FRAC_PI_2),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn plot_of_out_of_range_constant_fails_and_reports_it() {
        let expr = compile("100").unwrap();
        let canvas = Canvas {
            width: 600.0,
            height: 400.0,
        };
        let err = plot(&expr, &Viewport::DEFAULT, canvas).unwrap_err();
        assert_eq!(err, PlotErr::NoValidPoints);
    }
}
