// SPDX: CC0-1.0

use crate::{lex::SubStr, Canvas, Plot};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Tab,
    Calc,
    Clear,
    ClearEntry,
    Backspace,
    ToggleSign,
    Insert,
    Constant,
    Memory,
    SetFn,
    Plot,
    Window,
    ZoomIn,
    ZoomOut,
    ResetView,
    History,
    ClearHistory,
    Matrix,
    Settings,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::Tab,
            Self::Calc,
            Self::Clear,
            Self::ClearEntry,
            Self::Backspace,
            Self::ToggleSign,
            Self::Insert,
            Self::Constant,
            Self::Memory,
            Self::SetFn,
            Self::Plot,
            Self::Window,
            Self::ZoomIn,
            Self::ZoomOut,
            Self::ResetView,
            Self::History,
            Self::ClearHistory,
            Self::Matrix,
            Self::Settings,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the calculator",
            Self::Tab => "switch to another tab",
            Self::Calc => "send the expression to the computation service",
            Self::Clear => "clear the expression and the result",
            Self::ClearEntry => "clear the expression only",
            Self::Backspace => "delete the last character of the expression",
            Self::ToggleSign => "negate the current result",
            Self::Insert => "insert a scientific function into the expression",
            Self::Constant => "insert a constant into the expression",
            Self::Memory => "memory operations (store/recall/clear/add/sub)",
            Self::SetFn => "set the function to plot",
            Self::Plot => "plot the function into an svg file",
            Self::Window => "edit the graph window ranges",
            Self::ZoomIn => "zoom the graph window in",
            Self::ZoomOut => "zoom the graph window out",
            Self::ResetView => "reset the graph window to its default",
            Self::History => "list the calculation history",
            Self::ClearHistory => "clear the calculation history",
            Self::Matrix => "matrix entry and operations",
            Self::Settings => "change theme, angle unit or decimal places",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Tab => "tab",
            Self::Calc => "=",
            Self::Clear => "clear",
            Self::ClearEntry => "ce",
            Self::Backspace => "del",
            Self::ToggleSign => "sign",
            Self::Insert => "fn",
            Self::Constant => "const",
            Self::Memory => "mem",
            Self::SetFn => "set",
            Self::Plot => "plot",
            Self::Window => "window",
            Self::ZoomIn => "zoomin",
            Self::ZoomOut => "zoomout",
            Self::ResetView => "reset",
            Self::History => "history",
            Self::ClearHistory => "clearhist",
            Self::Matrix => "matrix",
            Self::Settings => "settings",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s: &str = s;
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len())
    )?;
    Ok(())
}

// standalone svg: one <path> whose M commands restart the polyline at every
// gap, plus the axis scale markers
pub fn write_svg<W: Write>(mut out: W, plot: &Plot, canvas: Canvas, label: &str) -> io::Result<()> {
    let Canvas { width, height } = canvas;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(
        out,
        r##"  <rect width="{width}" height="{height}" fill="#101418"/>"##
    )?;

    // center axes
    let mid_x = width / 2.0;
    let mid_y = height / 2.0;
    writeln!(
        out,
        r#"  <line x1="0" y1="{mid_y}" x2="{width}" y2="{mid_y}" stroke="rgba(255,255,255,0.25)"/>"#
    )?;
    writeln!(
        out,
        r#"  <line x1="{mid_x}" y1="0" x2="{mid_x}" y2="{height}" stroke="rgba(255,255,255,0.25)"/>"#
    )?;

    // scale markers along both axes
    for tick in &plot.x_ticks {
        let at = tick.at;
        writeln!(
            out,
            r#"  <line x1="{at:.2}" y1="{y1:.2}" x2="{at:.2}" y2="{y2:.2}" stroke="rgba(255,255,255,0.6)"/>"#,
            y1 = mid_y - 5.0,
            y2 = mid_y + 5.0,
        )?;
        writeln!(
            out,
            r#"  <text x="{at:.2}" y="{y:.2}" text-anchor="middle" fill="rgba(255,255,255,0.6)" font-size="10">{label}</text>"#,
            y = mid_y + 20.0,
            label = tick.label,
        )?;
    }
    for tick in &plot.y_ticks {
        let at = tick.at;
        writeln!(
            out,
            r#"  <line x1="{x1:.2}" y1="{at:.2}" x2="{x2:.2}" y2="{at:.2}" stroke="rgba(255,255,255,0.6)"/>"#,
            x1 = mid_x - 5.0,
            x2 = mid_x + 5.0,
        )?;
        writeln!(
            out,
            r#"  <text x="{x:.2}" y="{y:.2}" text-anchor="end" fill="rgba(255,255,255,0.6)" font-size="10">{label}</text>"#,
            x = mid_x - 15.0,
            y = at + 4.0,
            label = tick.label,
        )?;
    }

    // the curve, broken at gaps
    let mut data = String::new();
    for segment in &plot.segments {
        for (i, point) in segment.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            data.push_str(&format!("{cmd} {:.2} {:.2} ", point.x, point.y));
        }
    }
    writeln!(
        out,
        r##"  <path d="{}" fill="none" stroke="#4fc3f7" stroke-width="2"/>"##,
        data.trim_end(),
    )?;

    writeln!(
        out,
        r#"  <text x="10" y="20" fill="rgba(255,255,255,0.8)" font-size="12">f(x) = {label}</text>"#
    )?;
    writeln!(out, "</svg>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, plot, Viewport};

    #[test]
    fn command_names_are_unique() {
        let names: Vec<&str> = Command::exhaustive().iter().map(|c| c.name()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn every_command_parses_from_its_name() {
        for cmd in Command::exhaustive() {
            assert_eq!(cmd.name().parse::<Command>(), Ok(*cmd));
        }
        assert!("nonsense".parse::<Command>().is_err());
    }

    #[test]
    fn svg_restarts_the_path_at_every_gap() {
        let canvas = Canvas {
            width: 600.0,
            height: 400.0,
        };
        let expr = compile("1/x").unwrap();
        let rendered = plot(&expr, &Viewport::DEFAULT, canvas).unwrap();
        assert!(rendered.segments.len() >= 2);

        let mut svg = Vec::new();
        write_svg(&mut svg, &rendered, canvas, "1/x").unwrap();
        let svg = String::from_utf8(svg).unwrap();
        assert_eq!(
            svg.matches("M ").count(),
            rendered.segments.len(),
            "one M command per segment"
        );
        assert!(svg.contains("</svg>"));
    }
}
