// SPDX: CC0-1.0

use crate::{eval::Fun, Number};
use core::f64::consts; // assumes Number = f64

pub const X: &str = "x";

// log is base-10, ln natural
pub const FUNCTIONS: &[Fun] = &[
    Fun::new("sin", sin),
    Fun::new("cos", cos),
    Fun::new("tan", tan),
    Fun::new("log", log),
    Fun::new("ln", ln),
    Fun::new("sqrt", sqrt),
    Fun::new("abs", abs),
    Fun::new("exp", exp),
    Fun::new("floor", floor),
    Fun::new("ceil", ceil),
    Fun::new("round", round),
];

// pi may also be written with its glyph, matching the calculator keypad
pub const CONSTANTS: &[(&str, Number)] = &[
    ("pi", consts::PI),
    ("π", consts::PI),
    ("e", consts::E),
];

pub fn lookup_fun(name: &str) -> Option<Fun> {
    FUNCTIONS.iter().find(|fun| fun.name == name).copied()
}

pub fn lookup_const(name: &str) -> Option<Number> {
    CONSTANTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, val)| *val)
}

// every name the grammar knows, for similar-name suggestions
pub fn names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS
        .iter()
        .map(|fun| fun.name)
        .chain(CONSTANTS.iter().map(|(key, _)| *key))
        .chain(core::iter::once(X))
}

fn sin(x: Number) -> Number {
    x.sin()
}

fn cos(x: Number) -> Number {
    x.cos()
}

fn tan(x: Number) -> Number {
    x.tan()
}

fn log(x: Number) -> Number {
    x.log10()
}

fn ln(x: Number) -> Number {
    x.ln()
}

fn sqrt(x: Number) -> Number {
    x.sqrt()
}

fn abs(x: Number) -> Number {
    x.abs()
}

fn exp(x: Number) -> Number {
    x.exp()
}

fn floor(x: Number) -> Number {
    x.floor()
}

fn ceil(x: Number) -> Number {
    x.ceil()
}

fn round(x: Number) -> Number {
    x.round()
}
