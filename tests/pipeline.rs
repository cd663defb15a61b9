// SPDX: CC0-1.0

use kcalc::{
    buffer::ExpressionBuffer,
    compile, plot,
    sample::{sample, Sample, STEPS},
    Canvas, Viewport,
};

const CANVAS: Canvas = Canvas {
    width: 600.0,
    height: 400.0,
};

#[test]
fn arithmetic_entry_is_never_blocked_mid_expression() {
    // every prefix of a well-formed expression must be reachable keystroke
    // by keystroke
    let mut buffer = ExpressionBuffer::new();
    for chr in "2 + 3 * 4".chars() {
        buffer
            .append(&chr.to_string())
            .unwrap_or_else(|err| panic!("'{chr}' rejected after '{buffer}': {err}"));
    }
    assert_eq!(buffer.as_str(), "2 + 3 * 4");
}

#[test]
fn bounded_function_plots_as_one_unbroken_polyline() {
    let expr = compile("sin(x)").unwrap();
    let rendered = plot(&expr, &Viewport::DEFAULT, CANVAS).unwrap();
    assert_eq!(rendered.segments.len(), 1);
    assert_eq!(rendered.segments[0].len(), STEPS + 1);
}

#[test]
fn asymptote_splits_the_curve_instead_of_bridging_it() {
    let expr = compile("1/x").unwrap();
    let rendered = plot(&expr, &Viewport::DEFAULT, CANVAS).unwrap();
    assert_eq!(rendered.segments.len(), 2);

    // the two branches never meet: one ends left of center, the other
    // starts right of it
    let left_end = rendered.segments[0].last().unwrap();
    let right_start = rendered.segments[1].first().unwrap();
    assert!(left_end.x < CANVAS.width / 2.0);
    assert!(right_start.x > CANVAS.width / 2.0);
}

#[test]
fn tangent_breaks_at_every_asymptote() {
    let expr = compile("tan(x)").unwrap();
    let rendered = plot(&expr, &Viewport::DEFAULT, CANVAS).unwrap();
    assert!(rendered.segments.len() > 2);
}

#[test]
fn every_mapped_point_lands_on_the_canvas() {
    for src in ["sin(x)", "1/x", "x^2", "exp(x)"] {
        let expr = compile(src).unwrap();
        let rendered = plot(&expr, &Viewport::DEFAULT, CANVAS).unwrap();
        for segment in &rendered.segments {
            for point in segment {
                assert!(
                    (0.0..=CANVAS.width).contains(&point.x),
                    "{src}: x = {}",
                    point.x
                );
                assert!(
                    (0.0..=CANVAS.height).contains(&point.y),
                    "{src}: y = {}",
                    point.y
                );
            }
        }
    }
}

#[test]
fn segment_structure_matches_the_gap_runs() {
    let expr = compile("1/x").unwrap();
    let samples = sample(&expr, &Viewport::DEFAULT, STEPS);
    let rendered = plot(&expr, &Viewport::DEFAULT, CANVAS).unwrap();

    // lengths of maximal point runs in the sample sequence
    let mut runs: Vec<usize> = Vec::new();
    let mut current = 0usize;
    for entry in &samples {
        match entry {
            Sample::Point(_) => current += 1,
            Sample::Gap => {
                if current > 0 {
                    runs.push(current);
                    current = 0;
                }
            }
        }
    }
    if current > 0 {
        runs.push(current);
    }

    let segment_lengths: Vec<usize> = rendered.segments.iter().map(Vec::len).collect();
    assert_eq!(segment_lengths, runs);
}

#[test]
fn rejected_inputs_reject_end_to_end() {
    assert!(compile("2 + widgets(x)").is_err());
    assert!(compile("sinx").is_err());
    assert!(compile("sin x").is_err());
    assert!(compile("(1 + 2").is_err());
    assert!(compile("").is_err());
}
