// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use kcalc::{
    api::{HttpCompute, MatrixAction},
    compile,
    format::format_number,
    history,
    lex::{LexErrTyp, TokTyp},
    matrix::MatrixEntry,
    parse::{ParseErr, ParseErrTyp},
    prefs::{AngleUnit, Theme},
    session::{GraphErr, Session, Tab},
    shell::{self, Command},
    stdlib,
    storage::{FileStorage, Storage},
    Canvas, Number,
};
use log::warn;
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::{
    fs::OpenOptions,
    io::{self, stdout, BufWriter, Write},
    process::ExitCode,
};

const CANVAS: Canvas = Canvas {
    width: 600.0,
    height: 400.0,
};
const STORAGE_DIR: &str = ".kcalc";
const API_URL_VAR: &str = "KCALC_API_URL";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_plot-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

struct State {
    session: Session,
    store: FileStorage,
    backend: HttpCompute,
}

fn try_main() -> anyhow::Result<()> {
    let _ = SimpleLogger::init(LevelFilter::Info, Config::default());

    let api_url =
        std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let store = FileStorage::new(STORAGE_DIR);
    let mut state = State {
        session: Session::load(&store),
        store,
        backend: HttpCompute::new(api_url),
    };
    log::info!(
        "computation service at {}, storage in {}",
        state.backend.base_url(),
        state.store.dir().display(),
    );

    let mut stdout = BufWriter::new(stdout());
    loop {
        status(&mut stdout, &state.session)?;

        let mut line = shell::input(&mut stdout, "> ")?;
        line.make_ascii_lowercase();
        writeln!(stdout)?;
        if line.is_empty() {
            continue;
        }

        if let Ok(cmd) = line.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::Tab => cmd_tab(&mut stdout, &mut state)?,

                Command::Calc => cmd_calc(&mut stdout, &mut state)?,

                Command::Clear => {
                    state.session.clear();
                }

                Command::ClearEntry => {
                    state.session.clear_entry();
                }

                Command::Backspace => {
                    state.session.backspace();
                    writeln!(stdout, "{}", state.session.expression())?;
                }

                Command::ToggleSign => {
                    state.session.toggle_sign();
                    writeln!(stdout, "{}", state.session.result())?;
                }

                Command::Insert => cmd_insert_fn(&mut stdout, &mut state)?,

                Command::Constant => cmd_insert_const(&mut stdout, &mut state)?,

                Command::Memory => cmd_memory(&mut stdout, &mut state)?,

                Command::SetFn => cmd_set_fn(&mut stdout, &mut state)?,

                Command::Plot => {
                    do_plot(&mut stdout, &mut state)?;
                    state.session.save(&mut state.store);
                }

                Command::Window => cmd_window(&mut stdout, &mut state)?,

                Command::ZoomIn => {
                    state.session.zoom(0.8);
                    after_view_change(&mut stdout, &mut state)?;
                }

                Command::ZoomOut => {
                    state.session.zoom(1.25);
                    after_view_change(&mut stdout, &mut state)?;
                }

                Command::ResetView => {
                    state.session.reset_view();
                    after_view_change(&mut stdout, &mut state)?;
                }

                Command::History => cmd_history(&mut stdout, &state)?,

                Command::ClearHistory => cmd_clear_history(&mut stdout, &mut state)?,

                Command::Matrix => cmd_matrix(&mut stdout, &mut state)?,

                Command::Settings => cmd_settings(&mut stdout, &mut state)?,
            }
        } else if state.session.tab().is_arithmetic() {
            type_into_buffer(&mut stdout, &mut state, &line)?;
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn status<W: Write>(mut out: W, session: &Session) -> io::Result<()> {
    let tab = session.tab();
    match tab {
        Tab::Basic | Tab::Scientific => {
            let expr = session.expression();
            writeln!(
                out,
                "[{tab}] {expr} = {result}",
                expr = if expr.is_empty() { "0" } else { expr },
                result = session.result(),
            )
        }
        Tab::Matrix => writeln!(
            out,
            "[matrix] {size}x{size}",
            size = session.matrix().size()
        ),
        Tab::Graph => {
            if session.function().is_empty() {
                writeln!(out, "[graph] f(x) is not set")
            } else {
                writeln!(out, "[graph] f(x) = {}", session.function())
            }
        }
        Tab::History => writeln!(
            out,
            "[history] {count} calculations",
            count = session.history().len()
        ),
        Tab::Settings => {
            let prefs = session.prefs();
            writeln!(
                out,
                "[settings] theme {theme}, angle {angle}, {places} decimal places",
                theme = prefs.theme,
                angle = prefs.angle_unit,
                places = prefs.decimal_places,
            )
        }
    }
}

fn type_into_buffer<W: Write>(mut out: W, state: &mut State, line: &str) -> anyhow::Result<()> {
    match state.session.append(line) {
        Ok(()) => writeln!(out, "{}", state.session.expression())?,
        // recoverable: the buffer is unchanged, only the message flashes
        Err(err) => writeln!(out, "error: {err}")?,
    }
    Ok(())
}

fn cmd_tab<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let names: Vec<&str> = Tab::exhaustive().iter().map(|t| t.name()).collect();
    let raw = shell::input(&mut out, format_args!("?tab ({}) = ", names.join("/")))?;
    if raw.is_empty() {
        return Ok(());
    }
    match raw.parse::<Tab>() {
        Ok(tab) => {
            state.session.switch_tab(tab);
            match tab {
                Tab::History => cmd_history(&mut out, state)?,
                Tab::Matrix => print_matrix(&mut out, state.session.matrix())?,
                _ => {}
            }
        }
        Err(()) => writeln!(out, "error: unknown tab '{raw}'")?,
    }
    Ok(())
}

fn cmd_calc<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let expression = state.session.expression().to_string();
    match state.session.calculate(&state.backend) {
        Ok(()) => {
            writeln!(out, "{expression} = {}", state.session.result())?;
            state.session.save(&mut state.store);
        }
        Err(err) => {
            warn!("calculation request failed: {err}");
            writeln!(out, "{}", state.session.result())?;
        }
    }
    Ok(())
}

fn cmd_insert_fn<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if !state.session.tab().is_arithmetic() {
        writeln!(
            out,
            "note: functions are inserted in the basic and scientific tabs"
        )?;
        return Ok(());
    }
    let name = shell::input(&mut out, "?function = ")?;
    if name.is_empty() {
        return Ok(());
    }
    if stdlib::lookup_fun(&name).is_some() {
        state.session.insert_function(&name);
        writeln!(out, "{}", state.session.expression())?;
    } else {
        writeln!(out, "error: unknown function '{name}'")?;
        suggest(&mut out, &name)?;
    }
    Ok(())
}

fn cmd_insert_const<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if !state.session.tab().is_arithmetic() {
        writeln!(
            out,
            "note: constants are inserted in the basic and scientific tabs"
        )?;
        return Ok(());
    }
    let name = shell::input(&mut out, "?constant (pi/e/phi/sqrt2) = ")?;
    if name.is_empty() {
        return Ok(());
    }
    if state.session.insert_constant(&name) {
        writeln!(out, "{}", state.session.expression())?;
    } else {
        writeln!(out, "error: unknown constant '{name}'")?;
    }
    Ok(())
}

fn cmd_memory<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let op = shell::input(&mut out, "?memory op (store/recall/clear/add/sub) = ")?;
    match op.as_str() {
        "" => return Ok(()),
        "store" => state.session.memory_store(),
        "recall" => {
            state.session.memory_recall();
            writeln!(out, "{}", state.session.expression())?;
        }
        "clear" => state.session.memory_clear(),
        "add" => state.session.memory_add(),
        "sub" => state.session.memory_subtract(),
        other => {
            writeln!(out, "error: unknown memory op '{other}'")?;
            return Ok(());
        }
    }
    let places = state.session.prefs().decimal_places;
    writeln!(
        out,
        "memory = {}",
        format_number(state.session.memory(), places)
    )?;
    state.session.save(&mut state.store);
    Ok(())
}

fn cmd_set_fn<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let text = shell::input(&mut out, "f(x) = ")?;
    if text.is_empty() {
        return Ok(());
    }
    state.session.set_function(text);
    match compile(state.session.function()) {
        Ok(expr) => writeln!(out, "f(x) = {expr}")?,
        Err(err) => report_parse_err(&mut out, &err)?,
    }
    Ok(())
}

fn do_plot<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let label = state.session.function().trim().to_string();
    match state.session.plot(CANVAS) {
        Ok(rendered) => {
            let segments = rendered.segments.len();
            let path = output_svg_filename(Local::now());
            let mut file = BufWriter::new(
                OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .context("failed to open output svg file")?,
            );
            shell::write_svg(&mut file, rendered, CANVAS, &label)?;
            file.flush()?;
            file.get_mut().sync_data()?;
            drop(file);

            writeln!(
                out,
                "plotted f(x) = {label} ({segments} segment{s}) -> {path}",
                s = if segments == 1 { "" } else { "s" },
            )?;
        }
        Err(err) => report_graph_err(&mut out, &err)?,
    }
    Ok(())
}

fn replot_if_set<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if state.session.function().trim().is_empty() {
        return Ok(());
    }
    do_plot(&mut out, state)
}

fn after_view_change<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "window: {}", state.session.view())?;
    state.session.save(&mut state.store);
    replot_if_set(&mut out, state)
}

fn cmd_window<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let mut view = *state.session.view();
    writeln!(out, "window: {view}")?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to keep the current value")?;

    for (name, dst) in [
        ("x min", &mut view.x_min),
        ("x max", &mut view.x_max),
        ("y min", &mut view.y_min),
        ("y max", &mut view.y_max),
    ] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    if state.session.set_view(view) {
        state.session.save(&mut state.store);
        replot_if_set(&mut out, state)?;
    } else {
        writeln!(out, "error: each minimum must be less than its maximum")?;
    }
    Ok(())
}

fn cmd_history<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let entries = state.session.history().entries();
    if entries.is_empty() {
        writeln!(out, "No calculation history")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            out,
            "{expr} = {result}  ({tab}, {when})",
            expr = entry.expression,
            result = entry.result,
            tab = entry.tab,
            when = entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        )?;
    }
    writeln!(out, "{} calculations", entries.len())?;
    Ok(())
}

fn cmd_clear_history<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    state.session.clear_history();
    state.store.remove(history::STORAGE_KEY);
    if let Err(err) = state.backend.clear_history() {
        warn!("history sync failed: {err}");
    }
    writeln!(out, "history cleared")?;
    Ok(())
}

fn print_matrix<W: Write>(mut out: W, entry: &MatrixEntry) -> anyhow::Result<()> {
    for row in 0..entry.size() {
        let cells: Vec<&str> = (0..entry.size())
            .map(|col| entry.get(row, col).unwrap_or("0"))
            .collect();
        writeln!(out, "[{}]", cells.join(", "))?;
    }
    Ok(())
}

fn cmd_matrix<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    print_matrix(&mut out, state.session.matrix())?;

    let actions: Vec<&str> = MatrixAction::exhaustive()
        .iter()
        .map(|a| a.name())
        .collect();
    let op = shell::input(
        &mut out,
        format_args!("?matrix op (size/set/identity/{}) = ", actions.join("/")),
    )?;
    match op.as_str() {
        "" => Ok(()),

        "size" => {
            match shell::read_fromstr::<_, usize>(&mut out, "?size = ", true)? {
                Ok(Some(size)) => {
                    state.session.set_matrix_size(size);
                    state.session.save(&mut state.store);
                    print_matrix(&mut out, state.session.matrix())?;
                }
                Ok(None) | Err(_) => {}
            }
            Ok(())
        }

        "set" => {
            let row = match shell::read_fromstr::<_, usize>(&mut out, "?row = ", true)? {
                Ok(Some(row)) => row,
                Ok(None) | Err(_) => return Ok(()),
            };
            let col = match shell::read_fromstr::<_, usize>(&mut out, "?col = ", true)? {
                Ok(Some(col)) => col,
                Ok(None) | Err(_) => return Ok(()),
            };
            let value = shell::input(&mut out, "?value = ")?;
            if !state.session.matrix_mut().set(row, col, &value) {
                writeln!(out, "error: cell ({row}, {col}) is out of bounds")?;
            }
            print_matrix(&mut out, state.session.matrix())?;
            Ok(())
        }

        "identity" => {
            state.session.matrix_mut().reset();
            print_matrix(&mut out, state.session.matrix())?;
            Ok(())
        }

        other => {
            if let Ok(action) = other.parse::<MatrixAction>() {
                match state.session.matrix_calculate(action, &state.backend) {
                    Ok(text) => writeln!(out, "{}:\n{text}", action.help())?,
                    Err(err) => {
                        warn!("matrix request failed: {err}");
                        writeln!(out, "Error: {err}")?;
                    }
                }
            } else {
                writeln!(out, "error: unknown matrix op '{other}'")?;
            }
            Ok(())
        }
    }
}

fn cmd_settings<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    {
        let prefs = state.session.prefs();
        writeln!(
            out,
            "theme {theme}, angle {angle}, {places} decimal places",
            theme = prefs.theme,
            angle = prefs.angle_unit,
            places = prefs.decimal_places,
        )?;
    }

    let which = shell::input(&mut out, "?setting (theme/angle/places) = ")?;
    match which.as_str() {
        "" => return Ok(()),

        "theme" => {
            let names: Vec<&str> = Theme::exhaustive().iter().map(|t| t.name()).collect();
            let raw = shell::input(&mut out, format_args!("?theme ({}) = ", names.join("/")))?;
            if raw.is_empty() {
                return Ok(());
            }
            match raw.parse::<Theme>() {
                Ok(theme) => state.session.set_theme(theme),
                Err(()) => {
                    writeln!(out, "error: unknown theme '{raw}'")?;
                    return Ok(());
                }
            }
        }

        "angle" => {
            let names: Vec<&str> = AngleUnit::exhaustive().iter().map(|u| u.name()).collect();
            let raw = shell::input(&mut out, format_args!("?angle unit ({}) = ", names.join("/")))?;
            if raw.is_empty() {
                return Ok(());
            }
            match raw.parse::<AngleUnit>() {
                Ok(unit) => state.session.set_angle_unit(unit),
                Err(()) => {
                    writeln!(out, "error: unknown angle unit '{raw}'")?;
                    return Ok(());
                }
            }
        }

        "places" => {
            match shell::read_fromstr::<_, usize>(&mut out, "?decimal places (0-20) = ", true)? {
                Ok(Some(places)) => {
                    if !state.session.set_decimal_places(places) {
                        writeln!(out, "error: decimal places must be at most 20")?;
                        return Ok(());
                    }
                }
                Ok(None) | Err(_) => return Ok(()),
            }
        }

        other => {
            writeln!(out, "error: unknown setting '{other}'")?;
            return Ok(());
        }
    }

    state.session.save(&mut state.store);
    if let Err(err) = state.backend.sync_preferences(state.session.prefs()) {
        warn!("preference sync failed: {err}");
    }
    Ok(())
}

fn report_graph_err<W: Write>(mut out: W, err: &GraphErr) -> anyhow::Result<()> {
    match err {
        GraphErr::EmptyFunction => writeln!(out, "Please enter a function")?,
        GraphErr::Parse(parse_err) => report_parse_err(&mut out, parse_err)?,
        GraphErr::Plot(plot_err) => {
            writeln!(out, "Error: {plot_err}")?;
            writeln!(out, "note: the previous plot, if any, has been cleared")?;
        }
    }
    Ok(())
}

fn report_parse_err<W: Write>(mut out: W, err: &ParseErr) -> anyhow::Result<()> {
    writeln!(out)?;
    shell::underline(&mut out, &err.loc)?;
    writeln!(out, "parse error: {}", err.typ)?;
    match &err.typ {
        ParseErrTyp::LexErr(lex_err) => match lex_err {
            LexErrTyp::InvalidChar => {
                writeln!(
                    out,
                    "note: available tokens are numbers, the function and constant names, and symbols +-*/^()"
                )?;
            }
            LexErrTyp::Unsupported(typ) => match typ {
                TokTyp::Ident
                | TokTyp::Number
                | TokTyp::Op(_)
                | TokTyp::OpenParen
                | TokTyp::CloseParen => unreachable!(),

                TokTyp::XGreater | TokTyp::XLess => {
                    writeln!(out, "note: expected an expression but found an inequality")?;
                }
                TokTyp::XEqual => {
                    writeln!(out, "note: expected an expression but found an equation")?;
                }
                TokTyp::XPipe => writeln!(
                    out,
                    "note: use the 'abs' function to compute absolute value"
                )?,
                TokTyp::XComma => {
                    writeln!(out, "note: every function takes a single argument")?;
                }
                TokTyp::XOpenSquareBracket => {}
                TokTyp::XCloseSquareBracket => {}
                TokTyp::XOpenCurly => {}
                TokTyp::XCloseCurly => {}
            },
        },

        ParseErrTyp::ParseNum(_) => {
            writeln!(out, "note: parsing as floating point number")?;
        }

        ParseErrTyp::ParenMismatch => {}

        ParseErrTyp::UnknownName => {
            suggest(&mut out, err.loc.get())?;
        }

        ParseErrTyp::ExpectedExpr => {}

        ParseErrTyp::ExpectedParen => {
            writeln!(
                out,
                "note: a function needs a parenthesized argument, like sin(x)"
            )?;
        }

        ParseErrTyp::Trailing => {
            writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'",
            )?;
        }
    }
    Ok(())
}

fn suggest<W: Write>(mut out: W, text: &str) -> io::Result<()> {
    let text = text.to_ascii_lowercase();
    let most_similar = stdlib::names()
        .map(|name| (strsim::normalized_damerau_levenshtein(&text, name), name))
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc });
    if let Some((sim, name)) = most_similar {
        if sim > 0.3 {
            let kind = if stdlib::lookup_fun(name).is_some() {
                "function"
            } else if stdlib::lookup_const(name).is_some() {
                "constant"
            } else {
                "variable"
            };
            writeln!(out, "note: {kind} '{name}' has a similar name")?;
        }
    }
    Ok(())
}
