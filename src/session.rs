// SPDX: CC0-1.0

use crate::{
    api::{CalcRequest, CalcValue, Compute, ComputeErr, MatrixAction, Scalar},
    buffer::{ExpressionBuffer, InputErr},
    format::format_number,
    history::History,
    matrix::MatrixEntry,
    parse::ParseErr,
    prefs::{AngleUnit, Preferences, Theme},
    storage::Storage,
    Canvas, Number, Plot, PlotErr, Viewport,
};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Basic,
    Scientific,
    Matrix,
    Graph,
    History,
    Settings,
}

impl Tab {
    pub const fn exhaustive() -> &'static [Tab] {
        &[
            Self::Basic,
            Self::Scientific,
            Self::Matrix,
            Self::Graph,
            Self::History,
            Self::Settings,
        ]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Scientific => "scientific",
            Self::Matrix => "matrix",
            Self::Graph => "graph",
            Self::History => "history",
            Self::Settings => "settings",
        }
    }

    // the two tabs that share the live expression buffer
    pub const fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Basic | Self::Scientific)
    }
}

impl core::str::FromStr for Tab {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for tab in Self::exhaustive() {
            if s == tab.name() {
                return Ok(*tab);
            }
        }
        Err(())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// why a plot request produced nothing to render
#[derive(Clone, Debug)]
pub enum GraphErr {
    Parse(ParseErr),
    Plot(PlotErr),
    EmptyFunction,
}

impl fmt::Display for GraphErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{}", err.typ),
            Self::Plot(err) => write!(f, "{err}"),
            Self::EmptyFunction => write!(f, "please enter a function"),
        }
    }
}

// the whole calculator state, passed around explicitly so the core works
// with no UI or storage in sight
#[derive(Debug)]
pub struct Session {
    tab: Tab,
    buffer: ExpressionBuffer,
    result: String,
    prefs: Preferences,
    history: History,
    matrix: MatrixEntry,
    function: String,
    last_plot: Option<Plot>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            tab: Tab::Basic,
            buffer: ExpressionBuffer::new(),
            result: "0".to_string(),
            prefs: Preferences::default(),
            history: History::new(),
            matrix: MatrixEntry::default(),
            function: String::new(),
            last_plot: None,
        }
    }

    // preferences and history come from the store; everything else starts
    // fresh
    pub fn load(store: &impl Storage) -> Self {
        let prefs = Preferences::load(store);
        Self {
            matrix: MatrixEntry::new(prefs.matrix_size),
            prefs,
            history: History::load(store),
            ..Self::new()
        }
    }

    pub fn save(&self, store: &mut impl Storage) {
        self.prefs.save(store);
        self.history.save(store);
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn expression(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn matrix(&self) -> &MatrixEntry {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut MatrixEntry {
        &mut self.matrix
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn view(&self) -> &Viewport {
        &self.prefs.graph_range
    }

    pub fn memory(&self) -> Number {
        self.prefs.memory
    }

    pub fn last_plot(&self) -> Option<&Plot> {
        self.last_plot.as_ref()
    }

    // leaving the arithmetic tabs drops the live input
    pub fn switch_tab(&mut self, tab: Tab) {
        if self.tab.is_arithmetic() && !tab.is_arithmetic() {
            self.buffer.clear();
            self.result = "0".to_string();
        }
        self.tab = tab;
    }

    // typed input is ignored outside the arithmetic tabs, where no keypad is
    // shown
    pub fn append(&mut self, input: &str) -> Result<(), InputErr> {
        if !self.tab().is_arithmetic() {
            return Ok(());
        }
        self.buffer.append(input)
    }

    pub fn backspace(&mut self) {
        self.buffer.backspace();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.result = "0".to_string();
    }

    pub fn clear_entry(&mut self) {
        self.buffer.clear();
    }

    // negates the current result and makes it the new expression
    pub fn toggle_sign(&mut self) {
        let Ok(num) = self.result.parse::<Number>() else {
            return;
        };
        if num == 0.0 || !num.is_finite() {
            return;
        }
        self.result = format_number(-num, self.prefs.decimal_places);
        let literal = self.result.clone();
        self.buffer.clear();
        self.buffer.insert_literal(&literal);
    }

    // scientific keypad: "sin" becomes "sin(" in the buffer
    pub fn insert_function(&mut self, name: &str) {
        if self.tab().is_arithmetic() {
            self.buffer.insert_literal(&format!("{name}("));
        }
    }

    pub fn insert_constant(&mut self, name: &str) -> bool {
        let value = match name {
            "pi" | "π" => core::f64::consts::PI,
            "e" => core::f64::consts::E,
            "phi" => 1.618033988749,
            "sqrt2" => core::f64::consts::SQRT_2,
            _ => return false,
        };
        if self.tab().is_arithmetic() {
            self.buffer.insert_literal(&value.to_string());
        }
        true
    }

    // the result display always ends up in a defined state, error or not
    pub fn calculate(&mut self, backend: &impl Compute) -> Result<(), ComputeErr> {
        if self.buffer.as_str().trim().is_empty() {
            self.result = "0".to_string();
            return Ok(());
        }
        let tab = self.tab;
        let req = CalcRequest::calculate(tab, self.buffer.as_str());
        match backend.calculate(&req) {
            Ok(value) => {
                self.result = self.display_value(&value);
                let result = self.result.clone();
                self.history.record(self.buffer.as_str(), result, tab);
                Ok(())
            }
            Err(err) => {
                self.result = match &err {
                    ComputeErr::Service(msg) => format!("Error: {msg}"),
                    ComputeErr::Transport(_) => "Network error".to_string(),
                };
                Err(err)
            }
        }
    }

    pub fn matrix_calculate(
        &mut self,
        action: MatrixAction,
        backend: &impl Compute,
    ) -> Result<String, ComputeErr> {
        let req = CalcRequest::matrix(self.matrix.data(), action);
        let value = backend.calculate(&req)?;
        Ok(self.display_value(&value))
    }

    fn display_scalar(&self, scalar: &Scalar) -> String {
        match scalar.to_number() {
            Some(num) => format_number(num, self.prefs.decimal_places),
            None => scalar.to_string(),
        }
    }

    fn display_value(&self, value: &CalcValue) -> String {
        match value {
            CalcValue::Scalar(scalar) => self.display_scalar(scalar),
            CalcValue::Row(row) => {
                let cells: Vec<String> = row.iter().map(|s| self.display_scalar(s)).collect();
                format!("[{}]", cells.join(", "))
            }
            CalcValue::Table(rows) => {
                let lines: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let cells: Vec<String> =
                            row.iter().map(|s| self.display_scalar(s)).collect();
                        format!("[{}]", cells.join(", "))
                    })
                    .collect();
                lines.join("\n")
            }
        }
    }

    // memory lives in the preferences record so it survives restarts

    pub fn memory_store(&mut self) {
        self.prefs.memory = self.result.parse().unwrap_or(0.0);
    }

    pub fn memory_recall(&mut self) {
        if self.tab().is_arithmetic() {
            let literal = format_number(self.prefs.memory, self.prefs.decimal_places);
            self.buffer.insert_literal(&literal);
        }
    }

    pub fn memory_clear(&mut self) {
        self.prefs.memory = 0.0;
    }

    pub fn memory_add(&mut self) {
        self.prefs.memory += self.result.parse().unwrap_or(0.0);
    }

    pub fn memory_subtract(&mut self) {
        self.prefs.memory -= self.result.parse().unwrap_or(0.0);
    }

    pub fn set_function(&mut self, text: impl Into<String>) {
        self.function = text.into();
    }

    // any failure drops the previously rendered plot, a stale curve must not
    // survive a broken input
    pub fn plot(&mut self, canvas: Canvas) -> Result<&Plot, GraphErr> {
        if self.function.trim().is_empty() {
            self.last_plot = None;
            return Err(GraphErr::EmptyFunction);
        }
        let expr = match crate::compile(&self.function) {
            Ok(expr) => expr,
            Err(err) => {
                self.last_plot = None;
                return Err(GraphErr::Parse(err));
            }
        };
        match crate::plot(&expr, &self.prefs.graph_range, canvas) {
            Ok(plot) => Ok(self.last_plot.insert(plot)),
            Err(err) => {
                self.last_plot = None;
                Err(GraphErr::Plot(err))
            }
        }
    }

    pub fn clear_graph(&mut self) {
        self.function.clear();
        self.last_plot = None;
        self.prefs.graph_range = Viewport::DEFAULT;
    }

    // rejects ranges that would break the viewport invariant
    pub fn set_view(&mut self, view: Viewport) -> bool {
        if !view.is_valid() {
            return false;
        }
        self.prefs.graph_range = view;
        true
    }

    pub fn zoom(&mut self, factor: Number) {
        self.prefs.graph_range = self.prefs.graph_range.zoom(factor);
    }

    pub fn reset_view(&mut self) {
        self.prefs.graph_range = Viewport::DEFAULT;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.prefs.theme = theme;
    }

    pub fn set_angle_unit(&mut self, unit: AngleUnit) {
        self.prefs.angle_unit = unit;
    }

    pub fn set_decimal_places(&mut self, places: usize) -> bool {
        if places > crate::prefs::MAX_DECIMAL_PLACES {
            return false;
        }
        self.prefs.decimal_places = places;
        true
    }

    pub fn set_matrix_size(&mut self, size: usize) {
        self.matrix.resize(size);
        self.prefs.matrix_size = self.matrix.size();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStorage;

    struct FakeCompute {
        response: Result<CalcValue, ComputeErr>,
    }

    impl FakeCompute {
        fn scalar(num: Number) -> Self {
            Self {
                response: Ok(CalcValue::Scalar(Scalar::Num(num))),
            }
        }

        fn failing(err: ComputeErr) -> Self {
            Self {
                response: Err(err),
            }
        }
    }

    impl Compute for FakeCompute {
        fn calculate(&self, _req: &CalcRequest) -> Result<CalcValue, ComputeErr> {
            self.response.clone()
        }
    }

    const CANVAS: Canvas = Canvas {
        width: 600.0,
        height: 400.0,
    };

    #[test]
    fn switching_away_from_arithmetic_clears_the_buffer() {
        let mut session = Session::new();
        session.append("1 + 2").unwrap();
        session.switch_tab(Tab::Scientific);
        assert_eq!(session.expression(), "1 + 2");
        session.switch_tab(Tab::Graph);
        assert_eq!(session.expression(), "");
        assert_eq!(session.result(), "0");
    }

    #[test]
    fn typed_input_is_ignored_outside_arithmetic_tabs() {
        let mut session = Session::new();
        session.switch_tab(Tab::Graph);
        session.append("123").unwrap();
        assert_eq!(session.expression(), "");
    }

    #[test]
    fn calculate_records_history_and_formats_the_result() {
        let mut session = Session::new();
        session.append("2 + 2").unwrap();
        session.calculate(&FakeCompute::scalar(4.0)).unwrap();
        assert_eq!(session.result(), "4");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().entries()[0].expression, "2 + 2");
        assert_eq!(session.history().entries()[0].tab, Tab::Basic);
    }

    #[test]
    fn empty_expression_calculates_to_zero_without_a_request() {
        let mut session = Session::new();
        let backend = FakeCompute::failing(ComputeErr::Transport("offline".to_string()));
        session.calculate(&backend).unwrap();
        assert_eq!(session.result(), "0");
        assert!(session.history().is_empty());
    }

    #[test]
    fn service_errors_show_up_in_the_result_display() {
        let mut session = Session::new();
        session.append("1/0").unwrap();
        let backend = FakeCompute::failing(ComputeErr::Service("bad input".to_string()));
        assert!(session.calculate(&backend).is_err());
        assert_eq!(session.result(), "Error: bad input");
        assert!(session.history().is_empty());

        let backend = FakeCompute::failing(ComputeErr::Transport("timed out".to_string()));
        assert!(session.calculate(&backend).is_err());
        assert_eq!(session.result(), "Network error");
    }

    #[test]
    fn toggle_sign_negates_result_and_expression() {
        let mut session = Session::new();
        session.append("5").unwrap();
        session.calculate(&FakeCompute::scalar(5.0)).unwrap();
        session.toggle_sign();
        assert_eq!(session.result(), "-5");
        assert_eq!(session.expression(), "-5");
        session.toggle_sign();
        assert_eq!(session.result(), "5");
    }

    #[test]
    fn memory_operations_round_trip_through_preferences() {
        let mut session = Session::new();
        session.append("3").unwrap();
        session.calculate(&FakeCompute::scalar(3.0)).unwrap();
        session.memory_store();
        assert_eq!(session.memory(), 3.0);
        session.memory_add();
        assert_eq!(session.memory(), 6.0);
        session.memory_subtract();
        assert_eq!(session.memory(), 3.0);
        session.clear();
        session.memory_recall();
        assert_eq!(session.expression(), "3");
        session.memory_clear();
        assert_eq!(session.memory(), 0.0);
    }

    #[test]
    fn function_insertion_only_touches_arithmetic_tabs() {
        let mut session = Session::new();
        session.switch_tab(Tab::Scientific);
        session.insert_function("sin");
        assert_eq!(session.expression(), "sin(");
        session.switch_tab(Tab::Graph);
        session.insert_function("cos");
        assert_eq!(session.expression(), "");
    }

    #[test]
    fn plotting_keeps_the_last_good_plot_until_a_failure() {
        let mut session = Session::new();
        session.switch_tab(Tab::Graph);
        session.set_function("sin(x)");
        assert!(session.plot(CANVAS).is_ok());
        assert!(session.last_plot().is_some());

        // out of viewport everywhere: the stale plot must go away
        session.set_function("100");
        assert!(matches!(
            session.plot(CANVAS),
            Err(GraphErr::Plot(PlotErr::NoValidPoints))
        ));
        assert!(session.last_plot().is_none());
    }

    #[test]
    fn parse_failures_also_drop_the_stale_plot() {
        let mut session = Session::new();
        session.switch_tab(Tab::Graph);
        session.set_function("x");
        session.plot(CANVAS).unwrap();
        session.set_function("sinx");
        assert!(matches!(session.plot(CANVAS), Err(GraphErr::Parse(_))));
        assert!(session.last_plot().is_none());
    }

    #[test]
    fn zoom_updates_the_persisted_viewport() {
        let mut session = Session::new();
        session.zoom(0.5);
        assert_eq!(session.view().width(), 10.0);
        session.reset_view();
        assert_eq!(*session.view(), Viewport::DEFAULT);
        assert!(!session.set_view(Viewport {
            x_min: 3.0,
            x_max: -3.0,
            y_min: 0.0,
            y_max: 1.0,
        }));
        assert_eq!(*session.view(), Viewport::DEFAULT);
    }

    #[test]
    fn session_state_survives_a_store_round_trip() {
        let mut store = MemStorage::new();
        let mut session = Session::new();
        session.set_theme(Theme::Retro);
        session.set_matrix_size(4);
        session.zoom(0.8);
        session.append("1").unwrap();
        session.calculate(&FakeCompute::scalar(1.0)).unwrap();
        session.save(&mut store);

        let restored = Session::load(&store);
        assert_eq!(restored.prefs().theme, Theme::Retro);
        assert_eq!(restored.matrix().size(), 4);
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.view().width(), 16.0);
    }
}
