// SPDX: CC0-1.0

use crate::{prefs::Preferences, session::Tab, Number};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixAction {
    Det,
    Inv,
    Rank,
    Transpose,
    Eigenvalues,
    Trace,
}

impl MatrixAction {
    pub const fn exhaustive() -> &'static [MatrixAction] {
        &[
            Self::Det,
            Self::Inv,
            Self::Rank,
            Self::Transpose,
            Self::Eigenvalues,
            Self::Trace,
        ]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Det => "det",
            Self::Inv => "inv",
            Self::Rank => "rank",
            Self::Transpose => "transpose",
            Self::Eigenvalues => "eigenvalues",
            Self::Trace => "trace",
        }
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Det => "determinant",
            Self::Inv => "inverse",
            Self::Rank => "rank",
            Self::Transpose => "transpose",
            Self::Eigenvalues => "eigenvalues",
            Self::Trace => "trace",
        }
    }
}

impl core::str::FromStr for MatrixAction {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for action in Self::exhaustive() {
            if s == action.name() {
                return Ok(*action);
            }
        }
        Err(())
    }
}

// exactly one of expression and matrix_data is set, depending on the mode
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalcRequest {
    #[serde(rename = "type")]
    pub mode: Tab,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_data: Option<Vec<Vec<Number>>>,
    pub action: String,
}

impl CalcRequest {
    pub fn calculate(mode: Tab, expression: impl Into<String>) -> Self {
        Self {
            mode,
            expression: Some(expression.into()),
            matrix_data: None,
            action: "calculate".to_string(),
        }
    }

    pub fn matrix(data: Vec<Vec<Number>>, action: MatrixAction) -> Self {
        Self {
            mode: Tab::Matrix,
            expression: None,
            matrix_data: Some(data),
            action: action.name().to_string(),
        }
    }
}

// the service writes non-finite numbers as strings, and formatted numbers
// may arrive as text too
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Num(Number),
    Text(String),
}

impl Scalar {
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Self::Num(num) => Some(*num),
            Self::Text(text) => match text.as_str() {
                "Infinity" => Some(Number::INFINITY),
                "-Infinity" => Some(Number::NEG_INFINITY),
                "NaN" => Some(Number::NAN),
                other => other.parse().ok(),
            },
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(num) => write!(f, "{num}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CalcValue {
    Scalar(Scalar),
    Row(Vec<Scalar>),
    Table(Vec<Vec<Scalar>>),
}

#[derive(Debug, Deserialize)]
pub struct CalcResponse {
    pub success: bool,
    #[serde(default)]
    pub result: Option<CalcValue>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CalcResponse {
    pub fn into_result(self) -> Result<CalcValue, ComputeErr> {
        if self.success {
            self.result
                .ok_or_else(|| ComputeErr::Service("empty result".to_string()))
        } else {
            Err(ComputeErr::Service(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

// Service carries the application-level message; everything that kept the
// request from completing at all is Transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComputeErr {
    Service(String),
    Transport(String),
}

impl fmt::Display for ComputeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(msg) => f.write_str(msg),
            Self::Transport(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for ComputeErr {}

// single-shot request/response; one request per user action, no coalescing,
// no cancellation
pub trait Compute {
    fn calculate(&self, req: &CalcRequest) -> Result<CalcValue, ComputeErr>;
}

pub struct HttpCompute {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCompute {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<CalcResponse, ComputeErr> {
        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::to_string(payload)
            .map_err(|err| ComputeErr::Transport(err.to_string()))?;
        log::debug!("POST {url}: {body}");
        let response = self
            .agent
            .post(&url)
            .content_type("application/json")
            .send(body.as_bytes())
            .map_err(|err| ComputeErr::Transport(err.to_string()))?;
        response
            .into_body()
            .read_json::<CalcResponse>()
            .map_err(|err| ComputeErr::Transport(err.to_string()))
    }

    // best-effort; the caller decides whether failure is worth more than a
    // warning
    pub fn sync_preferences(&self, prefs: &Preferences) -> Result<(), ComputeErr> {
        let payload = serde_json::json!({
            "theme": prefs.theme,
            "angle_unit": prefs.angle_unit,
            "decimal_places": prefs.decimal_places,
            "memory_value": prefs.memory,
        });
        self.post("/api/preferences/", &payload).map(|_| ())
    }

    pub fn clear_history(&self) -> Result<(), ComputeErr> {
        self.post("/api/clear-history/", &serde_json::json!({}))
            .map(|_| ())
    }
}

impl Compute for HttpCompute {
    fn calculate(&self, req: &CalcRequest) -> Result<CalcValue, ComputeErr> {
        self.post("/api/calculate/", req)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_the_wire_keys() {
        let req = CalcRequest::calculate(Tab::Scientific, "sin(1) + 2");
        let text = serde_json::to_string(&req).unwrap();
        assert_eq!(
            text,
            r#"{"type":"scientific","expression":"sin(1) + 2","action":"calculate"}"#
        );
    }

    #[test]
    fn matrix_request_carries_data_and_action() {
        let req = CalcRequest::matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0]], MatrixAction::Det);
        let text = serde_json::to_string(&req).unwrap();
        assert_eq!(
            text,
            r#"{"type":"matrix","matrix_data":[[1.0,0.0],[0.0,1.0]],"action":"det"}"#
        );
    }

    #[test]
    fn scalar_results_deserialize() {
        let resp: CalcResponse =
            serde_json::from_str(r#"{"success":true,"result":42.5}"#).unwrap();
        assert_eq!(
            resp.into_result().unwrap(),
            CalcValue::Scalar(Scalar::Num(42.5))
        );
    }

    #[test]
    fn sequence_results_deserialize() {
        let resp: CalcResponse =
            serde_json::from_str(r#"{"success":true,"result":[1.0,"2",3.5]}"#).unwrap();
        let CalcValue::Row(row) = resp.into_result().unwrap() else {
            panic!("expected row");
        };
        assert_eq!(row.len(), 3);
        assert_eq!(row[1].to_number(), Some(2.0));

        let resp: CalcResponse =
            serde_json::from_str(r#"{"success":true,"result":[[1,0],[0,1]]}"#).unwrap();
        assert!(matches!(resp.into_result().unwrap(), CalcValue::Table(_)));
    }

    #[test]
    fn non_finite_strings_convert_to_numbers() {
        let inf: Scalar = serde_json::from_str(r#""Infinity""#).unwrap();
        assert_eq!(inf.to_number(), Some(Number::INFINITY));
        let neg: Scalar = serde_json::from_str(r#""-Infinity""#).unwrap();
        assert_eq!(neg.to_number(), Some(Number::NEG_INFINITY));
        let nan: Scalar = serde_json::from_str(r#""NaN""#).unwrap();
        assert!(nan.to_number().unwrap().is_nan());
        let word: Scalar = serde_json::from_str(r#""singular""#).unwrap();
        assert_eq!(word.to_number(), None);
    }

    #[test]
    fn failures_surface_the_service_error() {
        let resp: CalcResponse =
            serde_json::from_str(r#"{"success":false,"error":"Matrix is singular"}"#).unwrap();
        assert_eq!(
            resp.into_result().unwrap_err(),
            ComputeErr::Service("Matrix is singular".to_string())
        );
    }
}
