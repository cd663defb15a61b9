// SPDX: CC0-1.0

use crate::Number;

// non-finite values by name, integers bare, everything else with at most
// `places` decimals and trailing zeros stripped
pub fn format_number(num: Number, places: usize) -> String {
    if num.is_nan() {
        return "NaN".to_string();
    }
    if num.is_infinite() {
        return if num > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if num == 0.0 {
        return "0".to_string();
    }
    if num.fract() == 0.0 {
        return format!("{num}");
    }

    let fixed = format!("{num:.places$}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
