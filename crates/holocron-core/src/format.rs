//! Display helpers for upstream string fields.

use chrono::{DateTime, NaiveDate};

/// Extract the numeric id from a resource URL such as
/// `https://swapi.dev/api/people/12/`.
pub fn person_id(url: &str) -> Option<u32> {
  let trimmed = url.strip_suffix('/')?;
  let (_, last) = trimmed.rsplit_once('/')?;
  if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  last.parse().ok()
}

/// Format an upstream timestamp as `dd-mm-yyyy`; `"N/A"` when missing or
/// unparseable.
pub fn format_date(raw: &str) -> String {
  let raw = raw.trim();
  if raw.is_empty() {
    return "N/A".into();
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.format("%d-%m-%Y").to_string();
  }
  match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    Ok(d) => d.format("%d-%m-%Y").to_string(),
    Err(_) => "N/A".into(),
  }
}

/// Format a population count with thousands separators.
///
/// Leading digits are used, so `"1000 (approx)"` still formats. Empty,
/// `"unknown"`, or non-numeric values become `"Unknown"`.
pub fn format_population(raw: &str) -> String {
  let raw = raw.trim();
  if raw.is_empty() || raw.eq_ignore_ascii_case("unknown") {
    return "Unknown".into();
  }
  let digits: String = raw.chars().take_while(char::is_ascii_digit).collect();
  if digits.is_empty() {
    return "Unknown".into();
  }
  let digits = digits.trim_start_matches('0');
  if digits.is_empty() {
    return "0".into();
  }
  group_thousands(digits)
}

/// Height in metres: `"172"` → `"1.72 m"`. Missing, `"unknown"`, or
/// non-numeric values become `"Unknown"`.
pub fn format_height(raw: &str) -> String {
  match known(raw)
    .and_then(|v| v.parse::<f64>().ok())
    .filter(|cm| cm.is_finite())
  {
    Some(cm) => format!("{:.2} m", cm / 100.0),
    None => "Unknown".into(),
  }
}

/// `"77"` → `"77 kg"`; missing or `"unknown"` becomes `"Unknown"`.
pub fn format_mass(raw: &str) -> String {
  match known(raw) {
    Some(kg) => format!("{kg} kg"),
    None => "Unknown".into(),
  }
}

fn known(raw: &str) -> Option<&str> {
  let raw = raw.trim();
  (!raw.is_empty() && !raw.eq_ignore_ascii_case("unknown")).then_some(raw)
}

fn group_thousands(digits: &str) -> String {
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}
