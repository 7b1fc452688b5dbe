//! Human-readable renderings of nullable figures.

pub const PLACEHOLDER: &str = "–";
pub const NOT_AVAILABLE: &str = "N/A";

pub fn fmt(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.decimals$}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// `12.3 B`, `4.5 M`, or the plain value with thousands separators.
pub fn format_number(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    if v.abs() >= 1_000_000_000.0 {
        return format!("{:.1} B", v / 1_000_000_000.0);
    }
    if v.abs() >= 1_000_000.0 {
        return format!("{:.1} M", v / 1_000_000.0);
    }
    group_thousands(v)
}

pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.1} %"),
        None => NOT_AVAILABLE.to_string(),
    }
}

// Up to three fraction digits, trailing zeros dropped.
fn group_thousands(v: f64) -> String {
    let s = format!("{:.3}", v.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i != 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_uses_placeholder_for_missing() {
        assert_eq!(fmt(Some(3.14159), 2), "3.14");
        assert_eq!(fmt(Some(2.0), 1), "2.0");
        assert_eq!(fmt(None, 1), "–");
        assert_eq!(fmt(Some(f64::NAN), 1), "–");
    }

    #[test]
    fn numbers_scale_to_billions_and_millions() {
        assert_eq!(format_number(Some(43_480_000_000.0)), "43.5 B");
        assert_eq!(format_number(Some(-2_500_000_000.0)), "-2.5 B");
        assert_eq!(format_number(Some(12_340_000.0)), "12.3 M");
        assert_eq!(format_number(None), "N/A");
    }

    #[test]
    fn small_numbers_are_grouped() {
        assert_eq!(format_number(Some(999_999.0)), "999,999");
        assert_eq!(format_number(Some(1234.5)), "1,234.5");
        assert_eq!(format_number(Some(12.0)), "12");
        assert_eq!(format_number(Some(-4321.25)), "-4,321.25");
        assert_eq!(format_number(Some(0.0)), "0");
    }

    #[test]
    fn percents() {
        assert_eq!(format_percent(Some(12.345)), "12.3 %");
        assert_eq!(format_percent(Some(-0.04)), "-0.0 %");
        assert_eq!(format_percent(None), "N/A");
    }
}
