use finscore_core::domain::company::Company;
use finscore_core::format::{fmt, format_number, format_percent};
use finscore_core::scoring::score_company;
use std::fmt::Write;

pub fn score_table(companies: &[Company]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<24} {:<24} {:>10} {:>12} {:>9} {:>9} {:>8}  {}",
        "SYMBOL", "NAME", "SECTOR", "PRICE", "REVENUE", "MARGIN", "GROWTH", "SCORE", "MISSING"
    );

    for c in companies {
        let outcome = score_company(c);
        let missing = outcome
            .missing()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(
            out,
            "{:<10} {:<24} {:<24} {:>10} {:>12} {:>9} {:>9} {:>8}  {}",
            c.symbol,
            clip(&c.name, 24),
            clip(&c.sector, 24),
            fmt(c.price, 2),
            format_number(c.revenue),
            format_percent(c.ebitda_margin),
            format_percent(c.growth),
            outcome.to_string(),
            missing
        );
    }
    out
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
