//! Human-readable text for history views and printed documents.

use chrono::Datelike;

use crate::parse::stored_date;

const MONTHS_SHORT: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const MONTHS_LONG: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

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

/// `1234.5` -> `"$1,234.50"`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// `12345` -> `"12,345"`.
pub fn format_number(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// History grid date: `"2024-01-05"` -> `"5 / ene / 2024"`. Unreadable text is echoed.
pub fn format_history_date(raw: &str) -> String {
    match stored_date(raw) {
        Some(d) => format!("{} / {} / {}", d.day(), MONTHS_SHORT[d.month0() as usize], d.year()),
        None => raw.to_string(),
    }
}

/// Quote list date: `"2024-01-05"` -> `"5 de enero de 2024"`.
pub fn format_quote_date(raw: &str) -> String {
    match stored_date(raw) {
        Some(d) => format!("{} de {} de {}", d.day(), MONTHS_LONG[d.month0() as usize], d.year()),
        None => raw.to_string(),
    }
}

pub fn production_time_label(days: i64) -> String {
    format!("{days} días naturales")
}

/// Colour family of a workflow label in the history grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    InProgress,
    Packing,
    Done,
    Neutral,
}

/// Classifies any status, payment or invoice label.
pub fn status_tone(label: &str) -> StatusTone {
    match label {
        "ELEGIR OPCION" | "PENDIENTE" | "POR PAGAR" => StatusTone::Pending,
        "EN PRODUCCIÓN" | "ANTICIPO" | "ADEUDO" | "SI PENDIENTE" => StatusTone::InProgress,
        "POR EMPACAR" => StatusTone::Packing,
        "ENTREGADO" | "PAGADO" | "FACTURADO" => StatusTone::Done,
        _ => StatusTone::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(237.8), "$237.80");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-5.5), "-$5.50");
    }

    #[test]
    fn numbers() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(12345), "12,345");
    }

    #[test]
    fn dates() {
        assert_eq!(format_history_date("2024-01-05"), "5 / ene / 2024");
        assert_eq!(format_quote_date("2024-09-30"), "30 de septiembre de 2024");
        assert_eq!(format_history_date(""), "");
        assert_eq!(format_history_date("mañana"), "mañana");
    }

    #[test]
    fn tones() {
        assert_eq!(status_tone("PENDIENTE"), StatusTone::Pending);
        assert_eq!(status_tone("EN PRODUCCIÓN"), StatusTone::InProgress);
        assert_eq!(status_tone("POR EMPACAR"), StatusTone::Packing);
        assert_eq!(status_tone("FACTURADO"), StatusTone::Done);
        assert_eq!(status_tone("SIN IVA"), StatusTone::Neutral);
    }
}
