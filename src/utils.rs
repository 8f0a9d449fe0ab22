use crate::error::{FactResolverError, Result};
use crate::grid::Cell;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A reporting period: one calendar month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(FactResolverError::InvalidMonth(month));
    }
    Ok(())
}

pub fn month_abbreviation(month: u32) -> &'static str {
    const DISPLAY: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    DISPLAY
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

/// Maps a column header to a month by substring match. Full names are tried
/// before abbreviations so that `"June"` never resolves through `"jun"` to a
/// different entry.
pub fn month_from_header(header: &str) -> Option<u32> {
    let lowered = header.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| lowered.contains(name))
        .or_else(|| {
            MONTH_ABBREVIATIONS
                .iter()
                .position(|abbr| lowered.contains(abbr))
        })
        .map(|idx| idx as u32 + 1)
}

/// Maps a single whole word (already lower-cased) to a month.
pub fn month_from_word(word: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|name| *name == word)
        .or_else(|| {
            MONTH_ABBREVIATIONS
                .iter()
                .position(|abbr| *abbr == word || (word == "sept" && *abbr == "sep"))
        })
        .map(|idx| idx as u32 + 1)
}

/// Converts an Excel serial day number (1900 date system) into a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parses a report date out of a metadata cell. Accepts native dates, Excel
/// serial numbers and the textual forms commonly typed into report headers.
pub fn parse_period_cell(cell: &Cell) -> Option<Period> {
    match cell {
        Cell::Date(d) => Some(Period::from_date(*d)),
        Cell::Number(n) => excel_serial_to_date(*n).map(Period::from_date),
        Cell::Text(s) => parse_period_text(s),
        _ => None,
    }
}

pub fn parse_period_text(raw: &str) -> Option<Period> {
    let first_line = raw.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return None;
    }

    // Timestamps such as "2024-06-30 00:00:00" carry the date in front.
    let head = first_line.split_whitespace().next().unwrap_or(first_line);
    for candidate in [first_line, head] {
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
                return Some(Period::from_date(date));
            }
        }
    }

    // "Jun 2024", "June 2024", "Jun-24"
    let normalized = first_line.replace(['-', '/', ','], " ");
    let mut words = normalized.split_whitespace();
    let month = month_from_word(&words.next()?.to_lowercase())?;
    let year_text = words.next()?;
    let year: i32 = year_text.parse().ok()?;
    let year = match year_text.len() {
        2 => 2000 + year,
        4 => year,
        _ => return None,
    };
    Some(Period { year, month })
}

/// Returns the calendar year a time-series column belongs to, given the
/// report period and the first month of the fiscal year.
///
/// # Examples
/// - Fiscal year starting in April, report date June 2024: Apr..Dec map to
///   2024 and Jan..Mar map to 2025.
/// - Calendar fiscal year (start month 1): every month maps to the report year.
pub fn fiscal_calendar_year(report: Period, fiscal_start_month: u32, column_month: u32) -> i32 {
    let fiscal_year_start = if report.month >= fiscal_start_month {
        report.year
    } else {
        report.year - 1
    };

    if column_month >= fiscal_start_month {
        fiscal_year_start
    } else {
        fiscal_year_start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_from_header() {
        assert_eq!(month_from_header("Apr"), Some(4));
        assert_eq!(month_from_header("  June 2024"), Some(6));
        assert_eq!(month_from_header("Sept"), Some(9));
        assert_eq!(month_from_header("Bal B/F"), None);
        assert_eq!(month_from_header("Total"), None);
    }

    #[test]
    fn test_parse_period_text() {
        assert_eq!(
            parse_period_text("2024-06-30"),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(
            parse_period_text("30/06/2024"),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(
            parse_period_text("2024-06-30 00:00:00"),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(
            parse_period_text("June 2024"),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(
            parse_period_text("Jun-24"),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(parse_period_text("not a date"), None);
    }

    #[test]
    fn test_parse_period_cell_serial() {
        // 45473 is 2024-06-30 in the 1900 date system.
        assert_eq!(
            parse_period_cell(&Cell::Number(45473.0)),
            Some(Period { year: 2024, month: 6 })
        );
        assert_eq!(parse_period_cell(&Cell::Empty), None);
    }

    #[test]
    fn test_fiscal_calendar_year() {
        let report = Period { year: 2024, month: 6 };
        assert_eq!(fiscal_calendar_year(report, 4, 4), 2024);
        assert_eq!(fiscal_calendar_year(report, 4, 12), 2024);
        assert_eq!(fiscal_calendar_year(report, 4, 3), 2025);
        assert_eq!(fiscal_calendar_year(report, 1, 3), 2024);

        let early = Period { year: 2025, month: 2 };
        assert_eq!(fiscal_calendar_year(early, 4, 5), 2024);
        assert_eq!(fiscal_calendar_year(early, 4, 2), 2025);
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }
}
