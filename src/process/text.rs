use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `<weekday> <Month> <day> <year>` anywhere inside a cell fragment.
static DATE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\w+\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+([0-9]{1,2})\s+([0-9]{4})",
    )
    .expect("date phrase regex should compile")
});

/// A "Month Day Year" remainder that names a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePhrase {
    /// The matched text with its leading weekday word removed.
    pub remainder: String,
    pub date: NaiveDate,
}

/// Lower-case everything, then upper-case the first letter of every
/// space-separated word. ASCII only.
pub fn title_case(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Scan `s` for a dated phrase such as "Wed October 2 2025".
/// Returns `None` when the pattern is absent or names a day that does not exist.
pub fn extract_date_phrase(s: &str) -> Option<DatePhrase> {
    let caps = DATE_PHRASE.captures(s)?;
    let whole = caps.get(0)?;
    let month_name = caps.get(1)?;

    let month = MONTHS.iter().position(|m| *m == month_name.as_str())? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    Some(DatePhrase {
        remainder: s[month_name.start()..whole.end()].to_string(),
        date,
    })
}

/// "October 2025" for any date in October 2025.
pub fn month_label(phrase: &DatePhrase) -> String {
    phrase.date.format("%B %Y").to_string()
}

/// Calendar date named by a raw availability fragment, if any.
pub fn show_date(s: &str) -> Option<NaiveDate> {
    extract_date_phrase(s).map(|p| p.date)
}

/// Month label of a raw availability fragment, if it names a real date.
pub fn fragment_month(s: &str) -> Option<String> {
    extract_date_phrase(s).map(|p| month_label(&p))
}
