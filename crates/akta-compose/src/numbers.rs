//! Number parsing shared by claim and input extraction.

/// Regex alternation of the number words [`parse_number`] understands.
/// Longer words come first so `forty-five` is not read as `forty`.
pub const NUMBER_WORDS: &str = "twenty-two|forty-five|forty-eight|fourteen|sixteen|eighteen|\
eleven|twelve|twenty|thirty|forty|sixty|one|two|three|four|five|six|seven|eight|nine|ten";

const WORD_VALUES: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("fourteen", 14.0),
    ("sixteen", 16.0),
    ("eighteen", 18.0),
    ("twenty", 20.0),
    ("twenty-two", 22.0),
    ("thirty", 30.0),
    ("forty", 40.0),
    ("forty-five", 45.0),
    ("forty-eight", 48.0),
    ("sixty", 60.0),
];

/// Parse `5,000`, `550.00`, `11` or a number word such as `six`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    if let Some((_, value)) = WORD_VALUES.iter().find(|(word, _)| *word == lower) {
        return Some(*value);
    }
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}
