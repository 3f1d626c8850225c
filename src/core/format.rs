//! Money and percentage rendering shared by alert messages and the CLI.

/// Formats a USD amount with grouping and up to two fraction digits,
/// dropping trailing zeros: `1234.5` -> `$1,234.5`, `-50` -> `-$50`.
pub fn format_currency(amount: f64) -> String {
    let mut body = format!("{:.2}", amount.abs());
    if body.contains('.') {
        let trimmed = body.trim_end_matches('0').trim_end_matches('.').len();
        body.truncate(trimmed);
    }
    let grouped = match body.find('.') {
        Some(pos) => format!("{}{}", group_digits(&body[..pos], ','), &body[pos..]),
        None => group_digits(&body, ','),
    };
    // `-0.001` rounds to zero and should not keep its sign
    if amount < 0.0 && grouped != "0" {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Rounds to a whole percent: `74.6` -> `75%`.
pub fn format_percentage(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
