/// Formats an integer with comma thousands separators
///
/// # Examples
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// assert_eq!(format_number(0), "0");
/// ```
pub fn format_number(n: usize) -> String {
    group_digits(&n.to_string())
}

/// Money amount with two decimals and grouped thousands, e.g. `20,000.00`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, group_digits(int_part), frac_part)
}

fn group_digits(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(20000.0), "20,000.00");
        assert_eq!(format_amount(1234.567), "1,234.57");
        assert_eq!(format_amount(-45000.5), "-45,000.50");
    }
}
