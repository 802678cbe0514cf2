//! Indian Rupee formatting for user-facing messages and exports.

use super::amount::AmountType;

/// Format with the rupee symbol, e.g. `₹ 1,00,000.00`
pub fn format_inr<A: AmountType>(amount: A) -> String {
    format!("₹ {}", format_inr_plain(amount))
}

/// Indian digit grouping (last three digits, then pairs) with two decimals
pub fn format_inr_plain<A: AmountType>(amount: A) -> String {
    let text = amount.to_decimal_string();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (whole, fraction) = text.split_once('.').unwrap_or((text, "0"));
    let whole: u64 = whole.parse().unwrap_or(0);
    let fraction: u64 = format!("{:0<4}", fraction)[..4].parse().unwrap_or(0);

    // Half-up rounding from four decimals to two
    let cents = whole * 100 + (fraction + 50) / 100;
    let grouped = group_indian(&(cents / 100).to_string());

    let sign = if negative && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
