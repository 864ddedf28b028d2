/// Parse a displayed price such as `"₹1,234"` into `1234`.
///
/// Text without `marker` is not a price. After removing every marker and
/// thousands separator the remainder must be plain ASCII digits; ranges,
/// decorated strings and values that overflow `u64` are rejected.
pub fn parse_price(text: &str, marker: &str) -> Option<u64> {
    let text = text.trim();
    if marker.is_empty() || !text.contains(marker) {
        return None;
    }

    let amount = text.replace(marker, "").replace(',', "");
    let amount = amount.trim();
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    amount.parse().ok()
}
