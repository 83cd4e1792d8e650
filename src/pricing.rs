//! Price arithmetic shared by the cart snapshot and the checkout plan.
//!
//! All amounts are minor currency units. A line's unit price is the product's
//! base price plus the variant's modifier, or the base price alone when the
//! line has no variant.

/// A priced, quantified line the reductions below operate on.
pub trait PricedLine {
    fn base_price(&self) -> i64;
    fn price_modifier(&self) -> i64;
    fn quantity(&self) -> i32;
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

// Snapshot arithmetic saturates so a stored row can never make a cart read
// panic. Checkout prices through `checked_line` and refuses instead.

pub fn unit_price(base_price: i64, price_modifier: i64) -> i64 {
    base_price.saturating_add(price_modifier)
}

pub fn line_total(unit_price: i64, quantity: i32) -> i64 {
    unit_price.saturating_mul(i64::from(quantity))
}

pub fn item_count<L: PricedLine>(lines: &[L]) -> i64 {
    lines.iter().map(|line| i64::from(line.quantity())).sum()
}

pub fn cart_total<L: PricedLine>(lines: &[L]) -> i64 {
    lines.iter().fold(0_i64, |total, line| {
        total.saturating_add(line_total(
            unit_price(line.base_price(), line.price_modifier()),
            line.quantity(),
        ))
    })
}

/// `(unit_price, line_total)` for a line that can be charged: no overflow
/// and a unit price of at least zero.
pub fn checked_line(base_price: i64, price_modifier: i64, quantity: i32) -> Option<(i64, i64)> {
    let unit = base_price.checked_add(price_modifier)?;
    if unit < 0 {
        return None;
    }
    let total = unit.checked_mul(i64::from(quantity))?;
    Some((unit, total))
}

/// Payment providers only accept absolute http(s) image URLs.
pub fn is_absolute_http_url(candidate: &str) -> bool {
    let lower = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `"{color} {size}"` with missing parts dropped, `None` when nothing is left.
pub fn variant_label(color: Option<&str>, size: Option<&str>) -> Option<String> {
    let label = format!("{} {}", color.unwrap_or(""), size.unwrap_or(""));
    let label = label.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
