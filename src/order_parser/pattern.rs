// src/order_parser/pattern.rs

use regex::Regex;
use std::sync::LazyLock;

/// Leading noise, a 4-6 digit code, a separator, then a 1-3 digit
/// quantity. The code group comes first and is greedy, so a 5-digit code
/// is never split into a quantity plus a code fragment.
static CODE_QTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^0-9]*([0-9]{4,6})[^0-9]+([0-9]{1,3})").expect("code/quantity pattern is valid")
});

/// A `(code, quantity)` pair pulled from the start of a pasted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeQty {
    pub code: String,
    pub quantity: u32,
}

/// Headers and other lines that can't be an order line.
pub fn is_noise(line: &str, header_phrases: &[String]) -> bool {
    if line.split_whitespace().nth(1).is_none() {
        return true;
    }
    let upper = line.to_uppercase();
    header_phrases
        .iter()
        .any(|p| !p.is_empty() && upper.contains(&p.to_uppercase()))
}

/// Match the code/quantity pattern anchored at the start of `line`.
pub fn extract_code_qty(line: &str) -> Option<CodeQty> {
    let caps = CODE_QTY_RE.captures(line)?;
    Some(CodeQty {
        code: caps[1].to_string(),
        quantity: caps[2].parse().ok()?,
    })
}
