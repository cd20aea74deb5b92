use regex::Regex;

/// Turns free-form price text into a number.
///
/// The rules are deliberately simple: everything except digits, `.`, `,`,
/// `-` and whitespace is dropped, whitespace is removed, the first `,` is
/// read as the decimal separator and the longest leading decimal number is
/// parsed. There is no currency awareness and no thousands-separator
/// disambiguation, so `"1,234.56"` reads as `1.234`.
pub struct PriceTracker {
    noise_regex: Regex,
    number_prefix_regex: Regex,
    text_scan_regex: Regex,
}

impl PriceTracker {
    pub fn new() -> Self {
        PriceTracker {
            noise_regex: Regex::new(r"[^0-9.,\-\s]").expect("static pattern"),
            number_prefix_regex: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").expect("static pattern"),
            text_scan_regex: Regex::new(r"[0-9][0-9 \u{a0}.,]{0,10}[0-9]").expect("static pattern"),
        }
    }

    /// Canonical numeric value of `text`, or `None` when nothing parses.
    pub fn normalize(&self, text: Option<&str>) -> Option<f64> {
        let text = text?;
        let kept = self.noise_regex.replace_all(text, "");
        let compact: String = kept.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }

        let decimal = compact.replacen(',', ".", 1);
        let number = self.number_prefix_regex.find(&decimal)?;
        number
            .as_str()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
    }

    /// First number-like run in `text`: a digit, up to ten digits, spaces or
    /// separators, then a digit. Last-resort source for a price when the
    /// structured lookup gives nothing usable.
    pub fn scan_text(&self, text: &str) -> Option<String> {
        self.text_scan_regex
            .find(text)
            .map(|m| m.as_str().to_string())
    }
}

impl Default for PriceTracker {
    fn default() -> Self {
        Self::new()
    }
}
