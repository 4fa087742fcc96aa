//! Display formatting for amounts and counts.
//!
//! This is the only place amounts are rounded. Stored values are never
//! touched.

use crate::{config::FormatConfig, types::Amount};

/// Round half up to a whole currency unit (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(amount: Amount) -> Amount {
    let floor = amount.floor();
    // Compare the fraction rather than adding 0.5, which can round up
    // values just below one half.
    let rounded = if amount - floor >= 0.5 { floor + 1.0 } else { floor };
    // Keep "-0" out of the display.
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatConfig,
}

impl Formatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    /// "1,234,568원". Negative values keep their sign.
    pub fn currency(&self, amount: Amount) -> String {
        format!("{}{}", self.grouped(round_half_up(amount)), self.config.currency_suffix)
    }

    /// "-1,500원", or "0원" when the rounded amount is zero.
    pub fn deduction(&self, amount: Amount) -> String {
        let rounded = round_half_up(amount);
        if rounded == 0.0 {
            return self.currency(0.0);
        }
        format!("-{}{}", self.grouped(rounded.abs()), self.config.currency_suffix)
    }

    /// Commission and lease style fields: shown as a deduction only when positive.
    pub fn deduction_field(&self, amount: Amount) -> String {
        if amount > 0.0 {
            self.deduction(amount)
        } else {
            self.currency(0.0)
        }
    }

    /// "1,024건".
    pub fn count(&self, count: u64) -> String {
        format!("{}{}", self.group_digits(&count.to_string()), self.config.count_suffix)
    }

    /// Plain grouped number with no suffix, for tables.
    pub fn number(&self, amount: Amount) -> String {
        self.grouped(round_half_up(amount))
    }

    fn grouped(&self, whole: Amount) -> String {
        let value = whole as i128;
        let digits = self.group_digits(&value.unsigned_abs().to_string());
        if value < 0 {
            format!("-{digits}")
        } else {
            digits
        }
    }

    fn group_digits(&self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.config.group_separator);
            }
            out.push(c);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> Formatter {
        Formatter::default()
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-0.4), 0.0);
        assert!(round_half_up(-0.4).is_sign_positive());
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(fmt().currency(0.0), "0원");
        assert_eq!(fmt().currency(999.0), "999원");
        assert_eq!(fmt().currency(1000.0), "1,000원");
        assert_eq!(fmt().currency(1_234_567.5), "1,234,568원");
        assert_eq!(fmt().currency(-98_535.2), "-98,535원");
    }

    #[test]
    fn deductions_carry_a_minus_sign() {
        assert_eq!(fmt().deduction(1500.0), "-1,500원");
        assert_eq!(fmt().deduction(0.4), "0원");
        assert_eq!(fmt().deduction(0.49999999999999994), "0원");
        assert_eq!(fmt().deduction_field(0.0), "0원");
        assert_eq!(fmt().deduction_field(200.0), "-200원");
    }

    #[test]
    fn counts_use_their_own_suffix() {
        assert_eq!(fmt().count(1024), "1,024건");
        assert_eq!(fmt().count(7), "7건");
        assert_eq!(fmt().number(3465.0000001), "3,465");
    }
}
