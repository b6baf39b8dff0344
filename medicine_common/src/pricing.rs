//! Price arithmetic shared by every offer and purchase

/// Round a monetary amount to 2 decimal places (half away from zero)
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Price after discount: `mrp * (1 - discount_percent / 100)`, rounded to cents.
///
/// Callers pass validated input (`0 <= discount_percent <= 100`, `mrp >= 0`),
/// so the result never exceeds `mrp`.
pub fn final_price(mrp: f64, discount_percent: f64) -> f64 {
    round_to_cents(mrp * (1.0 - discount_percent / 100.0))
}

/// Amount saved against the printed MRP
pub fn mrp_savings(mrp: f64, final_price: f64) -> f64 {
    round_to_cents(mrp - final_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_off_hundred_is_ninety() {
        assert_eq!(final_price(100.0, 10.0), 90.00);
    }

    #[test]
    fn no_discount_keeps_mrp() {
        assert_eq!(final_price(42.5, 0.0), 42.5);
    }

    #[test]
    fn full_discount_is_free() {
        assert_eq!(final_price(80.0, 100.0), 0.0);
    }

    #[test]
    fn final_price_rounds_to_two_decimals() {
        // 33.33 * 0.875 = 29.163750
        assert_eq!(final_price(33.33, 12.5), 29.16);
        // 19.99 * 0.925 = 18.49075
        assert_eq!(final_price(19.99, 7.5), 18.49);
    }

    #[test]
    fn final_price_never_exceeds_mrp() {
        for discount in [0.0, 2.5, 5.0, 7.5, 10.0, 12.5, 15.0, 99.9] {
            for mrp in [0.01, 1.0, 13.37, 250.0, 599.99] {
                assert!(final_price(mrp, discount) <= mrp);
            }
        }
    }

    #[test]
    fn round_to_cents_handles_negatives() {
        assert_eq!(round_to_cents(-5.004), -5.0);
        assert_eq!(round_to_cents(-5.006), -5.01);
    }

    #[test]
    fn mrp_savings_is_difference() {
        assert_eq!(mrp_savings(100.0, 90.0), 10.0);
        assert_eq!(mrp_savings(12.0, 12.0), 0.0);
    }
}
