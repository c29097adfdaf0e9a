//! Human-readable quantities

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFormat {
    /// Full value with thousands separators: `1,234,567`.
    Long,
    /// Abbreviated by digit count: `12.35K`, `1.23M`.
    Short,
}

fn group_thousands(quantity: u64) -> String {
    let digits = quantity.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn format_quantity(quantity: u64, format: QuantityFormat) -> String {
    match format {
        QuantityFormat::Long => group_thousands(quantity),
        QuantityFormat::Short => {
            let length = quantity.to_string().len();
            let value = quantity as f64;
            // Six to eight digits all render in millions.
            if length < 5 {
                group_thousands(quantity)
            } else if length == 5 {
                format!("{:.2}K", value / 1e3)
            } else if length < 9 {
                format!("{:.2}M", value / 1e6)
            } else if length < 12 {
                format!("{:.2}B", value / 1e9)
            } else if length < 15 {
                format!("{:.2}T", value / 1e12)
            } else {
                format!("{:.2}Q", value / 1e15)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_form_groups_thousands() {
        assert_eq!(format_quantity(0, QuantityFormat::Long), "0");
        assert_eq!(format_quantity(999, QuantityFormat::Long), "999");
        assert_eq!(format_quantity(1000, QuantityFormat::Long), "1,000");
        assert_eq!(format_quantity(1234567, QuantityFormat::Long), "1,234,567");
    }

    #[test]
    fn short_form_scales_by_digit_count() {
        assert_eq!(format_quantity(9999, QuantityFormat::Short), "9,999");
        assert_eq!(format_quantity(12346, QuantityFormat::Short), "12.35K");
        assert_eq!(format_quantity(123456, QuantityFormat::Short), "0.12M");
        assert_eq!(format_quantity(32000000, QuantityFormat::Short), "32.00M");
        assert_eq!(format_quantity(4_200_000_000, QuantityFormat::Short), "4.20B");
        assert_eq!(format_quantity(7_000_000_000_000, QuantityFormat::Short), "7.00T");
        assert_eq!(format_quantity(1_500_000_000_000_000, QuantityFormat::Short), "1.50Q");
    }
}
