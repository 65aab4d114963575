use senselib_kernel::settings::DisplaySettings;
use time::format_description::{self, OwnedFormatItem};
use time::OffsetDateTime;

/// Date and amount formatting configured from [`DisplaySettings`].
#[derive(Debug, Clone)]
pub struct Formatter {
    date_format: Option<OwnedFormatItem>,
    currency_symbol: String,
    thousands_separator: String,
}

impl Formatter {
    pub fn new(settings: &DisplaySettings) -> Self {
        let date_format = match format_description::parse_owned::<1>(&settings.date_format) {
            Ok(format) => Some(format),
            Err(e) => {
                tracing::warn!(
                    pattern = %settings.date_format,
                    error = %e,
                    "invalid date format; using day/month/year"
                );
                None
            }
        };

        Self {
            date_format,
            currency_symbol: settings.currency_symbol.clone(),
            thousands_separator: settings.thousands_separator.clone(),
        }
    }

    pub fn format_date(&self, at: OffsetDateTime) -> String {
        self.date_format
            .as_ref()
            .and_then(|format| at.format(format).ok())
            .unwrap_or_else(|| {
                format!("{:02}/{:02}/{}", at.day(), u8::from(at.month()), at.year())
            })
    }

    /// `-` for a missing date.
    pub fn format_optional_date(&self, at: Option<OffsetDateTime>) -> String {
        at.map(|at| self.format_date(at))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Whole currency units grouped by thousands, symbol last: `1.250.000 ₫`.
    pub fn format_currency(&self, amount: i64) -> String {
        let digits = amount.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousands_separator);
            }
            grouped.push(digit);
        }

        let sign = if amount < 0 { "-" } else { "" };
        format!("{}{} {}", sign, grouped, self.currency_symbol)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&DisplaySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(timestamp).unwrap()
    }

    #[test]
    fn dates_use_the_configured_pattern() {
        let formatter = Formatter::default();
        // 2024-03-05T10:00:00Z
        assert_eq!(formatter.format_date(at(1_709_632_800)), "05/03/2024");
        assert_eq!(formatter.format_optional_date(None), "-");

        let iso = Formatter::new(&DisplaySettings {
            date_format: "[year]-[month]-[day]".to_string(),
            ..DisplaySettings::default()
        });
        assert_eq!(iso.format_date(at(1_709_632_800)), "2024-03-05");
    }

    #[test]
    fn invalid_pattern_falls_back() {
        let formatter = Formatter::new(&DisplaySettings {
            date_format: "[nonsense".to_string(),
            ..DisplaySettings::default()
        });
        assert_eq!(formatter.format_date(at(1_709_632_800)), "05/03/2024");
    }

    #[test]
    fn currency_groups_thousands() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format_currency(0), "0 ₫");
        assert_eq!(formatter.format_currency(999), "999 ₫");
        assert_eq!(formatter.format_currency(1_000), "1.000 ₫");
        assert_eq!(formatter.format_currency(1_250_000), "1.250.000 ₫");
        assert_eq!(formatter.format_currency(-45_500), "-45.500 ₫");

        let usd = Formatter::new(&DisplaySettings {
            date_format: "[day]/[month]/[year]".to_string(),
            currency_symbol: "USD".to_string(),
            thousands_separator: ",".to_string(),
        });
        assert_eq!(usd.format_currency(12_345_678), "12,345,678 USD");
    }
}
