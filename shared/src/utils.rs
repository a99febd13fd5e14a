// Locale helpers shared by the engine and any UI front-end.

// Brazilian number handling: "1.234,56" style input and "R$ 1.234,56" output.
pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    // Strips currency symbols and whitespace, then resolves which separator is
    // the decimal one. Returns None when nothing numeric is left.
    fn normalize(raw: &str) -> Option<String> {
        let cleaned: String = raw
            .replace("R$", "")
            .replace('$', "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let (sign, body) = match cleaned.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", cleaned.strip_prefix('+').unwrap_or(cleaned.as_str())),
        };

        if !body.chars().any(|c| c.is_ascii_digit())
            || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return None;
        }

        let has_dot = body.contains('.');
        let has_comma = body.contains(',');
        let number = match (has_dot, has_comma) {
            // "1.234,56": dots group thousands, comma is the decimal separator
            (true, true) => body.replace('.', "").replace(',', "."),
            (false, true) => body.replace(',', "."),
            // "1.234.567" can only be thousands grouping
            (true, false) if body.matches('.').count() > 1 => body.replace('.', ""),
            _ => body.to_string(),
        };

        Some(format!("{}{}", sign, number))
    }

    /// Strict parse of a locale-formatted number.
    pub fn try_parse_decimal(s: &str) -> Result<f64> {
        let normalized = normalize(s).ok_or_else(|| anyhow!("Failed to parse decimal '{}': not a number", s))?;
        let value = f64::from_str(&normalized).map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Failed to parse decimal '{}': value is not finite", s));
        }
        Ok(value)
    }

    /// Permissive parse for form fields: anything unparseable reads as `0.0`.
    pub fn parse_input_value(raw: &str) -> f64 {
        try_parse_decimal(raw).unwrap_or(0.0)
    }

    pub fn parse_optional_input(raw: Option<&str>) -> f64 {
        raw.map(parse_input_value).unwrap_or(0.0)
    }

    // Formats with '.' thousands grouping and ',' as decimal separator.
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        let fixed = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (int_part.len() - idx) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };
        match frac_part {
            Some(frac) => format!("{}{},{}", sign, grouped, frac),
            None => format!("{}{}", sign, grouped),
        }
    }

    pub fn format_currency(value: f64) -> String {
        let formatted = format_decimal(value, 2);
        match formatted.strip_prefix('-') {
            Some(abs) => format!("-R$ {}", abs),
            None => format!("R$ {}", formatted),
        }
    }

    pub fn format_percent(value: f64, decimals: usize) -> String {
        format!("{}%", format_decimal(value, decimals))
    }

}
