use std::time::Duration;

use crate::{Error, Result};

/// Parse a duration string such as `30s`, `1m`, `1h30m` or `1.5h`
///
/// Accepts a sequence of decimal numbers, each followed by one of the units
/// `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. The result must be positive.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let invalid = |reason: &str| Error::InvalidInput(format!("invalid interval {:?}: {}", input, reason));

    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() || number == "." {
            return Err(invalid("expected a number"));
        }
        let value: f64 = number.parse().map_err(|_| invalid("malformed number"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let unit_nanos = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        };

        total_nanos += value * unit_nanos;
        rest = tail;
    }

    if total_nanos < 1.0 {
        return Err(invalid("must be greater than zero"));
    }
    if total_nanos > u64::MAX as f64 {
        return Err(invalid("too large"));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
