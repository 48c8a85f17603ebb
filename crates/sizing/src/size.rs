use crate::SizingError;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;
pub const TIB: u64 = 1024 * GIB;

/// Smallest file the generator produces.
pub const MIN_SIZE: u64 = MIB;

/// Largest file the generator produces.
pub const MAX_SIZE: u64 = TIB;

const UNITS: [(&str, u64); 4] = [("TiB", TIB), ("GiB", GIB), ("MiB", MIB), ("KiB", KIB)];

/// Parses a human size such as `500MB`, `1.5 GiB` or `4096`.
///
/// Units are binary and case-insensitive; fractional values round down to
/// whole bytes.
pub fn parse_size(text: &str) -> Result<u64, SizingError> {
    let trimmed = text.trim();
    let invalid = || SizingError::InvalidSize(text.to_string());

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(invalid());
    }

    let multiplier = unit_multiplier(unit.trim()).ok_or_else(invalid)?;

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.contains('.') || fraction.len() > 9 {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut bytes = whole
        .checked_mul(u128::from(multiplier))
        .ok_or_else(invalid)?;

    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().map_err(|_| invalid())?;
        let scale = 10u128.pow(fraction.len() as u32);
        bytes += digits * u128::from(multiplier) / scale;
    }

    u64::try_from(bytes).map_err(|_| invalid())
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        "t" | "tb" | "tib" => TIB,
        _ => return None,
    };
    Some(multiplier)
}

/// Rejects sizes outside [`MIN_SIZE`]..=[`MAX_SIZE`].
pub fn validate_size(bytes: u64) -> Result<u64, SizingError> {
    if (MIN_SIZE..=MAX_SIZE).contains(&bytes) {
        Ok(bytes)
    } else {
        Err(SizingError::OutOfBounds {
            bytes,
            min: MIN_SIZE,
            max: MAX_SIZE,
        })
    }
}

/// Formats a byte count with two decimals in the largest fitting unit.
pub fn format_size(bytes: u64) -> String {
    for (name, unit) in UNITS {
        if bytes >= unit {
            return format!("{:.2} {name}", bytes as f64 / unit as f64);
        }
    }
    format!("{bytes} B")
}

/// Compact label used in file names: `10MiB`, `1GiB`, or raw bytes when no
/// unit divides evenly.
pub fn size_label(bytes: u64) -> String {
    for (name, unit) in UNITS {
        if bytes >= unit && bytes % unit == 0 {
            return format!("{}{name}", bytes / unit);
        }
    }
    format!("{bytes}B")
}
