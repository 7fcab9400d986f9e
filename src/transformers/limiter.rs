//! Numeric range enforcement for integer transformers.

use std::fmt;

use crate::error::{MaskingError, MaskingResult};
use crate::parameters::{ValidationWarning, ValidationWarnings};

/// Storage width of a fixed-width integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    Int2,
    Int4,
    Int8,
}

impl IntWidth {
    /// Maps a column storage length to a width; `-1` (variable/unknown) falls back to 8 bytes.
    pub fn from_length(length: i32) -> MaskingResult<Self> {
        match length {
            -1 | 8 => Ok(Self::Int8),
            4 => Ok(Self::Int4),
            2 => Ok(Self::Int2),
            other => Err(MaskingError::UnsupportedIntSize(other)),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Int2 => 2,
            Self::Int4 => 4,
            Self::Int8 => 8,
        }
    }

    /// Inclusive signed range representable in this width.
    pub fn thresholds(self) -> (i64, i64) {
        match self {
            Self::Int2 => (i16::MIN as i64, i16::MAX as i64),
            Self::Int4 => (i32::MIN as i64, i32::MAX as i64),
            Self::Int8 => (i64::MIN, i64::MAX),
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int{}", self.bytes())
    }
}

/// Inclusive `[min, max]` bound on generated values for one integer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int64Limiter {
    min: i64,
    max: i64,
    width: IntWidth,
}

impl Int64Limiter {
    /// Fails if `min > max` or either bound lies outside the width's range.
    pub fn new(min: i64, max: i64, width: IntWidth) -> MaskingResult<Self> {
        if min > max {
            return Err(MaskingError::InvalidLimits {
                min,
                max,
                message: "min value is greater than max value".to_string(),
            });
        }
        let (lo, hi) = width.thresholds();
        if min < lo || max > hi {
            return Err(MaskingError::InvalidLimits {
                min,
                max,
                message: format!("limits exceed the {width} range [{lo}, {hi}]"),
            });
        }
        Ok(Self { min, max, width })
    }

    /// The full signed range of `width`.
    pub fn full_range(width: IntWidth) -> Self {
        let (min, max) = width.thresholds();
        Self { min, max, width }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn width(&self) -> IntWidth {
        self.width
    }

    fn span(&self) -> u128 {
        (self.max as i128 - self.min as i128) as u128 + 1
    }

    /// Maps raw generator output into `[min, max]` with a single draw.
    ///
    /// Deterministic in `raw`. Values below `2^64 % span` are folded onto the low end of the
    /// range, so callers that can redraw should use [`Self::limit_unbiased`].
    pub fn limit(&self, raw: u64) -> i64 {
        let span = self.span();
        if span > u64::MAX as u128 {
            return raw as i64;
        }
        (self.min as i128 + (raw as u128 % span) as i128) as i64
    }

    /// Like [`Self::limit`], but `None` when `raw` falls in the leftover zone above the last
    /// whole multiple of the span. Accepted values are uniform over `[min, max]`.
    ///
    /// At most half of all `u64` values are rejected.
    pub fn limit_unbiased(&self, raw: u64) -> Option<i64> {
        let span = self.span();
        if span > u64::MAX as u128 {
            return Some(raw as i64);
        }
        let accepted = (1u128 << 64) - (1u128 << 64) % span;
        ((raw as u128) < accepted).then(|| self.limit(raw))
    }
}

/// A requested threshold is usable if it lies within the width's range.
pub fn limit_is_valid(requested: i64, min_value: i64, max_value: i64) -> bool {
    requested >= min_value && requested <= max_value
}

/// Validation finding for a requested threshold outside the width's range, if any.
pub fn threshold_warning(width: IntWidth, parameter: &str, requested: i64) -> Option<ValidationWarning> {
    let (lo, hi) = width.thresholds();
    if limit_is_valid(requested, lo, hi) {
        return None;
    }
    Some(
        ValidationWarning::error(format!("requested {parameter} value is out of {width} range"))
            .with_meta("AllowedMinValue", lo)
            .with_meta("AllowedMaxValue", hi)
            .with_meta("ParameterName", parameter)
            .with_meta("ParameterValue", requested),
    )
}

/// Builds the limiter for statically configured thresholds.
///
/// `(0, 0)` selects the full range of `width`. Out-of-range thresholds produce a fatal
/// [`ValidationWarnings`] and no limiter; an inverted range is an error.
pub fn validate_int_limits(
    width: IntWidth,
    requested_min: i64,
    requested_max: i64,
) -> MaskingResult<(Option<Int64Limiter>, ValidationWarnings)> {
    let mut warns = ValidationWarnings::new();
    for (name, value) in [("min", requested_min), ("max", requested_max)] {
        if let Some(w) = threshold_warning(width, name, value) {
            warns.push(w);
        }
    }
    if warns.is_fatal() {
        return Ok((None, warns));
    }
    Ok((Some(requested_limiter(width, requested_min, requested_max)?), warns))
}

/// Builds the limiter for thresholds read from a record.
///
/// Same rules as [`validate_int_limits`], but out-of-range thresholds are per-row errors.
pub fn dynamic_int_limiter(width: IntWidth, requested_min: i64, requested_max: i64) -> MaskingResult<Int64Limiter> {
    let (lo, hi) = width.thresholds();
    for (name, value) in [("min", requested_min), ("max", requested_max)] {
        if !limit_is_valid(value, lo, hi) {
            return Err(MaskingError::parameter(
                name,
                format!("requested dynamic parameter {name} value {value} is out of range of {width} size"),
            ));
        }
    }
    requested_limiter(width, requested_min, requested_max)
}

fn requested_limiter(width: IntWidth, requested_min: i64, requested_max: i64) -> MaskingResult<Int64Limiter> {
    if requested_min == 0 && requested_max == 0 {
        return Ok(Int64Limiter::full_range(width));
    }
    Int64Limiter::new(requested_min, requested_max, width)
}
