// src/utils/fixed_point.rs
/// Nodata sentinel for float32 output.
pub const NODATA_VALUE_FLOAT: f32 = -999.0;
/// Nodata sentinel for scaled int16 output.
pub const NODATA_VALUE_INT: i16 = -10000;

/// Replace non-finite pixels with the float nodata sentinel.
pub fn to_float_output(data: &[f32]) -> Vec<f32> {
    data.iter()
        .map(|&value| if value.is_finite() { value } else { NODATA_VALUE_FLOAT })
        .collect()
}

/// Scale to int16. Non-finite pixels become `nodata_value`; everything else is
/// clamped to the int16 range strictly above the sentinel.
pub fn to_fixed_point(data: &[f32], scale_factor: i32, nodata_value: i16) -> Vec<i16> {
    let low = nodata_value as f32 + 1.0;
    data.iter()
        .map(|&value| {
            if !value.is_finite() {
                nodata_value
            } else {
                (value * scale_factor as f32).round().clamp(low, i16::MAX as f32) as i16
            }
        })
        .collect()
}

/// Number of finite pixels that `to_fixed_point` would clamp.
pub fn count_saturated(data: &[f32], scale_factor: i32, nodata_value: i16) -> usize {
    let low = nodata_value as f32 + 1.0;
    data.iter()
        .filter(|value| value.is_finite())
        .map(|&value| (value * scale_factor as f32).round())
        .filter(|&scaled| scaled < low || scaled > i16::MAX as f32)
        .count()
}
