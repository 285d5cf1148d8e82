//! fixed quantization tables and the integer helpers built on them

/// clamped ratio in -8..=8 (index + 8) to 3-bit code
///
/// Resolution is finer near zero; even codes are positive, odd negative.
pub const QUANT_TAB: [u8; 17] = [
    7, 7, 7, 5, 5, 3, 3, 1, // -8..-1
    0, //  0
    0, 2, 2, 4, 4, 6, 6, 6, //  1..8
];

/// the 16 scalefactors, `round(pow(s + 1, 2.75))`
pub const SCALEFACTOR_TAB: [i32; 16] = [
    1, 7, 21, 45, 84, 138, 211, 304, 421, 562, 731, 928, 1157, 1419, 1715, 2048,
];

/// `((1 << 16) + scalefactor - 1) / scalefactor`
pub const RECIPROCAL_TAB: [i32; 16] = [
    65536, 9363, 3121, 1457, 781, 475, 311, 216, 156, 117, 90, 71, 57, 47, 39, 32,
];

/// scalefactor x code to signed residual
pub const DEQUANT_TAB: [[i32; 8]; 16] = [
    [1, -1, 3, -3, 5, -5, 7, -7],
    [5, -5, 18, -18, 32, -32, 49, -49],
    [16, -16, 53, -53, 95, -95, 147, -147],
    [34, -34, 113, -113, 203, -203, 315, -315],
    [63, -63, 210, -210, 378, -378, 588, -588],
    [104, -104, 345, -345, 621, -621, 966, -966],
    [158, -158, 528, -528, 950, -950, 1477, -1477],
    [228, -228, 760, -760, 1368, -1368, 2128, -2128],
    [316, -316, 1053, -1053, 1895, -1895, 2947, -2947],
    [422, -422, 1405, -1405, 2529, -2529, 3934, -3934],
    [548, -548, 1828, -1828, 3290, -3290, 5117, -5117],
    [696, -696, 2320, -2320, 4176, -4176, 6496, -6496],
    [868, -868, 2893, -2893, 5207, -5207, 8099, -8099],
    [1064, -1064, 3548, -3548, 6386, -6386, 9933, -9933],
    [1286, -1286, 4288, -4288, 7718, -7718, 12005, -12005],
    [1536, -1536, 5120, -5120, 9216, -9216, 14336, -14336],
];

/// code that the quantizer gives a zero residual
pub const QUANT_ZERO: u8 = QUANT_TAB[8];

#[inline]
fn sign(v: i32) -> i32 {
    (v > 0) as i32 - (v < 0) as i32
}

/// divide by a scalefactor via its reciprocal, rounding away from zero
///
/// The tie-break is part of the wire format.
#[inline]
pub fn div(v: i32, scalefactor: usize) -> i32 {
    let reciprocal = RECIPROCAL_TAB[scalefactor];
    let n = v.wrapping_mul(reciprocal).wrapping_add(1 << 15) >> 16;
    n + sign(v) - sign(n)
}

#[inline]
pub fn clamp_s16(v: i32) -> i32 {
    v.clamp(i16::MIN as i32, i16::MAX as i32)
}

/// residual to 3-bit code
#[inline]
pub fn quantize(residual: i32, scalefactor: usize) -> u8 {
    let scaled = div(residual, scalefactor);
    QUANT_TAB[(scaled.clamp(-8, 8) + 8) as usize]
}

#[inline]
pub fn dequantize(scalefactor: usize, code: u8) -> i32 {
    DEQUANT_TAB[scalefactor][code as usize]
}
