pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Linear interpolation `a*(1-t) + b*t`, rounded to the nearest channel value.
pub(crate) fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let t = t.clamp(0.0, 1.0);
    (f64::from(a) * (1.0 - t) + f64::from(b) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Source-over blend of a straight-alpha `src` onto a straight-alpha `dst` pixel in place.
pub(crate) fn blend_over_straight(dst: &mut [u8], src: [u8; 4]) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    if sa == 255 {
        dst.copy_from_slice(&src);
        return;
    }

    let da = u32::from(dst[3]);
    // out_a = sa + da * (1 - sa), all in 0..=255 fixed point (scaled by 255).
    let da_scaled = da * (255 - sa);
    let out_a_255 = sa * 255 + da_scaled;
    if out_a_255 == 0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }

    for c in 0..3 {
        let s = u32::from(src[c]) * sa * 255;
        let d = u32::from(dst[c]) * da_scaled;
        dst[c] = ((s + d + out_a_255 / 2) / out_a_255).min(255) as u8;
    }
    dst[3] = ((out_a_255 + 127) / 255).min(255) as u8;
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
