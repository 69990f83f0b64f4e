//! Pure calculation functions for fit-policy geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Content size for a `contain` fit.
///
/// Scales `source` uniformly by `min(target_w / src_w, target_h / src_h)` so
/// it fits entirely inside `target`. The result is rounded to whole pixels and
/// clamped to `1..=target` on each axis.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target box dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Scaled content dimensions (at least one matches target)
pub fn calculate_contain_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale_x = tgt_w as f64 / src_w as f64;
    let scale_y = tgt_h as f64 / src_h as f64;

    if scale_x <= scale_y {
        // Width is the limiting axis
        let h = (src_h as f64 * scale_x).round() as u32;
        (tgt_w, h.clamp(1, tgt_h))
    } else {
        let w = (src_w as f64 * scale_y).round() as u32;
        (w.clamp(1, tgt_w), tgt_h)
    }
}

/// Top-left offset that centers `content` inside `target`.
///
/// Odd remainders put the extra pixel on the right/bottom.
pub fn centered_offset(content: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        target.0.saturating_sub(content.0) / 2,
        target.1.saturating_sub(content.1) / 2,
    )
}
