//! Nearest-target acquisition.

use glam::Vec2;

use astroblitz_core::types::Rect;

/// Pick the candidate closest to `origin` among those inside `region`.
///
/// Ties resolve to the first candidate encountered; beyond that the
/// order is whatever the caller iterates in (implementation-defined).
/// Populations change every frame, so callers must re-run this every
/// tick rather than cache the result.
pub fn find_nearest<T>(
    origin: Vec2,
    region: &Rect,
    candidates: impl IntoIterator<Item = (T, Vec2)>,
) -> Option<T> {
    let mut best: Option<(T, f32)> = None;
    for (id, pos) in candidates {
        if !region.contains(pos) {
            continue;
        }
        let dist = origin.distance_squared(pos);
        match &best {
            Some((_, d)) if dist >= *d => {}
            _ => best = Some((id, dist)),
        }
    }
    best.map(|(id, _)| id)
}
