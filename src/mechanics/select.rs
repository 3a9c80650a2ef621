/// Greedy selection over one step's candidate scores.

/// Winner of a step. `converged` means the no-op (index 0) won.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub index: usize,
    pub score: f64,
    pub converged: bool,
}

/// First minimum wins: scan in index order and only move on strict `<`,
/// so the no-op keeps any tie. NaN ranks below every number, so it can
/// never win over a real score. `None` for an empty slice.
pub fn select(scores: &[f64]) -> Option<Selection> {
    let (&first, rest) = scores.split_first()?;
    let (mut index, mut best) = (0, first);
    for (i, &s) in rest.iter().enumerate() {
        if s < best || (best.is_nan() && !s.is_nan()) {
            best = s;
            index = i + 1;
        }
    }
    Some(Selection { index, score: best, converged: index == 0 })
}
