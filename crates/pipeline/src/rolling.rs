//! Centered rolling statistics with two-pass boundary gap filling.

/// Per-position rolling mean and sample standard deviation, fully defined
/// at every position of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Computes mean and sample standard deviation of `values` over a centered
/// window of `window_size` records.
///
/// For a window of size w the window at index i spans the w-1-(w-1)/2
/// records before i through the (w-1)/2 records after it, clipped to the
/// sequence bounds; even windows carry the extra record on the leading
/// side. Near-edge positions use whatever records the clipped window
/// holds. A position whose clipped window has a single record leaves its
/// standard deviation uncomputed; those gaps are closed by a backward
/// then forward fill, and a sequence where nothing could be computed at
/// all falls back to 0.0, so every position ends up defined.
#[must_use]
pub fn centered_stats(values: &[f64], window_size: usize) -> RollingStats {
    let n = values.len();
    if n == 0 {
        return RollingStats {
            mean: Vec::new(),
            std: Vec::new(),
        };
    }

    let window = window_size.max(1);
    let trailing = (window - 1) / 2;
    let leading = window - 1 - trailing;

    let mut mean: Vec<Option<f64>> = vec![None; n];
    let mut std: Vec<Option<f64>> = vec![None; n];
    for i in 0..n {
        let lo = i.saturating_sub(leading);
        let hi = (i + trailing).min(n - 1);
        let slice = &values[lo..=hi];

        mean[i] = Some(mean_of(slice));
        if slice.len() >= 2 {
            std[i] = Some(sample_std(slice));
        }
    }

    RollingStats {
        mean: fill_gaps(mean, 0.0),
        std: fill_gaps(std, 0.0),
    }
}

/// Closes gaps in an optional-statistics array with an explicit two-pass
/// fill: backward fill first (each gap takes the next computed value), then
/// forward fill for anything trailing the last computed value. The order
/// matters on very short sequences, where it decides which boundary value
/// wins. Positions with no computed value anywhere take `fallback`.
fn fill_gaps(mut values: Vec<Option<f64>>, fallback: f64) -> Vec<f64> {
    let mut next = None;
    for slot in values.iter_mut().rev() {
        match slot {
            Some(value) => next = Some(*value),
            None => *slot = next,
        }
    }

    let mut previous = None;
    for slot in values.iter_mut() {
        match slot {
            Some(value) => previous = Some(*value),
            None => *slot = previous,
        }
    }

    values
        .into_iter()
        .map(|slot| slot.unwrap_or(fallback))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_of(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Sample standard deviation (n-1 denominator); callers guarantee
/// `slice.len() >= 2`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn sample_std(slice: &[f64]) -> f64 {
    let mean = mean_of(slice);
    let sum_squares: f64 = slice.iter().map(|value| (value - mean).powi(2)).sum();
    (sum_squares / (slice.len() - 1) as f64).sqrt()
}
