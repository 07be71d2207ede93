use crate::domain::models::GridLayout;

pub const DEFAULT_EARLY_EXIT_SCORE: f64 = 3.0;

/// Squarest `cols x rows` grid holding exactly `cell_count` cells. A later
/// divisor pair replaces the best only when it scores strictly lower.
pub fn best_factorization(width: f64, height: f64, cell_count: usize) -> GridLayout {
    let mut best: Option<GridLayout> = None;
    let mut divisor = 1usize;
    while divisor <= cell_count / divisor {
        if cell_count % divisor == 0 {
            let quotient = cell_count / divisor;
            for (cols, rows) in [(divisor, quotient), (quotient, divisor)] {
                let candidate = candidate(width, height, cols, rows);
                if best.is_none_or(|current| candidate.score < current.score) {
                    best = Some(candidate);
                }
            }
        }
        divisor += 1;
    }
    best.unwrap_or_else(GridLayout::empty)
}

fn candidate(width: f64, height: f64, cols: usize, rows: usize) -> GridLayout {
    let cell_width = width / cols as f64;
    let cell_height = height / rows as f64;
    GridLayout {
        cell_width,
        cell_height,
        cols,
        rows,
        score: (cell_width - cell_height).abs(),
        slack_before: 0,
        slack_after: 0,
    }
}

pub fn default_search_window(base_cell_count: usize) -> usize {
    base_cell_count.div_ceil(10).max(1)
}

/// Best grid for any count in `base_cell_count..base_cell_count + window`.
/// Neighbours are skipped when the exact count scores below `early_exit_score`.
pub fn search_nearby(
    width: f64,
    height: f64,
    base_cell_count: usize,
    window: usize,
    early_exit_score: Option<f64>,
) -> GridLayout {
    let mut best = best_factorization(width, height, base_cell_count);
    if early_exit_score.is_some_and(|threshold| best.score < threshold) {
        return best;
    }
    for offset in 1..window {
        let candidate = best_factorization(width, height, base_cell_count.saturating_add(offset));
        if candidate.score < best.score {
            best = candidate;
        }
    }
    best
}
