pub mod granularity;
pub mod grid_layout;
pub mod life_periods;
pub mod models;
