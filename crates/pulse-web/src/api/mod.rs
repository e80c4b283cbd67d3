pub mod chart;
pub mod stock;
