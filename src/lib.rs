pub mod aggregate;
pub mod args;
pub mod chart;
pub mod errors;
pub mod pipeline;
pub mod records;
pub mod render;
pub mod series;
