pub mod sampler;
pub mod ui;
