pub mod browse;
pub mod quiz;
