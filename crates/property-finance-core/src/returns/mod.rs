pub mod irr;
pub mod metrics;
pub mod ratios;
