pub mod analysis;
pub mod estimates;
pub mod mortgage;
pub mod projection;
pub mod returns;
