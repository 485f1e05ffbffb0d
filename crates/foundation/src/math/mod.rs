pub mod gcj;
pub mod geodesy;

pub use gcj::*;
pub use geodesy::*;
