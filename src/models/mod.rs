mod audit;
mod license;

pub use audit::*;
pub use license::*;
