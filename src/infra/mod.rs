mod logging;
mod scan;

pub use logging::*;
pub use scan::*;
