mod outline;

pub use outline::*;
