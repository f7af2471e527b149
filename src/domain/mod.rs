pub mod candidate;
pub mod progress;
pub mod session;

pub use candidate::*;
pub use progress::*;
pub use session::*;
