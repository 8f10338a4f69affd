pub mod backends;
pub mod bounds;
pub mod experiment;
pub mod history;
pub mod util;

pub use backends::*;
pub use bounds::*;
pub use experiment::*;
pub use history::*;
pub use util::*;
