pub mod esbmc;
pub mod kani;
pub mod rbmc;

pub use esbmc::EsbmcBackend;
pub use kani::KaniBackend;
pub use rbmc::RbmcBackend;
