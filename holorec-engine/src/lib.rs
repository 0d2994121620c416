pub mod client;
pub mod handle;
pub mod session;
pub mod traits;
