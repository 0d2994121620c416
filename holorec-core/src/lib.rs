pub mod auth;
pub mod config;
pub mod timer;
pub mod types;

// Keep the public surface small and intentional.
pub use auth::*;
pub use config::*;
pub use timer::*;
pub use types::*;
