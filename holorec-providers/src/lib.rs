pub mod device_portal;
pub mod request;
pub mod runtime;
