pub mod geolocation_service;
pub mod scheduler;

pub use geolocation_service::*;
pub use scheduler::*;
