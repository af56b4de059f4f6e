pub mod crew_service;
pub mod service;
