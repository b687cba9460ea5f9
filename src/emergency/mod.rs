pub mod emergency_handlers;
pub mod emergency_models;
pub mod emergency_repository;
pub mod emergency_service;

pub use emergency_repository::EmergencyRepository;
