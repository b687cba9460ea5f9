pub mod prediction_handlers;
pub mod prediction_models;
pub mod prediction_repository;
pub mod prediction_service;

pub use prediction_repository::PredictionRepository;
pub use prediction_service::PredictionService;
