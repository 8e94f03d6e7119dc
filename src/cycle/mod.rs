pub mod dto;
pub mod handlers;
pub mod predictor;

pub use handlers::cycle_routes;
