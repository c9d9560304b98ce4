pub mod months_model;
pub mod months_repository;
pub mod months_service;
pub mod months_traits;

pub use months_model::{Month, NewMonth};
pub use months_repository::MonthRepository;
pub use months_service::MonthService;
pub use months_traits::{MonthRepositoryTrait, MonthServiceTrait};
