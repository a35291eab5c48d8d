pub mod claims_dao;
pub mod health_dto;
pub mod ping_dto;
pub mod token_dto;
pub mod upload_dto;
