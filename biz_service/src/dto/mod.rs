pub mod group_dto;
pub mod payload;
