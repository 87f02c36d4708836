pub mod group_filter;
pub mod group_service;
