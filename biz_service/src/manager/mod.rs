pub mod group_store;
pub mod group_store_memory_impl;
pub mod group_store_mongo_impl;
pub mod secret_manager;
