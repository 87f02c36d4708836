pub mod group_entity;
pub mod private_key;
pub mod time_slot;
