//! Loading, backup-safe saving and bulk item remove/replace for Star Valor
//! save games.

pub mod core_api;
pub mod game_data;
pub mod item_kind;
