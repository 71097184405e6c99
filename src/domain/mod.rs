pub mod coord;
pub mod perk;
pub mod player;
