pub mod capture;
pub mod game;
pub mod lobby;
pub mod wire;
