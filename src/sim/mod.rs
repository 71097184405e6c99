pub mod event;
pub mod lobby;
pub mod session;
pub mod world;
