pub mod control;
pub mod lobby;
