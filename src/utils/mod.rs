// Utility modules shared by services

pub mod clock;
pub mod date;
