// Module exports for models

pub mod display;
pub mod locale;
pub mod nameday;
pub mod settings;
