// Service module exports

pub mod login_item;
pub mod nameday;
pub mod presenter;
pub mod refresh;
pub mod settings;
pub mod system_events;
