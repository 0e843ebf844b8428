pub mod calendar_event;
pub mod category;
pub mod consumption_log;
pub mod family_member;
pub mod item;
pub mod location;
pub mod user_settings;
