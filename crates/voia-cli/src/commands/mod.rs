pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod diary;
pub mod image;
pub mod journal;
pub mod prayers;
pub mod prefs;
pub mod reminders;
pub mod verse;
