//! voia-core - Core library for Voia
//!
//! This crate contains the shared records, hosted gateway, filters, forms and
//! rich-text content model used by the Voia interfaces (CLI and media API).

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod filter;
pub mod form;
pub mod gateway;
pub mod media;
pub mod models;
pub mod preferences;
pub mod services;
pub mod store;
pub mod util;
pub mod verses;

pub use error::{Error, Result};
pub use models::{
    DiaryEntry, DiaryId, EntryId, JournalEntry, PrayerId, PrayerRequest, Reminder, ReminderId,
    UserId,
};
