//! # pollcast-channels
//!
//! Messaging platform integrations: Discord hosts the poll, Telegram and
//! WhatsApp receive the results.

pub mod discord;
pub mod telegram;
pub mod whatsapp;

mod split;
