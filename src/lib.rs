//! Discord role and department synchronization for the Florida Coast RP forum.
//!
//! Forum users link a Discord account; their forum role and department are
//! derived from the roles they hold in the community's Discord guilds.

pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod fetcher;
pub mod health;
pub mod mapping;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod sync;
pub mod web;
