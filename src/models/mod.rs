//! Domain models

pub mod book;
pub mod enums;
pub mod item;
pub mod loan;
pub mod mail;
pub mod request;
pub mod social;
pub mod user;
