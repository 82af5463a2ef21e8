//! Terminal UI: conversation widgets and color themes

pub mod conversation;
pub mod theme;
