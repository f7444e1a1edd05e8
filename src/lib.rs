//! Template helpers for a multilingual blog: date archives, tag clouds, author
//! lists, recent posts and previous/next entry navigation.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
