//! Application services: the template helpers and the ports they query.

pub mod archive;
pub mod authors;
pub mod context;
pub mod error;
pub mod navigation;
pub mod recent;
pub mod repos;
pub mod tags;
