//! Small cross-cutting helpers.

pub mod clock;
pub mod lock;
pub mod timezone;
