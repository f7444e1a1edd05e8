//! View models and HTML fragments for the template helpers.

pub mod fragments;
pub mod views;
