//! Flutter-facing bindings for taskpad core.

pub mod api;
