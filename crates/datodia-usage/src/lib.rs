//! A small crate whose fixtures come from a generated `Container`.

pub mod builders;
pub mod models;

#[cfg(test)]
mod fixtures;

include!(concat!(env!("OUT_DIR"), "/datodia.rs"));
