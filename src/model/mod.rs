//! Domain models shared between the data and service layers.

pub mod activity;
