pub mod app;
pub mod bookings;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod fields;
pub mod password;
pub mod patch;
pub mod state;
pub mod telemetry;
pub mod users;
pub mod validation;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod testing;
