//! Library side of the `edc-next-appointment` command.

pub mod case;
pub mod logging;
pub mod routes;
pub mod settings;
