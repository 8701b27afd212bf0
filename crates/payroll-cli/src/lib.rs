//! Library side of the `payroll-recon` command: logging, session files and
//! engine wiring, kept out of `main` so they can be tested.

pub mod engine;
pub mod logging;
pub mod session;
