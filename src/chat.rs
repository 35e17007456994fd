//! Chat controller module
//!
//! Wires the pure state machine to the session store and a diagnosis backend.

mod controller;


pub use controller::ChatController;
