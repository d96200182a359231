//! Integration test modules

mod gate;
