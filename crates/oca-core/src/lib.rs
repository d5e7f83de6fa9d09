//! Optical calibration table tools.
//!
//! Reads laser-fit and reference optics tables, derives absorption lengths and
//! PMT angular responses, writes the simulation database tables, and generates
//! batch-job files from templates.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
pub mod parser;
