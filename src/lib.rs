//! Hanabi Bridge - Sensor-to-browser WebSocket relay
//!
//! This crate relays gesture telemetry from ESP32 sensors to browser clients
//! and browser commands back to sensors, classifying each connection by the
//! traffic it sends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
