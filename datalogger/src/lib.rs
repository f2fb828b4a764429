//! Library half of the capture firmware: the command protocol, the ADC
//! capture engine and the button/sleep path. The binary in `main.rs` wires
//! them to the peripherals.

#![no_std]

pub mod capture;
pub mod command;
pub mod power;
