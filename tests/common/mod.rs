#![allow(dead_code)]

pub mod logging;
