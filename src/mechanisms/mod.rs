//! Noise mechanisms applied to event-level outputs. Currently only k-ary
//! randomized response is supported.

pub mod randomized_response;
