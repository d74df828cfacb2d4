//! First steps: a root endpoint, one route per HTTP verb, and typed path
//! parameters.

pub mod calculator;
pub mod path_params;
pub mod welcome;
