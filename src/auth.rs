//! Token endpoint responses and the claims carried by ESIA access tokens.

pub mod claims;
pub mod token;

pub use claims::*;
pub use token::*;
