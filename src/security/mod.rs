pub mod token;

pub use token::{RandomTokenGenerator, TokenGenerator};
