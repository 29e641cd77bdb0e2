//! Progress observers

pub mod reporter;
