//! Progress reporting while agents tick

pub mod reporter;
