//! Model server providers.

pub mod local;
