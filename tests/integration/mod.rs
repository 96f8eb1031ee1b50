//! Integration tests over the public API

mod helpers;
mod inventory;
mod pipeline;
mod verification;
