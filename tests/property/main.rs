#[path = "../common/mod.rs"]
mod common;

mod past_deps;
