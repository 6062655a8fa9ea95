pub mod composite;
pub mod config;
pub mod error;
pub mod generator;
pub mod io;
pub mod pool;
pub mod prep;
pub mod record;
pub mod renderer;
pub mod request;

pub use error::{SynthError, SynthResult};
