pub mod compile;
pub mod config;
pub mod encode;
pub mod errors;
pub mod filters;
pub mod local_params;
pub mod params;
pub mod parser;
pub mod spec;

pub use compile::*;
pub use config::*;
pub use errors::*;
pub use params::*;
pub use parser::*;
pub use spec::*;
