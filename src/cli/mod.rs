//! CLI command handling

pub mod click;
pub mod output;
pub mod receive;
pub mod state;
pub mod token;

pub use click::*;
pub use output::*;
pub use receive::*;
pub use state::*;
pub use token::*;
