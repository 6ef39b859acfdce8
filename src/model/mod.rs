pub mod score;
pub mod types;
pub mod utils;

pub use score::*;
pub use types::*;
pub use utils::*;
