pub mod commentary;
pub mod derive;
pub mod scorer;

pub use commentary::*;
pub use derive::*;
pub use scorer::*;
