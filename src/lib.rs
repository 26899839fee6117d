pub mod boxes;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod output;
pub mod process;

pub use boxes::{boxes, boxes_game};
pub use config::Config;
pub use error::{BoxesError, FetchError};
pub use fetch::{session::BrefSession, Doubleheader, PageSource};
