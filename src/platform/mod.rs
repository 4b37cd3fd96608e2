mod error;
mod link;
mod model;
mod traits;

pub mod instagram;

pub use error::*;
pub use instagram::InstagramScraper;
pub use link::*;
pub use model::*;
pub use traits::MediaScraper;
