pub mod augment;
pub mod config;
pub mod destination;
pub mod document;
pub mod errors;
pub mod fetch;
pub mod main_image;
pub mod matcher;
pub mod query;
pub mod utils;

pub use augment::{Augmenter, augment_content};
pub use config::{FetchSettings, GrabberConfig, GrabberConfigBuilder};
pub use destination::find_destination;
pub use document::{AttributeSource, ElementSnapshot, MatchedElement, ParsedDocument, parse};
pub use errors::{FetchError, GrabError, GrabResult};
pub use fetch::{HttpFetcher, PageFetcher};
pub use main_image::{find_main_image, locate_main_image};
pub use matcher::{first_match, first_match_with_index};
pub use query::Query;
pub use utils::resolve;
