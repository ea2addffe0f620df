mod health;
mod media;
mod recommendations;
mod stream;

pub use health::health;
pub use media::{issue_link, list_media, list_tags, rate_media};
pub use recommendations::get_recommendations;
pub use stream::stream_media;
