//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod import;
pub mod redirect;
pub mod short_urls;

pub use health::health_handler;
pub use import::import_handler;
pub use redirect::redirect_handler;
pub use short_urls::{
    create_short_url_handler, edit_short_url_handler, get_short_url_handler, shorten_handler,
};
