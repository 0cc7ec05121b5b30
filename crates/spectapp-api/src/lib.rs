//! Client library for the Spect'App festival listings API.
//!
//! Lists and searches a festival's shows, fetches show records and
//! performance dates, and resolves show image URLs.

mod api;
mod client;
mod error;
mod params;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalSpectAppApi, SpectAppApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{SpectAppClient, SpectAppClientBuilder};
pub use error::{ErrorKind, Result, SpectAppError};
pub use types::{MediaKind, Show, ShowDate, ShowDetails, ShowPage};
pub use util::{collect_all_shows, parse_show_datetime};
