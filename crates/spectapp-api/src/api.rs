//! `SpectAppApi` trait definition.
#![allow(clippy::future_not_send)]

use crate::error::Result;
use crate::types::{Show, ShowDate, ShowDetails, ShowPage};

/// Spect'App API trait.
///
/// Abstracts API operations so helpers such as [`crate::collect_all_shows`]
/// can run against a mock in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(SpectAppApi: Send)]
pub trait LocalSpectAppApi {
    /// Lists one page of a festival's shows.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, the HTTP request fails, or the
    /// server reports a failure.
    async fn list_shows(&self, festival_id: &str, page: u32) -> Result<ShowPage>;

    /// Searches a festival's shows by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, the HTTP request fails, or the
    /// server reports a failure.
    async fn search_shows(&self, festival_id: &str, query: &str, page: u32) -> Result<ShowPage>;

    /// Fetches one show's full record.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, the HTTP request fails, or the
    /// server reports a failure.
    async fn get_show(&self, festival_id: &str, show_id: &str) -> Result<Show>;

    /// Fetches one show's record together with its icon and header URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, the HTTP request fails, or the
    /// server reports a failure.
    async fn get_show_details(&self, festival_id: &str, show_id: &str) -> Result<ShowDetails>;

    /// Resolves the icon URL of a show.
    ///
    /// With `use_remote_lookup == false` the URL is formatted locally and no
    /// request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, or (remote lookup only) the HTTP
    /// request fails or the server reports a failure.
    async fn get_show_icon(
        &self,
        festival_id: &str,
        show_id: &str,
        use_remote_lookup: bool,
    ) -> Result<String>;

    /// Resolves the header URL of a show. See [`LocalSpectAppApi::get_show_icon`].
    ///
    /// # Errors
    ///
    /// Same as [`LocalSpectAppApi::get_show_icon`].
    async fn get_show_header(
        &self,
        festival_id: &str,
        show_id: &str,
        use_remote_lookup: bool,
    ) -> Result<String>;

    /// Fetches the performance dates of a show, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is set, the HTTP request fails, the server
    /// reports a failure, or a datetime cannot be parsed.
    async fn get_show_dates(&self, festival_id: &str, show_id: &str) -> Result<Vec<ShowDate>>;
}
