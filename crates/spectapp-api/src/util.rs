//! Spect'App API utility functions.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::instrument;

use crate::api::LocalSpectAppApi;
use crate::error::Result;
use crate::types::Show;

/// Naive ISO-8601 layouts accepted for show dates, most specific first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 datetime string as sent by the `dates` endpoint.
///
/// Accepts naive `T`- or space-separated datetimes (seconds and fractions
/// optional), a bare date (midnight), and RFC 3339 strings with an offset.
///
/// Returns the wall-clock time as sent, paired with the offset when the input
/// carries one (`None` for naive input), or `None` if no layout matches.
#[must_use]
pub fn parse_show_datetime(s: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let s = s.trim();

    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some((dt, None));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some((dt.naive_local(), Some(*dt.offset())));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| (dt, None))
}

/// Fetches every page of a festival listing (or of a search when `query` is
/// set) and concatenates the shows in server order.
///
/// Stops on the first empty page or once `total` shows have been collected.
///
/// # Errors
///
/// Returns the first error reported by `api`; shows already fetched are dropped.
#[instrument(skip_all)]
#[allow(clippy::future_not_send)]
pub async fn collect_all_shows(
    api: &(impl LocalSpectAppApi + Sync),
    festival_id: &str,
    query: Option<&str>,
) -> Result<Vec<Show>> {
    let mut shows: Vec<Show> = Vec::new();
    let mut page: u32 = 0;

    loop {
        let batch = match query {
            Some(q) => api.search_shows(festival_id, q, page).await?,
            None => api.list_shows(festival_id, page).await?,
        };
        let total = batch.total;
        let empty = batch.shows.is_empty();
        shows.extend(batch.shows);
        tracing::debug!(page, collected = shows.len(), total, "Fetched show page");

        let collected = u64::try_from(shows.len()).unwrap_or(u64::MAX);
        if empty || collected >= total {
            break;
        }
        let Some(next) = page.checked_add(1) else {
            break;
        };
        page = next;
    }

    Ok(shows)
}
