//! Query parameter construction for Spect'App endpoints.

/// Name of the API key query parameter.
pub(crate) const KEY_PARAM: &str = "key";

/// Query parameters, in the order they are sent.
pub(crate) type Query = Vec<(&'static str, String)>;

/// Builds `shows` endpoint parameters. `query` is set only for searches.
pub(crate) fn shows_query(festival_id: &str, page: u32, query: Option<&str>) -> Query {
    let mut params: Query = vec![
        ("festival", String::from(festival_id)),
        ("page", page.to_string()),
    ];
    if let Some(q) = query {
        params.push(("query", String::from(q)));
    }
    params
}

/// Builds `show` / `dates` endpoint parameters.
pub(crate) fn show_query(festival_id: &str, show_id: &str) -> Query {
    vec![
        ("festival", String::from(festival_id)),
        ("id", String::from(show_id)),
    ]
}

/// Appends the API key, replacing any `key` the caller already put in `params`.
pub(crate) fn with_key(mut params: Query, key: &str) -> Query {
    params.retain(|(name, _)| *name != KEY_PARAM);
    params.push((KEY_PARAM, String::from(key)));
    params
}
