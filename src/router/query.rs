//! Query string codecs.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

/// Parses and renders the query component of a URL.
pub trait QueryCodec: Send + Sync + fmt::Debug {
    /// `search` may or may not carry the leading `?`.
    fn parse(&self, search: &str) -> BTreeMap<String, String>;

    fn stringify(&self, params: &BTreeMap<String, String>) -> String;
}

/// `application/x-www-form-urlencoded` queries. Repeated keys keep the last value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedQuery;

impl QueryCodec for UrlEncodedQuery {
    fn parse(&self, search: &str) -> BTreeMap<String, String> {
        let search = search.strip_prefix('?').unwrap_or(search);
        form_urlencoded::parse(search.as_bytes())
            .into_owned()
            .collect()
    }

    fn stringify(&self, params: &BTreeMap<String, String>) -> String {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("?{}", encoded)
    }
}
