//! Shared query infrastructure: the [`Query`] trait and [`QueryCommon`] fields.

use url::Url;

/// Trait implemented by query builders. Provides URL serialization and the
/// shared pagination builder.
pub trait Query {
    /// Appends this query's path to the given base URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the page number (1-indexed).
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page;
        self
    }
}

/// Fields shared by all query types.
#[derive(Clone, Copy, Debug)]
pub struct QueryCommon {
    /// Page number (1-indexed). Defaults to 1.
    pub page: u32,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon { page: 1 }
    }
}
