/// Items a paginator can de-duplicate by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for crate::models::ChirpView {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Seam over "fetch one page at this limit/offset". The HTTP feed endpoints
/// are one implementation; tests use in-memory stubs.
pub trait PageSource<T> {
    fn page(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<T>, String>> + Send;
}

/// Accumulates feed pages on the consumer side: replace-on-initial-load,
/// append-with-dedup on load-more, `has_more` tracked from returned page
/// sizes. Errors are logged and leave prior state intact. Overlapping loads
/// cannot happen: both operations take `&mut self`.
pub struct Paginator<T, S> {
    source: S,
    limit: i64,
    offset: i64,
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T: Keyed, S: PageSource<T>> Paginator<T, S> {
    pub fn new(source: S, limit: i64) -> Self {
        Self {
            source,
            limit,
            offset: 0,
            items: Vec::new(),
            has_more: true,
        }
    }

    /// Replace the accumulated items with the first page.
    pub async fn load_initial(&mut self) {
        match self.source.page(self.limit, 0).await {
            Ok(page) => {
                self.has_more = page.len() as i64 == self.limit;
                self.offset = page.len() as i64;
                self.items = page;
            }
            Err(e) => {
                tracing::warn!("initial feed page failed: {}", e);
            }
        }
    }

    /// Append the next page, skipping items already present. No-op once
    /// `has_more` is false.
    pub async fn load_more(&mut self) {
        if !self.has_more {
            return;
        }

        match self.source.page(self.limit, self.offset).await {
            Ok(page) => {
                self.has_more = page.len() as i64 == self.limit;
                self.offset += page.len() as i64;
                for item in page {
                    if !self.items.iter().any(|existing| existing.key() == item.key()) {
                        self.items.push(item);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("feed page load failed: {}", e);
            }
        }
    }
}
