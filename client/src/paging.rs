use crate::{
    api::{
        fetch,
        ApiRequest,
        SevOneApi,
    },
    model::Page,
    ClientError,
};
use futures::{
    stream,
    StreamExt,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumString,
};

/// What to do when one of the pages after the first fails.
#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PagePolicy {
    /// The whole listing fails.
    #[default]
    Strict,
    /// The page is skipped and reported in [`Listing::failed_pages`].
    BestEffort,
}

#[derive(Debug)]
pub struct PageFailure {
    pub page: u32,
    pub error: ClientError,
}

/// All items of a paginated collection, in page order.
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub failed_pages: Vec<PageFailure>,
}

/// Walks paginated collections: page 0 first, then every remaining page concurrently.
pub struct Pager<'a, A: ?Sized> {
    api: &'a A,
    page_size: u32,
    policy: PagePolicy,
    concurrency: usize,
}

impl<A: ?Sized> Clone for Pager<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for Pager<'_, A> {}

impl<'a, A> Pager<'a, A>
where
    A: SevOneApi + ?Sized,
{
    pub fn new(api: &'a A, page_size: u32, policy: PagePolicy, concurrency: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            policy,
            concurrency: concurrency.max(1),
        }
    }

    fn page_request(&self, path: &str, page: u32) -> ApiRequest {
        ApiRequest::new(path).param("page", page).param("size", self.page_size)
    }

    /// Fetch every page of `path` and concatenate their `content`.
    ///
    /// A failure of the first page always fails the listing. Later pages
    /// follow the configured [`PagePolicy`].
    pub async fn fetch_all<T>(&self, path: &str) -> Result<Listing<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let first: Page<T> = fetch(self.api, self.page_request(path, 0)).await?;
        let mut listing = Listing {
            items: first.content,
            failed_pages: Vec::new(),
        };
        if first.total_pages <= 1 {
            return Ok(listing);
        }

        debug!(path, total_pages = first.total_pages, "fetching remaining pages");
        let api = self.api;
        let mut pages = stream::iter(1..first.total_pages)
            .map(|page| {
                let request = self.page_request(path, page);
                async move { (page, fetch::<Page<T>, A>(api, request).await) }
            })
            .buffered(self.concurrency);

        while let Some((page, result)) = pages.next().await {
            match result {
                Ok(next) => listing.items.extend(next.content),
                Err(error) if self.policy == PagePolicy::Strict => {
                    return Err(ClientError::Page {
                        url: path.to_string(),
                        page,
                        source: Box::new(error),
                    });
                }
                Err(error) => {
                    debug!(path, page, %error, "skipping page");
                    listing.failed_pages.push(PageFailure { page, error });
                }
            }
        }

        Ok(listing)
    }
}
