pub mod offer_details;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;
pub mod users;

use serde::Serialize;

/// Upper bound for a client-supplied `page_size`.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page-number pagination settings resolved from a query string.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, page_size: Option<u64>, default_size: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn last_page(&self, count: u64) -> u64 {
        count.div_ceil(self.page_size).max(1)
    }

    /// Page 1 always exists, even for an empty collection.
    pub fn is_within(&self, count: u64) -> bool {
        self.page <= self.last_page(count)
    }

    /// Zero-based index as expected by SeaORM's paginator.
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

/// A page of results with links to its neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one fetched page. `query_string` is the raw query of the request;
    /// every parameter except `page` is carried into the links.
    pub fn new(
        count: u64,
        results: Vec<T>,
        request: PageRequest,
        base_path: &str,
        query_string: &str,
    ) -> Self {
        let last_page = request.last_page(count);
        Self {
            count,
            next: (request.page < last_page)
                .then(|| page_link(base_path, query_string, request.page + 1)),
            previous: (request.page > 1)
                .then(|| page_link(base_path, query_string, request.page - 1)),
            results,
        }
    }

    /// Convert the results, keeping counts and links.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// `base_path` with the request's query, its `page` parameter replaced.
pub fn page_link(base_path: &str, query_string: &str, page: u64) -> String {
    let mut params: Vec<&str> = query_string
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some("page"))
        .collect();
    let page_param = format!("page={page}");
    params.push(&page_param);
    format!("{base_path}?{}", params.join("&"))
}
