//! Paginated search envelope

use serde::{Deserialize, Serialize};

use crate::criteria::SortSpec;
use crate::query::SearchQuery;

/// Navigation links of a page; each carries the same `size`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub last: String,
}

impl PageLinks {
    /// Links for 1-based `page` of `total_pages`
    ///
    /// `last` points at page `total_pages` even when that is 0.
    pub fn build(base: &str, page: u32, size: u32, total_pages: u32) -> Self {
        let link = |n: u32| format!("{base}?page={n}&size={size}");
        Self {
            self_link: link(page),
            first: link(1),
            previous: (page > 1).then(|| link(page - 1)),
            next: (page < total_pages).then(|| link(page + 1)),
            last: link(total_pages),
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub content: Vec<T>,
    /// 1-based page number
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub sorts: Vec<SortSpec>,
    pub links: PageLinks,
}

/// Number of pages needed for `total` rows
pub fn total_pages(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl<T> SearchPage<T> {
    /// Wraps one page of rows fetched for `query`
    pub fn assemble(content: Vec<T>, query: &SearchQuery, total_elements: u64, base: &str) -> Self {
        let page = query.page.number();
        let size = query.page.size;
        let total_pages = total_pages(total_elements, size);

        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 1,
            last: page >= total_pages,
            sorts: query.requested_sorts.clone(),
            links: PageLinks::build(base, page, size, total_pages),
        }
    }

    /// Converts the rows, keeping paging data
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchPage<U> {
        SearchPage {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
            sorts: self.sorts,
            links: self.links,
        }
    }
}
