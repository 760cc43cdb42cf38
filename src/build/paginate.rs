//! Splitting post listings into pages and computing their navigation.

use std::ops::Range;

/// How many numbered links the pagination bar shows at most.
pub const WINDOW_SIZE: usize = 5;

/// One page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based
    pub index: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    /// One-based page number, as shown to readers.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }
}

/// Split `items` into consecutive pages of `page_size`; the last page holds
/// the remainder. No items means no pages.
pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<Page<'_, T>> {
    let chunks: Vec<&[T]> = items.chunks(page_size.max(1)).collect();
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, items)| Page {
            items,
            index,
            total,
        })
        .collect()
}

/// Page indices shown in the pagination bar: up to five, centered on
/// `index` where possible and shifted inward at either end.
///
/// # Examples
/// ```ignore
/// page_window(0, 12) => 0..5
/// page_window(9, 12) => 7..12
/// page_window(1, 3)  => 0..3
/// ```
pub fn page_window(index: usize, total: usize) -> Range<usize> {
    let max_start = total.saturating_sub(WINDOW_SIZE);
    let start = index.saturating_sub(2).min(max_start);
    let end = total.min(start + WINDOW_SIZE);
    start..end
}

/// File naming of one paginated collection.
///
/// The first page has its own name (`index.html` for the blog, `<slug>.html`
/// for a tag) and later pages are `<prefix>-page-<n>.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    first_page: String,
    prefix: String,
}

impl Collection {
    pub fn new(first_page: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            first_page: first_page.into(),
            prefix: prefix.into(),
        }
    }

    /// The blog listing: `index.html`, `blog-page-2.html`, ...
    pub fn blog() -> Self {
        Self::new("index.html", "blog")
    }

    /// A tag listing: `<slug>.html`, `<slug>-page-2.html`, ...
    pub fn tag(slug: &str) -> Self {
        Self::new(format!("{}.html", slug), slug)
    }

    pub fn file_name(&self, index: usize) -> String {
        if index == 0 {
            self.first_page.clone()
        } else {
            format!("{}-page-{}.html", self.prefix, index + 1)
        }
    }

    /// Navigation for `page`.
    pub fn page_links<T>(&self, page: &Page<'_, T>) -> PaginationLinks {
        let previous = (!page.is_first()).then(|| self.file_name(page.index - 1));
        let next = (!page.is_last()).then(|| self.file_name(page.index + 1));
        let window = page_window(page.index, page.total)
            .map(|i| PageLink {
                number: i + 1,
                href: self.file_name(i),
                is_current: i == page.index,
            })
            .collect();

        PaginationLinks {
            previous,
            next,
            window,
        }
    }

    /// Navigation for page `index` out of `total`, without the items.
    #[cfg(test)]
    pub fn links(&self, index: usize, total: usize) -> PaginationLinks {
        self.page_links(&Page::<()> {
            items: &[],
            index,
            total,
        })
    }
}

/// A numbered link in the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub is_current: bool,
}

/// Everything the pagination bar of one page needs. `None` hides a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationLinks {
    pub previous: Option<String>,
    pub next: Option<String>,
    pub window: Vec<PageLink>,
}
