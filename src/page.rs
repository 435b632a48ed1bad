//! 1-indexed page parsing and boundary metadata.

use crate::error::AppError;

/// Items per product collection page (fixed, not client-tunable).
pub const PRODUCT_PAGE_SIZE: i64 = 5;
/// Items per manufacturer collection page.
pub const MANUFACTURER_PAGE_SIZE: i64 = 30;

/// A validated, 1-indexed page request. `page=0`, negative, or non-numeric
/// input is rejected at construction; a page beyond the last is a valid
/// request that yields an empty member set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn first(size: i64) -> Self {
        Page { number: 1, size }
    }

    /// Parse the `page` query parameter; absent means page 1.
    pub fn from_param(raw: Option<&str>, size: i64) -> Result<Self, AppError> {
        let number = match raw {
            None => 1,
            Some(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("page is not a number: \"{s}\"")))?,
        };
        if number < 1 {
            return Err(AppError::BadRequest(format!(
                "page must be 1 or greater: {number}"
            )));
        }
        Ok(Page { number, size })
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Pair with a filtered total count to obtain navigation metadata.
    pub fn meta(&self, total_items: i64) -> PageMeta {
        PageMeta {
            page: self.number,
            size: self.size,
            total_items,
        }
    }
}

/// Boundary metadata for one page of a filtered collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub page: i64,
    pub size: i64,
    pub total_items: i64,
}

impl PageMeta {
    /// `ceil(totalItems / pageSize)`, floored at 1 so an empty collection
    /// still has a first == last page.
    pub fn last_page(&self) -> i64 {
        ((self.total_items + self.size - 1) / self.size).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_param_is_page_one() {
        let page = Page::from_param(None, PRODUCT_PAGE_SIZE).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_zero_and_negative_are_rejected() {
        assert!(Page::from_param(Some("0"), 5).is_err());
        assert!(Page::from_param(Some("-3"), 5).is_err());
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        assert!(Page::from_param(Some("two"), 5).is_err());
        assert!(Page::from_param(Some("1.5"), 5).is_err());
        assert!(Page::from_param(Some(""), 5).is_err());
    }

    #[test]
    fn offset_is_zero_indexed_from_page_number() {
        let page = Page::from_param(Some("3"), 5).unwrap();
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(Page::first(5).meta(100).last_page(), 20);
        assert_eq!(Page::first(5).meta(101).last_page(), 21);
        assert_eq!(Page::first(5).meta(4).last_page(), 1);
        assert_eq!(Page::first(5).meta(0).last_page(), 1);
    }

    #[test]
    fn navigation_presence_follows_boundaries() {
        let first = Page::first(5).meta(100);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let mid = Page { number: 2, size: 5 }.meta(100);
        assert!(mid.has_previous());
        assert!(mid.has_next());

        let last = Page { number: 20, size: 5 }.meta(100);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn page_beyond_range_is_valid_with_no_next() {
        let beyond = Page { number: 25, size: 5 }.meta(100);
        assert!(beyond.has_previous());
        assert!(!beyond.has_next());
        assert_eq!(beyond.last_page(), 20);
    }
}
