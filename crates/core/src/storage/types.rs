use super::PaginationError;

/// Default page when the caller supplies none.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Creates a page request, rejecting zero values.
    pub fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage(page.to_string()));
        }
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize(page_size.to_string()));
        }
        Ok(Self { page, page_size })
    }

    /// Parses raw query values. Absent values fall back to the defaults;
    /// anything that is not a positive integer is rejected.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self, PaginationError> {
        let page = match page {
            Some(raw) => {
                parse_positive(raw).ok_or_else(|| PaginationError::InvalidPage(raw.to_string()))?
            }
            None => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(raw) => parse_positive(raw)
                .ok_or_else(|| PaginationError::InvalidPageSize(raw.to_string()))?,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Self { page, page_size })
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// The page index for 0-based APIs.
    pub fn zero_based_page(&self) -> u32 {
        self.page - 1
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value > 0)
}
