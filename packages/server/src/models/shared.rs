use serde::Serialize;

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    /// Clamp raw query values to a 1-based page and a bounded page size.
    pub fn clamp(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
        (
            Ord::max(page.unwrap_or(1), 1),
            per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        )
    }

    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_and_counts_pages() {
        assert_eq!(Pagination::clamp(None, None), (1, 20));
        assert_eq!(Pagination::clamp(Some(0), Some(1000)), (1, 100));
        let p = Pagination::new(3, 20, 47);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset(), 40);
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
    }
}
