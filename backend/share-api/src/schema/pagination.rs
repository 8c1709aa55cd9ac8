//! Offset pagination for page-numbered infinite scroll
//!
//! Page `n` of size `s` skips `s * (n - 1)` records. There is no cursor, so
//! pages can shift if posts are inserted between requests.

/// Upper bound on `pageSize`
pub const MAX_PAGE_SIZE: i32 = 100;

/// A validated page-number/page-size pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page_num: i64,
    page_size: i64,
}

impl PageRequest {
    /// Validate pagination arguments (pages start at 1)
    pub fn new(page_num: i32, page_size: i32) -> Result<Self, String> {
        if page_num < 1 {
            return Err("'pageNum' must be at least 1".to_string());
        }
        if page_size < 1 {
            return Err("'pageSize' must be at least 1".to_string());
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(format!("'pageSize' cannot exceed {MAX_PAGE_SIZE} items"));
        }

        Ok(Self {
            page_num: i64::from(page_num),
            page_size: i64::from(page_size),
        })
    }

    /// Number of records to skip
    pub fn offset(&self) -> i64 {
        self.page_size * (self.page_num - 1)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Whether records exist beyond this page
    pub fn has_more(&self, total: i64) -> bool {
        total > self.page_size * self.page_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_skips_nothing() {
        let page = PageRequest::new(1, 5).unwrap();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn test_second_page_offset() {
        let page = PageRequest::new(2, 5).unwrap();
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn test_has_more_boundary() {
        let page = PageRequest::new(2, 5).unwrap();
        assert!(page.has_more(11));
        assert!(!page.has_more(10));
        assert!(!page.has_more(7));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(PageRequest::new(0, 5).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(-3, 5).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_large_page_numbers_do_not_overflow() {
        let page = PageRequest::new(i32::MAX, MAX_PAGE_SIZE).unwrap();
        assert!(page.offset() > 0);
        assert!(!page.has_more(1_000));
    }
}
