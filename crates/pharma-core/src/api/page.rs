//! Pagination request parameters and the page envelope.

use serde::{Deserialize, Serialize};

/// `page`/`size` query parameters for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub(crate) fn query(self) -> [(&'static str, u32); 2] {
        [("page", self.page), ("size", self.size)]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_request_is_first_page_of_twenty() {
        assert_eq!(PageRequest::default(), PageRequest::new(0, 20));
        assert_eq!(PageRequest::default().query(), [("page", 0), ("size", 20)]);
    }

    #[test]
    fn test_page_envelope_parses() {
        let page: Page<String> = serde_json::from_value(json!({
            "content": ["a", "b"],
            "totalPages": 3,
            "totalElements": 42,
            "last": false,
            "number": 0,
            "size": 20,
            "pageable": {"sort": {}}
        }))
        .unwrap();

        assert_eq!(page.content, vec!["a", "b"]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 42);
        assert!(!page.last);
    }

    #[test]
    fn test_page_envelope_tolerates_missing_counters() {
        let page: Page<u32> = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.size, 0);
    }
}
