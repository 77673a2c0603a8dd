use serde::Serialize;

/// One page of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Page {
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let per_page = per_page.max(1);
        Page {
            page: page.max(1),
            per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page),
        }
    }

    /// Row offset of the page. Capped at `i64::MAX`, the largest skip a
    /// database driver accepts, so far-away pages read as empty.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }
}

/// `pageno` query value; anything missing, unparsable or below 1 is page 1.
pub fn parse_page_number(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map(|page| page as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_defaults_to_one() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("")), 1);
        assert_eq!(parse_page_number(Some("abc")), 1);
        assert_eq!(parse_page_number(Some("0")), 1);
        assert_eq!(parse_page_number(Some("-3")), 1);
        assert_eq!(parse_page_number(Some("4")), 4);
    }

    #[test]
    fn offset_and_total_pages() {
        let page = Page::new(3, 10, 25);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.total_pages, 3);

        let empty = Page::new(1, 10, 0);
        assert_eq!(empty.offset(), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn huge_page_number_keeps_offset_in_i64_range() {
        let page = Page::new(parse_page_number(Some("9223372036854775807")), 10, 5);
        assert_eq!(page.page, i64::MAX as u64);
        assert_eq!(page.offset(), i64::MAX as u64);
        assert!(i64::try_from(page.offset()).is_ok());
    }
}
