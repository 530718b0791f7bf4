use crate::scrapers::types::ScrapeParams;
use tracing::info;

/// Results pages to visit for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationPlan {
    pub estate_count: u32,
    pub page_count: u32,
    pub urls: Vec<String>,
}

impl PaginationPlan {
    /// One page per `page_size` listings, plus one, capped at `max_pages`.
    pub fn new(estate_count: u32, params: &ScrapeParams) -> Self {
        let page_size = params.page_size.max(1);
        let page_count = params.max_pages.min(estate_count / page_size + 1);
        let urls: Vec<String> = (1..=page_count).map(|page| params.page_url(page)).collect();
        info!("Generated {} pagination links", urls.len());

        Self {
            estate_count,
            page_count,
            urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_follows_listing_total() {
        let params = ScrapeParams::default();
        let plan = PaginationPlan::new(438, &params);
        assert_eq!(plan.page_count, 22);
        assert_eq!(plan.urls.len(), 22);
        assert_eq!(plan.urls[0], params.page_url(1));
        assert_eq!(plan.urls[21], params.page_url(22));
    }

    #[test]
    fn exact_multiple_still_adds_a_page() {
        let plan = PaginationPlan::new(40, &ScrapeParams::default());
        assert_eq!(plan.page_count, 3);
    }

    #[test]
    fn zero_listings_plans_one_page() {
        let plan = PaginationPlan::new(0, &ScrapeParams::default());
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn capped_at_max_pages() {
        let plan = PaginationPlan::new(1_000_000, &ScrapeParams::default());
        assert_eq!(plan.page_count, 500);
        assert_eq!(plan.urls.len(), 500);
    }

    #[test]
    fn urls_carry_page_and_sort() {
        let plan = PaginationPlan::new(25, &ScrapeParams::default());
        assert_eq!(
            plan.urls,
            vec![
                "https://otthonterkep.hu/elado+minden-kategoria/minden-megye/minden-telepules/0/0/0/0?p=1&sort=ad_feladas_time%7Cdesc",
                "https://otthonterkep.hu/elado+minden-kategoria/minden-megye/minden-telepules/0/0/0/0?p=2&sort=ad_feladas_time%7Cdesc",
            ]
        );
    }
}
