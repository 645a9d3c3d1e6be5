use olosuashi_core::{ApiResult, ContentGateway, ExperienceGateway, ListQuery, TourGateway};
use olosuashi_shared::{Experience, HeroSlide, Page, Tour, TourSummary};

/// One rendered list page plus the query that produced it. Nothing else is
/// kept between fetches; the URL is the state.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage<T> {
    pub query: ListQuery,
    pub results: Page<T>,
}

impl<T> CatalogPage<T> {
    /// Query string for the "next" link, if there is a next page. Links
    /// follow the page the server actually returned, which may differ from
    /// the one asked for in the URL.
    pub fn next_link(&self) -> Option<String> {
        if !self.results.has_next() {
            return None;
        }
        let next = self.results.page.checked_add(1)?;
        Some(self.query.with_page(next).to_query_string())
    }

    pub fn previous_link(&self) -> Option<String> {
        self.results
            .has_previous()
            .then(|| self.query.with_page(self.results.page.saturating_sub(1)).to_query_string())
    }

    pub fn is_empty(&self) -> bool {
        self.results.items.is_empty()
    }
}

impl CatalogPage<TourSummary> {
    pub async fn tours(gateway: &dyn TourGateway, query_string: &str) -> ApiResult<Self> {
        let query = ListQuery::from_query_string(query_string);
        let results = gateway.list_tours(&query).await?;
        Ok(Self { query, results })
    }
}

impl CatalogPage<Experience> {
    pub async fn experiences(gateway: &dyn ExperienceGateway, query_string: &str) -> ApiResult<Self> {
        let query = ListQuery::from_query_string(query_string);
        let results = gateway.list_experiences(&query).await?;
        Ok(Self { query, results })
    }
}

/// Landing page content
#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub hero: Vec<HeroSlide>,
    pub featured: Vec<TourSummary>,
}

impl HomePage {
    /// Both sections load independently; a failed hero fetch still renders
    /// featured tours.
    pub async fn load(tours: &dyn TourGateway, content: &dyn ContentGateway) -> ApiResult<Self> {
        let (hero, featured) = tokio::join!(content.hero_slides(), tours.featured_tours());
        let hero = hero.unwrap_or_else(|e| {
            tracing::warn!("Hero slides unavailable: {}", e);
            Vec::new()
        });
        Ok(Self { hero, featured: featured? })
    }
}

pub async fn tour_detail(gateway: &dyn TourGateway, slug: &str) -> ApiResult<Tour> {
    gateway.tour_by_slug(slug).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use olosuashi_core::ApiError;
    use olosuashi_shared::{Pricing, TourPayload};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct StubTours {
        seen: Mutex<Vec<ListQuery>>,
    }

    fn summary(slug: &str) -> TourSummary {
        TourSummary {
            id: Uuid::new_v4(),
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            pricing: Pricing::default(),
            duration_days: 3,
            cover_image: None,
            category: None,
            rating: None,
        }
    }

    #[async_trait]
    impl TourGateway for StubTours {
        async fn list_tours(&self, query: &ListQuery) -> ApiResult<Page<TourSummary>> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(Page {
                items: vec![summary("amboseli-2-day")],
                page: query.page,
                limit: query.limit,
                total: 20,
                total_pages: 3,
            })
        }

        async fn featured_tours(&self) -> ApiResult<Vec<TourSummary>> {
            Ok(vec![summary("masai-mara-7-day")])
        }

        async fn tour_by_slug(&self, slug: &str) -> ApiResult<Tour> {
            Err(ApiError::NotFound(slug.to_string()))
        }

        async fn create_tour(&self, _payload: &TourPayload) -> ApiResult<Tour> {
            unimplemented!()
        }

        async fn update_tour(&self, _id: Uuid, _payload: &TourPayload) -> ApiResult<Tour> {
            unimplemented!()
        }

        async fn delete_tour(&self, _id: Uuid) -> ApiResult<()> {
            unimplemented!()
        }
    }

    struct DownContent;

    #[async_trait]
    impl ContentGateway for DownContent {
        async fn hero_slides(&self) -> ApiResult<Vec<HeroSlide>> {
            Err(ApiError::Network("timeout".into()))
        }
    }

    #[tokio::test]
    async fn test_page_derived_from_query_string() {
        let gateway = StubTours::default();
        let page = CatalogPage::tours(&gateway, "?page=2&category=wildlife").await.unwrap();

        assert_eq!(gateway.seen.lock().unwrap()[0].category.as_deref(), Some("wildlife"));
        let next = page.next_link().unwrap();
        assert!(next.contains("page=3"));
        assert!(next.contains("category=wildlife"));
        assert!(page.previous_link().unwrap().contains("page=1"));
    }

    #[test]
    fn test_links_follow_the_served_page() {
        let clamped = CatalogPage {
            query: ListQuery::from_query_string("page=4294967295"),
            results: Page::<TourSummary> { page: 1, total_pages: 3, ..Page::default() },
        };
        assert!(clamped.next_link().unwrap().contains("page=2"));
        assert_eq!(clamped.previous_link(), None);

        let ahead = CatalogPage {
            query: ListQuery::default(),
            results: Page::<TourSummary> { page: 2, total_pages: 3, ..Page::default() },
        };
        assert!(ahead.next_link().unwrap().contains("page=3"));
        assert!(ahead.previous_link().unwrap().contains("page=1"));
    }

    #[tokio::test]
    async fn test_home_survives_hero_failure() {
        let home = HomePage::load(&StubTours::default(), &DownContent).await.unwrap();
        assert!(home.hero.is_empty());
        assert_eq!(home.featured[0].slug, "masai-mara-7-day");
    }
}
