use olosuashi_core::{ApiResult, ListQuery, TourGateway};
use olosuashi_shared::{Page, TourSummary};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Admin list of tours with search, category filter and paging.
pub struct TourTable {
    gateway: Arc<dyn TourGateway>,
    query: ListQuery,
    page: Option<Page<TourSummary>>,
}

impl TourTable {
    pub fn new(gateway: Arc<dyn TourGateway>) -> Self {
        Self::with_query(gateway, ListQuery::default())
    }

    pub fn with_query(gateway: Arc<dyn TourGateway>, query: ListQuery) -> Self {
        Self { gateway, query, page: None }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Last loaded page, `None` before the first load.
    pub fn page(&self) -> Option<&Page<TourSummary>> {
        self.page.as_ref()
    }

    pub fn rows(&self) -> &[TourSummary] {
        self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub async fn load(&mut self) -> ApiResult<&Page<TourSummary>> {
        let page = self.gateway.list_tours(&self.query).await?;
        Ok(&*self.page.insert(page))
    }

    pub async fn search(&mut self, term: Option<&str>) -> ApiResult<&Page<TourSummary>> {
        self.query = self.query.with_search(term);
        self.load().await
    }

    pub async fn filter_category(&mut self, category: Option<&str>) -> ApiResult<&Page<TourSummary>> {
        self.query = self.query.with_category(category);
        self.load().await
    }

    pub async fn go_to_page(&mut self, page: u32) -> ApiResult<&Page<TourSummary>> {
        self.query = self.query.with_page(page);
        self.load().await
    }

    /// Delete a tour and refresh. If that emptied the last page, step back
    /// one page.
    ///
    /// Only the delete decides the result. A failed refresh is logged and
    /// leaves the previous rows in place until the next load.
    pub async fn delete(&mut self, id: Uuid) -> ApiResult<()> {
        self.gateway.delete_tour(id).await?;
        info!("Deleted tour {}", id);

        if let Err(e) = self.refresh_after_delete().await {
            warn!("Tour {} deleted but the list could not be refreshed: {}", id, e);
        }
        Ok(())
    }

    async fn refresh_after_delete(&mut self) -> ApiResult<()> {
        let page = self.gateway.list_tours(&self.query).await?;
        if page.items.is_empty() && self.query.page > 1 {
            self.query = self.query.with_page(self.query.page - 1);
            self.load().await?;
        } else {
            self.page = Some(page);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use olosuashi_core::ApiError;
    use olosuashi_shared::{Pricing, Tour, TourPayload};
    use std::sync::Mutex;

    struct ListBackend {
        slugs: Mutex<Vec<(Uuid, String)>>,
        queries: Mutex<Vec<ListQuery>>,
        list_down: Mutex<bool>,
    }

    impl ListBackend {
        fn with(count: usize) -> Self {
            let slugs = (0..count).map(|i| (Uuid::new_v4(), format!("tour-{}", i))).collect();
            Self {
                slugs: Mutex::new(slugs),
                queries: Mutex::new(vec![]),
                list_down: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl TourGateway for ListBackend {
        async fn list_tours(&self, query: &ListQuery) -> ApiResult<Page<TourSummary>> {
            self.queries.lock().unwrap().push(query.clone());
            if *self.list_down.lock().unwrap() {
                return Err(ApiError::Network("connection reset".into()));
            }
            let slugs = self.slugs.lock().unwrap();
            let matching: Vec<_> = slugs
                .iter()
                .filter(|(_, slug)| query.search.as_deref().map_or(true, |s| slug.contains(s)))
                .collect();
            let limit = query.limit as usize;
            let start = (query.page as usize - 1) * limit;
            let items = matching
                .iter()
                .skip(start)
                .take(limit)
                .map(|(id, slug)| TourSummary {
                    id: *id,
                    title: slug.clone(),
                    slug: slug.clone(),
                    pricing: Pricing::default(),
                    duration_days: 1,
                    cover_image: None,
                    category: None,
                    rating: None,
                })
                .collect();
            Ok(Page {
                items,
                page: query.page,
                limit: query.limit,
                total: matching.len() as u64,
                total_pages: matching.len().div_ceil(limit) as u32,
            })
        }

        async fn featured_tours(&self) -> ApiResult<Vec<TourSummary>> {
            Ok(vec![])
        }

        async fn tour_by_slug(&self, slug: &str) -> ApiResult<Tour> {
            Err(ApiError::NotFound(slug.to_string()))
        }

        async fn create_tour(&self, _payload: &TourPayload) -> ApiResult<Tour> {
            Err(ApiError::Rejected("read only".into()))
        }

        async fn update_tour(&self, _id: Uuid, _payload: &TourPayload) -> ApiResult<Tour> {
            Err(ApiError::Rejected("read only".into()))
        }

        async fn delete_tour(&self, id: Uuid) -> ApiResult<()> {
            let mut slugs = self.slugs.lock().unwrap();
            let before = slugs.len();
            slugs.retain(|(tour_id, _)| *tour_id != id);
            if slugs.len() == before {
                return Err(ApiError::NotFound(id.to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_search_resets_to_first_page() {
        let backend = Arc::new(ListBackend::with(20));
        let mut table = TourTable::new(backend.clone());

        table.go_to_page(2).await.unwrap();
        assert_eq!(table.rows().len(), 9);

        let page = table.search(Some("tour-1")).await.unwrap();
        assert_eq!(page.page, 1);
        // tour-1, tour-10 .. tour-19
        assert_eq!(page.total, 11);
        assert_eq!(table.query().search.as_deref(), Some("tour-1"));
    }

    #[tokio::test]
    async fn test_deleting_last_row_steps_back_a_page() {
        let backend = Arc::new(ListBackend::with(10));
        let mut table = TourTable::new(backend.clone());

        table.go_to_page(2).await.unwrap();
        assert_eq!(table.rows().len(), 1);
        let id = table.rows()[0].id;

        table.delete(id).await.unwrap();

        assert_eq!(table.query().page, 1);
        assert_eq!(table.rows().len(), 9);
        assert_eq!(table.page().unwrap().total_pages, 1);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_current_page() {
        let backend = Arc::new(ListBackend::with(3));
        let mut table = TourTable::new(backend.clone());
        table.load().await.unwrap();

        assert!(table.delete(Uuid::new_v4()).await.is_err());
        assert_eq!(table.rows().len(), 3);
        assert_eq!(backend.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_refresh_fails() {
        let backend = Arc::new(ListBackend::with(3));
        let mut table = TourTable::new(backend.clone());
        table.load().await.unwrap();
        let id = table.rows()[0].id;

        *backend.list_down.lock().unwrap() = true;
        table.delete(id).await.unwrap();

        assert_eq!(backend.slugs.lock().unwrap().len(), 2);
        assert_eq!(backend.queries.lock().unwrap().len(), 2);
        // stale rows stay until the next successful load
        assert_eq!(table.rows().len(), 3);
    }
}
