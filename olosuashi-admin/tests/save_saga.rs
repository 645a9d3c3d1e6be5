use async_trait::async_trait;
use olosuashi_admin::{
    CoverChoice, PendingImage, RetryPolicy, SaveError, SaveStep, TourForm, TourSaveSaga,
};
use olosuashi_core::{ApiError, ApiResult, ListQuery, TourGateway, TourMediaGateway};
use olosuashi_shared::{ImageUpload, Page, Pricing, Tour, TourImage, TourPayload, TourSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// In-memory backend with scripted failures per operation.
#[derive(Default)]
struct FakeBackend {
    tours: Mutex<HashMap<Uuid, Tour>>,
    failures: Mutex<HashMap<&'static str, Vec<ApiError>>>,
    log: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn fail(&self, op: &'static str, errors: Vec<ApiError>) {
        self.failures.lock().unwrap().insert(op, errors);
    }

    fn next_failure(&self, op: &'static str) -> Option<ApiError> {
        self.log.lock().unwrap().push(op.to_string());
        let mut failures = self.failures.lock().unwrap();
        let queue = failures.get_mut(op)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    fn count(&self, op: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|o| o.as_str() == op).count()
    }

    fn tour_from(id: Uuid, payload: &TourPayload) -> Tour {
        Tour {
            id,
            title: payload.title.clone(),
            slug: payload.slug.clone(),
            description: payload.description.clone(),
            category: payload.category.clone(),
            pricing: payload.pricing.clone(),
            duration_days: payload.duration_days,
            difficulty: payload.difficulty,
            min_group_size: payload.min_group_size,
            max_group_size: payload.max_group_size,
            images: vec![],
            itinerary: payload.itinerary.clone(),
            vehicles: payload.vehicles.clone(),
            locations: payload.locations.clone(),
            services: payload.services.clone(),
            availability: payload.availability.clone(),
            reviews: vec![],
            is_featured: payload.is_featured,
            created_at: None,
            updated_at: None,
        }
    }
}

#[async_trait]
impl TourGateway for FakeBackend {
    async fn list_tours(&self, _query: &ListQuery) -> ApiResult<Page<TourSummary>> {
        Ok(Page::default())
    }

    async fn featured_tours(&self) -> ApiResult<Vec<TourSummary>> {
        Ok(vec![])
    }

    async fn tour_by_slug(&self, slug: &str) -> ApiResult<Tour> {
        Err(ApiError::NotFound(slug.to_string()))
    }

    async fn create_tour(&self, payload: &TourPayload) -> ApiResult<Tour> {
        if let Some(e) = self.next_failure("create") {
            return Err(e);
        }
        let tour = Self::tour_from(Uuid::new_v4(), payload);
        self.tours.lock().unwrap().insert(tour.id, tour.clone());
        Ok(tour)
    }

    async fn update_tour(&self, id: Uuid, payload: &TourPayload) -> ApiResult<Tour> {
        if let Some(e) = self.next_failure("update") {
            return Err(e);
        }
        let tour = Self::tour_from(id, payload);
        self.tours.lock().unwrap().insert(id, tour.clone());
        Ok(tour)
    }

    async fn delete_tour(&self, id: Uuid) -> ApiResult<()> {
        if let Some(e) = self.next_failure("delete_tour") {
            return Err(e);
        }
        self.tours.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TourMediaGateway for FakeBackend {
    async fn upload_images(&self, tour_id: Uuid, images: Vec<ImageUpload>) -> ApiResult<Vec<TourImage>> {
        if let Some(e) = self.next_failure("upload") {
            return Err(e);
        }
        let uploaded: Vec<TourImage> = images
            .iter()
            .map(|upload| TourImage {
                id: Uuid::new_v4(),
                url: format!("https://cdn.olosuashi.com/{}/{}", tour_id, upload.file_name),
                alt: None,
                is_cover: false,
            })
            .collect();
        let mut tours = self.tours.lock().unwrap();
        if let Some(tour) = tours.get_mut(&tour_id) {
            tour.images.extend(uploaded.clone());
        }
        Ok(uploaded)
    }

    async fn set_cover_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()> {
        if let Some(e) = self.next_failure("cover") {
            return Err(e);
        }
        let mut tours = self.tours.lock().unwrap();
        let tour = tours.get_mut(&tour_id).ok_or(ApiError::NotFound(tour_id.to_string()))?;
        for image in tour.images.iter_mut() {
            image.is_cover = image.id == image_id;
        }
        Ok(())
    }

    async fn delete_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()> {
        if let Some(e) = self.next_failure("delete_image") {
            return Err(e);
        }
        let mut tours = self.tours.lock().unwrap();
        if let Some(tour) = tours.get_mut(&tour_id) {
            tour.images.retain(|i| i.id != image_id);
        }
        Ok(())
    }
}

fn form_with_images(count: usize) -> TourForm {
    let mut form = TourForm::new();
    form.title = "Tsavo East Overnight".into();
    form.base_price = 540;
    form.duration_days = 2;
    for i in 0..count {
        form.add_image(PendingImage::new(format!("tsavo-{}.jpg", i), vec![0xff, 0xd8, i as u8]).unwrap());
    }
    if count > 0 {
        form.cover = Some(CoverChoice::Pending(count - 1));
    }
    form
}

fn saga(backend: &Arc<FakeBackend>) -> TourSaveSaga {
    TourSaveSaga::new(
        backend.clone(),
        backend.clone(),
        RetryPolicy { max_attempts: 3, backoff: Duration::ZERO },
    )
}

fn network() -> ApiError {
    ApiError::Network("connection reset".into())
}

#[tokio::test]
async fn test_create_upload_cover_happy_path() {
    let backend = Arc::new(FakeBackend::default());

    let report = saga(&backend).save(&form_with_images(2)).await.unwrap();

    assert_eq!(report.tour.slug, "tsavo-east-overnight");
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.cover, Some(report.uploaded[1].id));

    let tours = backend.tours.lock().unwrap();
    let stored = tours.get(&report.tour.id).unwrap();
    assert!(stored.images[1].is_cover);
    assert!(!stored.images[0].is_cover);
}

#[tokio::test]
async fn test_transient_upload_failure_is_retried() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail("upload", vec![network(), network()]);

    let report = saga(&backend).save(&form_with_images(1)).await.unwrap();

    assert_eq!(backend.count("upload"), 3);
    assert_eq!(report.uploaded.len(), 1);
}

#[tokio::test]
async fn test_upload_failure_rolls_back_created_tour() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail("upload", vec![network(), network(), network()]);

    let err = saga(&backend).save(&form_with_images(2)).await.unwrap_err();

    match err {
        SaveError::StepFailed { step, attempts, compensation, .. } => {
            assert_eq!(step, SaveStep::UploadImages);
            assert_eq!(attempts, 3);
            assert!(compensation.deleted_tour.is_some());
            assert!(compensation.is_clean());
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(backend.tours.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_payload_is_not_retried() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail("create", vec![ApiError::Rejected("slug already taken".into())]);

    let err = saga(&backend).save(&form_with_images(0)).await.unwrap_err();

    assert!(matches!(
        err,
        SaveError::StepFailed { step: SaveStep::CreateTour, attempts: 1, .. }
    ));
    assert_eq!(backend.count("create"), 1);
    assert_eq!(backend.count("upload"), 0);
}

#[tokio::test]
async fn test_undecodable_create_response_is_sent_once() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail("create", vec![ApiError::Decode("/tours: missing field `id`".into())]);

    let err = saga(&backend).save(&form_with_images(1)).await.unwrap_err();

    assert!(matches!(
        err,
        SaveError::StepFailed { step: SaveStep::CreateTour, attempts: 1, .. }
    ));
    assert_eq!(backend.count("create"), 1);
    assert_eq!(backend.count("upload"), 0);
}

#[tokio::test]
async fn test_missing_cover_image_is_not_retried() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail(
        "cover",
        vec![
            ApiError::NotFound("image".into()),
            ApiError::NotFound("image".into()),
            ApiError::NotFound("image".into()),
        ],
    );

    let err = saga(&backend).save(&form_with_images(1)).await.unwrap_err();

    match err {
        SaveError::StepFailed { step, attempts, compensation, .. } => {
            assert_eq!(step, SaveStep::SetCover);
            assert_eq!(attempts, 1);
            assert!(compensation.deleted_tour.is_some());
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(backend.count("cover"), 1);
    assert!(backend.tours.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cover_failure_on_existing_tour_removes_new_images() {
    let backend = Arc::new(FakeBackend::default());
    let existing = saga(&backend).save(&form_with_images(0)).await.unwrap().tour;

    let mut form = TourForm::from_tour(&existing);
    form.add_image(PendingImage::new("new-camp.png", vec![1, 2, 3]).unwrap());
    form.cover = Some(CoverChoice::Pending(0));
    backend.fail("cover", vec![ApiError::Forbidden("admins only".into())]);

    let err = saga(&backend).save(&form).await.unwrap_err();

    match err {
        SaveError::StepFailed { step, compensation, .. } => {
            assert_eq!(step, SaveStep::SetCover);
            assert_eq!(compensation.deleted_tour, None);
            assert_eq!(compensation.deleted_images.len(), 1);
            assert!(compensation.update_kept);
        }
        other => panic!("unexpected error {:?}", other),
    }
    let tours = backend.tours.lock().unwrap();
    assert!(tours.get(&existing.id).unwrap().images.is_empty());
}

#[tokio::test]
async fn test_invalid_form_never_reaches_backend() {
    let backend = Arc::new(FakeBackend::default());
    let mut form = form_with_images(1);
    form.base_price = 0;

    let err = saga(&backend).save(&form).await.unwrap_err();

    assert!(matches!(err, SaveError::Invalid(_)));
    assert!(backend.log.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_per_attempt() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail("create", vec![network(), network()]);
    let saga = TourSaveSaga::new(
        backend.clone(),
        backend.clone(),
        RetryPolicy { max_attempts: 3, backoff: Duration::from_secs(1) },
    );

    let started = tokio::time::Instant::now();
    saga.save(&form_with_images(0)).await.unwrap();

    // 1s after the first failure, 2s after the second
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_pricing_survives_round_trip() {
    let backend = Arc::new(FakeBackend::default());
    let mut form = form_with_images(0);
    form.discount_price = Some(499);

    let report = saga(&backend).save(&form).await.unwrap();

    assert_eq!(
        report.tour.pricing,
        Pricing { base_price: 540, discount_price: Some(499), currency: "USD".into() }
    );
}
