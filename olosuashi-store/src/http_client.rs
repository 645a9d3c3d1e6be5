use async_trait::async_trait;
use olosuashi_core::{
    ApiError, ApiResult, BookingGateway, ContentGateway, ExperienceGateway, ListQuery,
    SessionContext, SlugGateway, TourGateway, TourMediaGateway, WishlistGateway,
};
use olosuashi_shared::{
    Booking, BookingRequest, Experience, HeroSlide, ImageUpload, Page, Tour, TourImage,
    TourPayload, TourSummary, WishlistStatus,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::form_urlencoded;
use uuid::Uuid;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("API base url '{0}' must be an absolute http(s) url")]
    InvalidBaseUrl(String),
    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Body shapes the backend uses: either the value itself or `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SlugList {
    Bare(Vec<String>),
    Wrapped { slugs: Vec<String> },
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// The one HTTP client every gateway goes through.
///
/// Attaches the session's bearer token when there is one. A 401 from any
/// endpoint ends the session (credentials wiped, sign-in redirect) and
/// surfaces as [`ApiError::Unauthorized`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionContext>,
    ) -> Result<Self, ClientBuildError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientBuildError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url, session })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn execute(&self, path: &str, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("{} -> {}", path, status);
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.session.expire(path);
            return Err(ApiError::Unauthorized);
        }

        let message = error_message(response).await;
        Err(match status {
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Rejected(message)
            }
            other => {
                warn!("{} answered {}: {}", path, other, message);
                ApiError::Server {
                    status: other.as_u16(),
                    message,
                }
            }
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.execute(path, builder).await?;
        let body = response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))?;
        Ok(body.into_inner())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.fetch(path, self.request(Method::GET, path)).await
    }

    async fn discard(&self, method: Method, path: &str) -> ApiResult<()> {
        self.execute(path, self.request(method, path)).await?;
        Ok(())
    }
}

/// Percent-encodes a caller-supplied value so it stays a single path
/// segment (`/`, `?` and `#` included).
fn path_segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let raw = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&raw) {
        Ok(body) => body.message,
        Err(_) if raw.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        Err(_) => raw,
    }
}

#[async_trait]
impl TourGateway for ApiClient {
    async fn list_tours(&self, query: &ListQuery) -> ApiResult<Page<TourSummary>> {
        let path = "/tours";
        let builder = self
            .request(Method::GET, path)
            .query(&query.to_query_pairs());
        self.fetch(path, builder).await
    }

    async fn featured_tours(&self) -> ApiResult<Vec<TourSummary>> {
        self.get("/tours/featured").await
    }

    async fn tour_by_slug(&self, slug: &str) -> ApiResult<Tour> {
        self.get(&format!("/tours/slug/{}", path_segment(slug))).await
    }

    async fn create_tour(&self, payload: &TourPayload) -> ApiResult<Tour> {
        let path = "/tours";
        self.fetch(path, self.request(Method::POST, path).json(payload)).await
    }

    async fn update_tour(&self, id: Uuid, payload: &TourPayload) -> ApiResult<Tour> {
        let path = format!("/tours/{}", id);
        self.fetch(&path, self.request(Method::PATCH, &path).json(payload)).await
    }

    async fn delete_tour(&self, id: Uuid) -> ApiResult<()> {
        self.discard(Method::DELETE, &format!("/tours/{}", id)).await
    }
}

#[async_trait]
impl TourMediaGateway for ApiClient {
    async fn upload_images(
        &self,
        tour_id: Uuid,
        images: Vec<ImageUpload>,
    ) -> ApiResult<Vec<TourImage>> {
        let path = format!("/tours/{}/images", tour_id);

        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ApiError::Rejected(format!("{}: {}", image.file_name, e)))?;
            form = form.part("images", part);
        }

        self.fetch(&path, self.request(Method::POST, &path).multipart(form)).await
    }

    async fn set_cover_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()> {
        self.discard(
            Method::PATCH,
            &format!("/tours/{}/images/{}/cover", tour_id, image_id),
        )
        .await
    }

    async fn delete_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()> {
        self.discard(Method::DELETE, &format!("/tours/{}/images/{}", tour_id, image_id))
            .await
    }
}

#[async_trait]
impl ExperienceGateway for ApiClient {
    async fn list_experiences(&self, query: &ListQuery) -> ApiResult<Page<Experience>> {
        let path = "/experiences";
        let builder = self
            .request(Method::GET, path)
            .query(&query.to_query_pairs());
        self.fetch(path, builder).await
    }

    async fn experience_by_slug(&self, slug: &str) -> ApiResult<Experience> {
        self.get(&format!("/experiences/slug/{}", path_segment(slug))).await
    }
}

#[async_trait]
impl BookingGateway for ApiClient {
    async fn create_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> ApiResult<Booking> {
        let path = "/experiences/bookings";
        let builder = self
            .request(Method::POST, path)
            .header(IDEMPOTENCY_HEADER, idempotency_key.to_string())
            .json(request);
        self.fetch(path, builder).await
    }
}

#[async_trait]
impl WishlistGateway for ApiClient {
    async fn wishlist_status(&self, tour_id: Uuid) -> ApiResult<WishlistStatus> {
        self.get(&format!("/tours/{}/wishlist", tour_id)).await
    }

    async fn add_to_wishlist(&self, tour_id: Uuid) -> ApiResult<WishlistStatus> {
        let path = format!("/tours/{}/wishlist", tour_id);
        self.fetch(&path, self.request(Method::POST, &path)).await
    }

    async fn remove_from_wishlist(&self, tour_id: Uuid) -> ApiResult<WishlistStatus> {
        let path = format!("/tours/{}/wishlist", tour_id);
        self.fetch(&path, self.request(Method::DELETE, &path)).await
    }
}

#[async_trait]
impl ContentGateway for ApiClient {
    async fn hero_slides(&self) -> ApiResult<Vec<HeroSlide>> {
        self.get("/hero").await
    }
}

#[async_trait]
impl SlugGateway for ApiClient {
    async fn tour_slugs(&self) -> ApiResult<Vec<String>> {
        self.slugs("/tours/all-slugs").await
    }

    async fn experience_slugs(&self) -> ApiResult<Vec<String>> {
        self.slugs("/experiences/all-slugs").await
    }
}

impl ApiClient {
    async fn slugs(&self, path: &str) -> ApiResult<Vec<String>> {
        let list: SlugList = self.get(path).await?;
        Ok(match list {
            SlugList::Bare(slugs) | SlugList::Wrapped { slugs } => slugs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olosuashi_core::MemoryCredentialStore;

    #[test]
    fn test_envelope_accepts_both_shapes() {
        let wrapped: Envelope<Vec<u32>> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        let bare: Envelope<Vec<u32>> = serde_json::from_str("[3]").unwrap();
        assert_eq!(wrapped.into_inner(), vec![1, 2]);
        assert_eq!(bare.into_inner(), vec![3]);
    }

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("masai-mara-7-day"), "masai-mara-7-day");
        assert_eq!(path_segment("mara?page=2"), "mara%3Fpage%3D2");
        assert_eq!(path_segment("../admin"), "..%2Fadmin");
        assert_eq!(path_segment("lamu dhow+sunset"), "lamu%20dhow%2Bsunset");
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let session = Arc::new(SessionContext::new(Arc::new(MemoryCredentialStore::new())));
        let err = ApiClient::new("olosuashi.com/api", Duration::from_secs(1), session);
        assert!(matches!(err, Err(ClientBuildError::InvalidBaseUrl(_))));
    }
}
