//! Typed endpoint calls over the request gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views call these instead of building paths by hand. Each method maps to
//! one method + path pair; query strings carry only the non-empty filters.

pub mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::gateway::{GatewayError, Method, RequestGateway};
use crate::session::{AuthSessionRecord, SessionGrant};
use types::{
    BookingDetail, FarmStaySummary, LoginRequest, RecommendationFilters, RegisterRequest, RoomSummary, SearchFilters,
};

const LOGIN: &str = "/api/auth/login";
const REGISTER: &str = "/api/auth/register";
const OVERVIEW: &str = "/api/home/overview";
const RECOMMENDATIONS: &str = "/api/home/recommendations";
const FARMSTAYS: &str = "/api/farmstays";
const FARMSTAY_SEARCH: &str = "/api/farmstays/search/";
const ROOMS: &str = "/api/rooms";
const BOOKINGS: &str = "/api/bookings";
const REVIEWS: &str = "/api/reviews";
const COUPONS: &str = "/api/coupons";

/// Append the non-empty `params` to `path` as a form-encoded query string.
pub(crate) fn with_query(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            query.append_pair(name, value);
            any = true;
        }
    }
    if any { format!("{path}?{}", query.finish()) } else { path.to_owned() }
}

pub struct FarmstayApi {
    gateway: RequestGateway,
}

impl FarmstayApi {
    #[must_use]
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.gateway.call(path, Method::Get).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, GatewayError> {
        self.gateway.send(path, Method::Post, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, GatewayError> {
        self.gateway.send(path, Method::Put, Some(body)).await
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the gateway failure, e.g. rejected credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionGrant, GatewayError> {
        self.post(LOGIN, request).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure, e.g. a taken username.
    pub async fn register(&self, request: &RegisterRequest) -> Result<SessionGrant, GatewayError> {
        self.post(REGISTER, request).await
    }

    /// Log in and persist the resulting session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; nothing is stored on failure.
    pub async fn login_and_store(&self, request: &LoginRequest) -> Result<AuthSessionRecord, GatewayError> {
        let grant = self.login(request).await?;
        Ok(self
            .gateway
            .session()
            .establish(grant, Some(request.username.clone()), None))
    }

    /// Register and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; nothing is stored on failure.
    pub async fn register_and_store(&self, request: &RegisterRequest) -> Result<AuthSessionRecord, GatewayError> {
        let grant = self.register(request).await?;
        Ok(self
            .gateway
            .session()
            .establish(grant, Some(request.username.clone()), request.display_name.clone()))
    }

    pub fn logout(&self) {
        self.gateway.session().clear();
        tracing::info!("logged out");
    }

    // =========================================================================
    // HOME / LISTINGS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn overview(&self) -> Result<Value, GatewayError> {
        self.get(OVERVIEW).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn recommendations(&self, filters: &RecommendationFilters) -> Result<Vec<FarmStaySummary>, GatewayError> {
        let path = with_query(
            RECOMMENDATIONS,
            &[
                ("city", filters.city.as_deref()),
                ("priceLevel", filters.price_level.as_deref()),
                ("tag", filters.tag.as_deref()),
            ],
        );
        self.get(&path).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn search_farmstays(&self, filters: &SearchFilters) -> Result<Vec<FarmStaySummary>, GatewayError> {
        let path = with_query(
            FARMSTAY_SEARCH,
            &[
                ("city", filters.city.as_deref()),
                ("keyword", filters.keyword.as_deref()),
                ("priceLevel", filters.price_level.as_deref()),
                ("tag", filters.tag.as_deref()),
            ],
        );
        self.get(&path).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn farmstay_detail(&self, id: i64) -> Result<Value, GatewayError> {
        self.get(&format!("{FARMSTAYS}/{id}")).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn create_farmstay(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.post(FARMSTAYS, payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn update_farmstay(&self, id: i64, payload: &Value) -> Result<Value, GatewayError> {
        self.put(&format!("{FARMSTAYS}/{id}"), payload).await
    }

    // =========================================================================
    // ROOMS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn list_rooms(&self, farm_stay_id: i64) -> Result<Vec<RoomSummary>, GatewayError> {
        let id = farm_stay_id.to_string();
        self.get(&with_query(ROOMS, &[("farmStayId", Some(id.as_str()))]))
            .await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn create_room(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.post(ROOMS, payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn update_room(&self, id: i64, payload: &Value) -> Result<Value, GatewayError> {
        self.put(&format!("{ROOMS}/{id}"), payload).await
    }

    // =========================================================================
    // BOOKINGS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn create_booking(&self, payload: &Value) -> Result<BookingDetail, GatewayError> {
        self.post(BOOKINGS, payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn pay_booking(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.post(&format!("{BOOKINGS}/pay"), payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn cancel_booking(&self, order_id: i64) -> Result<Value, GatewayError> {
        self.gateway
            .call(&format!("{BOOKINGS}/{order_id}/cancel"), Method::Post)
            .await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn update_booking_status(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.put(&format!("{BOOKINGS}/status"), payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn my_bookings(&self) -> Result<Vec<BookingDetail>, GatewayError> {
        self.get(&format!("{BOOKINGS}/mine")).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn owner_bookings(&self, farm_stay_id: i64) -> Result<Vec<BookingDetail>, GatewayError> {
        let id = farm_stay_id.to_string();
        self.get(&with_query(BOOKINGS, &[("farmStayId", Some(id.as_str()))]))
            .await
    }

    // =========================================================================
    // REVIEWS / COUPONS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn list_reviews(&self, farm_stay_id: i64) -> Result<Value, GatewayError> {
        let id = farm_stay_id.to_string();
        self.get(&with_query(REVIEWS, &[("farmStayId", Some(id.as_str()))]))
            .await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn create_review(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.post(REVIEWS, payload).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn moderate_review(&self, id: i64, status: &str) -> Result<Value, GatewayError> {
        let path = with_query(&format!("{REVIEWS}/{id}/status"), &[("status", Some(status))]);
        self.gateway.call(&path, Method::Put).await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn list_coupons(&self, farm_stay_id: Option<i64>) -> Result<Value, GatewayError> {
        let id = farm_stay_id.map(|id| id.to_string());
        self.get(&with_query(COUPONS, &[("farmStayId", id.as_deref())]))
            .await
    }

    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn create_coupon(&self, payload: &Value) -> Result<Value, GatewayError> {
        self.post(COUPONS, payload).await
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
