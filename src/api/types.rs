//! Per-endpoint request and response schemas.
//!
//! Shapes the backend owns outright (listing edits, review and coupon
//! bodies, the home overview) travel as `serde_json::Value`.

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub user_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

// =============================================================================
// LISTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmStaySummary {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated tag list, as the backend stores it.
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: i64,
    #[serde(default)]
    pub farm_stay_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bed_type: Option<String>,
    #[serde(default)]
    pub max_guests: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub id: i64,
    pub order_no: String,
    pub status: String,
    #[serde(default)]
    pub check_in_date: Option<String>,
    #[serde(default)]
    pub check_out_date: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub farm_stay_id: Option<i64>,
    #[serde(default)]
    pub farm_stay: Option<FarmStaySummary>,
    #[serde(default)]
    pub room: Option<RoomSummary>,
    #[serde(default)]
    pub reviewed: Option<bool>,
}

// =============================================================================
// FILTERS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilters {
    pub city: Option<String>,
    pub price_level: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub keyword: Option<String>,
    pub price_level: Option<String>,
    pub tag: Option<String>,
}
