//! Physical book copy (item) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ItemStatus;

/// One barcoded physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookItem {
    pub id: i64,
    pub book_id: i64,
    pub barcode: String,
    pub status: ItemStatus,
    pub location_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookItem {
    #[validate(length(min = 1, max = 100, message = "Barcode must be 1-100 characters"))]
    pub barcode: String,
    pub location_code: Option<String>,
}

/// Admin correction of an item's status (e.g. found again after LOST)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookItem {
    pub status: Option<ItemStatus>,
    pub location_code: Option<String>,
}
