// salesdesk/server/src/models/customer.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{non_blank, STATUS_ACTIVE, STATUS_INACTIVE};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub document: Option<String>, // Tax id
  pub address: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub status: String,
  pub loyalty_points: i32,
  pub registered_at: DateTime<Utc>,
}

/// Body of both create and update. Updates replace every field; only a missing
/// `status` keeps the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPayload {
  pub name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub document: Option<String>,
  pub address: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub status: Option<String>,
}

impl CustomerPayload {
  /// Normalizes the payload, requiring a name and a known status.
  pub fn validated(self) -> Result<Self, AppError> {
    let name = non_blank(self.name).ok_or_else(|| AppError::Validation("Customer name is required".into()))?;
    let status = non_blank(self.status);
    if let Some(status) = status.as_deref() {
      if status != STATUS_ACTIVE && status != STATUS_INACTIVE {
        return Err(AppError::Validation(format!(
          "Invalid status '{}': expected active or inactive",
          status
        )));
      }
    }
    Ok(Self {
      name: Some(name),
      email: non_blank(self.email),
      phone: non_blank(self.phone),
      document: non_blank(self.document),
      address: non_blank(self.address),
      city: non_blank(self.city),
      state: non_blank(self.state),
      status,
    })
  }
}
