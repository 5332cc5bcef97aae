//! Promotion catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::models::image::ImageSet;
use crate::slug::slugify;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub seller_id: Uuid,
    pub original_price: f64,
    pub discounted_price: f64,
    pub active: bool,
    pub expiry: DateTime<Utc>,
    pub image: ImageSet,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub seller: Option<Uuid>,
    pub original_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPromotion {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub seller_id: Uuid,
    pub original_price: f64,
    pub discounted_price: f64,
    pub expiry: DateTime<Utc>,
}

impl PromotionDraft {
    pub fn validate(self) -> Result<ValidatedPromotion, AppError> {
        let mut errors = Vec::new();

        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => Some(title.to_string()),
            _ => {
                errors.push(FieldError::new("title", "Promotion title is required."));
                None
            }
        };

        let seller_id = match self.seller {
            Some(id) => Some(id),
            None => {
                errors.push(FieldError::new("seller", "Seller is required."));
                None
            }
        };

        let original_price = match self.original_price {
            Some(price) if price > 0.0 => Some(price),
            Some(_) => {
                errors.push(FieldError::new(
                    "originalPrice",
                    "Original price must be positive.",
                ));
                None
            }
            None => {
                errors.push(FieldError::new(
                    "originalPrice",
                    "Original price is required.",
                ));
                None
            }
        };

        let discounted_price = match self.discounted_price {
            Some(price) if price > 0.0 => Some(price),
            Some(_) => {
                errors.push(FieldError::new(
                    "discountedPrice",
                    "Discounted price must be positive.",
                ));
                None
            }
            None => {
                errors.push(FieldError::new(
                    "discountedPrice",
                    "Discounted price is required.",
                ));
                None
            }
        };

        let expiry = match self.expiry {
            Some(expiry) => Some(expiry),
            None => {
                errors.push(FieldError::new(
                    "expiry",
                    "Promotion expiry date is required.",
                ));
                None
            }
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let title = title.expect("validated");
        let slug = slugify(&title);
        Ok(ValidatedPromotion {
            slug,
            title,
            description: self.description,
            seller_id: seller_id.expect("validated"),
            original_price: original_price.expect("validated"),
            discounted_price: discounted_price.expect("validated"),
            expiry: expiry.expect("validated"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_promotion_gets_a_slug() {
        let promo = PromotionDraft {
            title: Some("Half Price Friday".to_string()),
            seller: Some(Uuid::new_v4()),
            original_price: Some(100.0),
            discounted_price: Some(50.0),
            expiry: Some(Utc::now()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(promo.slug, "half-price-friday");
    }

    #[test]
    fn missing_fields_are_aggregated() {
        let err = PromotionDraft::default().validate().unwrap_err();
        let fields: Vec<_> = err
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["title", "seller", "originalPrice", "discountedPrice", "expiry"]
        );
    }
}
