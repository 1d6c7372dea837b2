//! Client reviews attached to legal-practice pages.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// A review owned by exactly one legal-practice page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientReview {
    pub id: DbId,
    pub page_id: DbId,
    pub client_name: String,
    pub client_initials: String,
    pub review_title: String,
    /// Rich text (HTML fragment).
    pub body: String,
    pub rating: i16,
    pub case_type: String,
    pub is_published: bool,
    /// Set once on creation, never updated.
    pub created_at: Timestamp,
}

/// DTO for creating a review.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClientReview {
    #[validate(length(min = 1, max = 100))]
    pub client_name: String,
    /// Derived from the client name when absent or blank.
    #[validate(length(max = 10))]
    pub client_initials: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub review_title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub case_type: String,
    #[serde(default)]
    pub is_published: bool,
}

impl NewClientReview {
    /// Validate and resolve the initials to store.
    pub fn checked_initials(&self) -> Result<String, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        validate_rating(self.rating)?;
        if self.client_name.trim().is_empty() {
            return Err(CoreError::Validation("Client name must not be empty".into()));
        }
        Ok(match self.client_initials.as_deref().map(str::trim) {
            Some(initials) if !initials.is_empty() => initials.to_string(),
            _ => initials(&self.client_name),
        })
    }

    pub fn into_review(
        self,
        id: DbId,
        page_id: DbId,
        now: Timestamp,
    ) -> Result<ClientReview, CoreError> {
        let client_initials = self.checked_initials()?;
        Ok(ClientReview {
            id,
            page_id,
            client_name: self.client_name,
            client_initials,
            review_title: self.review_title,
            body: self.body,
            rating: self.rating,
            case_type: self.case_type,
            is_published: self.is_published,
            created_at: now,
        })
    }
}

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

/// Initials from the first two words of a name, e.g. `Анна Петрова` → `А.П.`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(|c| c.to_uppercase().chain(std::iter::once('.')))
        .collect()
}

/// Order reviews most recent first (ties broken by newest id).
pub fn sort_newest_first(reviews: &mut [&ClientReview]) {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Mean rating rounded to one decimal place; `0.0` for no reviews.
pub fn average_rating(reviews: &[&ClientReview]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let mean = total as f64 / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn review(id: DbId, rating: i16, published: bool, age_days: i64) -> ClientReview {
        ClientReview {
            id,
            page_id: 1,
            client_name: "Client".into(),
            client_initials: "C.".into(),
            review_title: String::new(),
            body: "Thanks".into(),
            rating,
            case_type: String::new(),
            is_published: published,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn new_review(rating: i16) -> NewClientReview {
        NewClientReview {
            client_name: "Анна Петрова".into(),
            client_initials: None,
            review_title: "Спасибо".into(),
            body: "<p>Всё отлично</p>".into(),
            rating,
            case_type: "family".into(),
            is_published: false,
        }
    }

    #[test]
    fn initials_from_two_words() {
        assert_eq!(initials("Анна Петрова"), "А.П.");
        assert_eq!(initials("ivan"), "I.");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(new_review(6).checked_initials().is_err());
    }

    #[test]
    fn explicit_initials_win() {
        let mut input = new_review(5);
        input.client_initials = Some("A.P.".into());
        assert_eq!(input.checked_initials().unwrap(), "A.P.");
        input.client_initials = Some("  ".into());
        assert_eq!(input.checked_initials().unwrap(), "А.П.");
    }

    #[test]
    fn newest_first_breaks_ties_by_id() {
        let mut older = review(1, 5, true, 10);
        let tied = review(3, 3, true, 2);
        let mut tied_lower_id = review(2, 4, false, 2);
        tied_lower_id.created_at = tied.created_at;
        older.created_at = tied.created_at - chrono::Duration::days(8);

        let mut refs = vec![&older, &tied_lower_id, &tied];
        sort_newest_first(&mut refs);
        let ids: Vec<_> = refs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let all = [review(1, 5, true, 0), review(2, 4, true, 0), review(3, 4, true, 0)];
        let refs: Vec<_> = all.iter().collect();
        assert_eq!(average_rating(&refs), 4.3);
        assert_eq!(average_rating(&[]), 0.0);
    }
}
