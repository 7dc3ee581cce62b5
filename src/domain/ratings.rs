use crate::models::Review;

/// Derived rating state for a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewAggregate {
  pub count: i32,
  pub average_rating: f64,
}

/// Recomputes a product's review count and average rating from the full
/// review list. Always a fold over every review, never an incremental
/// update, so the stored aggregate cannot drift from the rows.
pub fn recompute_aggregate(reviews: &[Review]) -> ReviewAggregate {
  if reviews.is_empty() {
    return ReviewAggregate {
      count: 0,
      average_rating: 0.0,
    };
  }
  let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
  ReviewAggregate {
    count: reviews.len() as i32,
    average_rating: sum as f64 / reviews.len() as f64,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use uuid::Uuid;

  fn review(rating: i32) -> Review {
    Review {
      id: Uuid::new_v4(),
      product_id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      reviewer_name: "Ada".into(),
      rating,
      comment: "fine".into(),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn no_reviews_means_zero_rating() {
    let agg = recompute_aggregate(&[]);
    assert_eq!(agg.count, 0);
    assert_eq!(agg.average_rating, 0.0);
  }

  #[test]
  fn aggregate_is_count_and_mean() {
    let agg = recompute_aggregate(&[review(5), review(4), review(3)]);
    assert_eq!(agg.count, 3);
    assert!((agg.average_rating - 4.0).abs() < f64::EPSILON);
  }

  #[test]
  fn mean_is_not_an_integer_truncation() {
    let agg = recompute_aggregate(&[review(5), review(4)]);
    assert!((agg.average_rating - 4.5).abs() < f64::EPSILON);
  }
}
