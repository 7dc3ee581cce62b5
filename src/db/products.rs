use crate::domain::ratings::ReviewAggregate;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Product, ProductImage, Review};
use sqlx::PgPool;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, rating, category, stock, \
                               review_count, user_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductFilter {
  pub keyword: Option<String>,
  pub category: Option<String>,
}

pub async fn list(pool: &PgPool, filter: &ProductFilter) -> AppResult<Vec<Product>> {
  let query = format!(
    "SELECT {} FROM products \
     WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
       AND ($2::text IS NULL OR category = $2) \
     ORDER BY name ASC",
    PRODUCT_COLUMNS
  );
  sqlx::query_as::<_, Product>(&query)
    .bind(filter.keyword.as_deref())
    .bind(filter.category.as_deref())
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn find(pool: &PgPool, id: Uuid) -> AppResult<Option<Product>> {
  let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
  sqlx::query_as::<_, Product>(&query)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn insert(
  pool: &PgPool,
  name: &str,
  description: Option<&str>,
  price_cents: i64,
  category: &str,
  stock: i32,
  owner_id: Uuid,
) -> AppResult<Product> {
  let query = format!(
    "INSERT INTO products (name, description, price_cents, category, stock, user_id) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
    PRODUCT_COLUMNS
  );
  sqlx::query_as::<_, Product>(&query)
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(category)
    .bind(stock)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn update(
  pool: &PgPool,
  id: Uuid,
  name: &str,
  description: Option<&str>,
  price_cents: i64,
  category: &str,
  stock: i32,
) -> AppResult<Option<Product>> {
  let query = format!(
    "UPDATE products SET name = $2, description = $3, price_cents = $4, category = $5, \
     stock = $6, updated_at = now() WHERE id = $1 RETURNING {}",
    PRODUCT_COLUMNS
  );
  sqlx::query_as::<_, Product>(&query)
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(category)
    .bind(stock)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Removes the product and returns its stored image references so the caller
/// can release them at the image host. Order line-item snapshots are
/// untouched: they carry their own copies of name/price/image.
pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<Option<Vec<ProductImage>>> {
  let mut tx = pool.begin().await.map_err(AppError::Sqlx)?;

  let images: Vec<ProductImage> =
    sqlx::query_as("SELECT id, product_id, public_id, url FROM product_images WHERE product_id = $1")
      .bind(id)
      .fetch_all(&mut *tx)
      .await
      .map_err(AppError::Sqlx)?;

  let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?;
  if deleted.rows_affected() == 0 {
    return Ok(None);
  }

  tx.commit().await.map_err(AppError::Sqlx)?;
  Ok(Some(images))
}

pub async fn list_images(pool: &PgPool, product_id: Uuid) -> AppResult<Vec<ProductImage>> {
  sqlx::query_as("SELECT id, product_id, public_id, url FROM product_images WHERE product_id = $1")
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn insert_image(pool: &PgPool, product_id: Uuid, public_id: &str, url: &str) -> AppResult<ProductImage> {
  sqlx::query_as(
    "INSERT INTO product_images (product_id, public_id, url) VALUES ($1, $2, $3) \
     RETURNING id, product_id, public_id, url",
  )
  .bind(product_id)
  .bind(public_id)
  .bind(url)
  .fetch_one(pool)
  .await
  .map_err(AppError::Sqlx)
}

const REVIEW_COLUMNS: &str = "id, product_id, user_id, reviewer_name, rating, comment, created_at";

pub async fn list_reviews(pool: &PgPool, product_id: Uuid) -> AppResult<Vec<Review>> {
  let query = format!(
    "SELECT {} FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
    REVIEW_COLUMNS
  );
  sqlx::query_as::<_, Review>(&query)
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Inserts or replaces the caller's review (one per user per product), then
/// re-derives the product's rating and review count from the full review
/// list inside the same transaction.
pub async fn upsert_review(
  pool: &PgPool,
  product_id: Uuid,
  user_id: Uuid,
  reviewer_name: &str,
  rating: i32,
  comment: &str,
) -> AppResult<ReviewAggregate> {
  let mut tx = pool.begin().await.map_err(AppError::Sqlx)?;

  let insert = format!(
    "INSERT INTO reviews (product_id, user_id, reviewer_name, rating, comment) \
     VALUES ($1, $2, $3, $4, $5) \
     ON CONFLICT (product_id, user_id) \
     DO UPDATE SET reviewer_name = $3, rating = $4, comment = $5, created_at = now() \
     RETURNING {}",
    REVIEW_COLUMNS
  );
  sqlx::query_as::<_, Review>(&insert)
    .bind(product_id)
    .bind(user_id)
    .bind(reviewer_name)
    .bind(rating)
    .bind(comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?;

  let aggregate = refresh_aggregate(&mut tx, product_id).await?;
  tx.commit().await.map_err(AppError::Sqlx)?;
  Ok(aggregate)
}

/// Deletes one review and re-derives the product aggregate. Returns `None`
/// when the review did not exist.
pub async fn delete_review(pool: &PgPool, product_id: Uuid, review_id: Uuid) -> AppResult<Option<ReviewAggregate>> {
  let mut tx = pool.begin().await.map_err(AppError::Sqlx)?;

  let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1 AND product_id = $2")
    .bind(review_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?;
  if deleted.rows_affected() == 0 {
    return Ok(None);
  }

  let aggregate = refresh_aggregate(&mut tx, product_id).await?;
  tx.commit().await.map_err(AppError::Sqlx)?;
  Ok(Some(aggregate))
}

pub async fn find_review(pool: &PgPool, product_id: Uuid, review_id: Uuid) -> AppResult<Option<Review>> {
  let query = format!("SELECT {} FROM reviews WHERE id = $1 AND product_id = $2", REVIEW_COLUMNS);
  sqlx::query_as::<_, Review>(&query)
    .bind(review_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Folds the full review list into the derived rating/count and persists the
/// result. Never maintained incrementally, so the stored aggregate cannot
/// drift from the rows.
async fn refresh_aggregate(
  tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
  product_id: Uuid,
) -> AppResult<ReviewAggregate> {
  let query = format!(
    "SELECT {} FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
    REVIEW_COLUMNS
  );
  let reviews: Vec<Review> = sqlx::query_as::<_, Review>(&query)
    .bind(product_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(AppError::Sqlx)?;

  let aggregate = crate::domain::ratings::recompute_aggregate(&reviews);

  sqlx::query("UPDATE products SET rating = $2, review_count = $3, updated_at = now() WHERE id = $1")
    .bind(product_id)
    .bind(aggregate.average_rating)
    .bind(aggregate.count)
    .execute(&mut **tx)
    .await
    .map_err(AppError::Sqlx)?;

  Ok(aggregate)
}
