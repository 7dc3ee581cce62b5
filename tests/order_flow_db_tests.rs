//! End-to-end order/stock semantics against a real Postgres.
//!
//! Every test here is `#[ignore]`d: they need a disposable database reachable
//! through `DATABASE_URL`. Run them with
//!
//!   DATABASE_URL=postgres://... cargo test -- --ignored
//!
//! The schema is applied on connect (it is idempotent), and each test seeds
//! its own rows, so tests do not step on each other across runs.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use shopnest::db::orders::{self, NewOrder, NewOrderItem, PaymentInfo, TransitionOutcome};
use shopnest::db::{products, users};
use shopnest::errors::AppError;
use shopnest::models::{OrderStatus, Product, ShippingInfo, User};

async fn connect() -> PgPool {
  let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a disposable test database");
  let pool = PgPoolOptions::new()
    .max_connections(5)
    .connect(&url)
    .await
    .expect("failed to connect to the test database");
  sqlx::raw_sql(include_str!("../db/schema.sql"))
    .execute(&pool)
    .await
    .expect("failed to apply schema");
  pool
}

async fn seed_user(pool: &PgPool) -> User {
  let email = format!("tester-{}@example.com", Uuid::new_v4().simple());
  users::insert(pool, "Test User", &email, "not-a-real-hash")
    .await
    .unwrap()
}

async fn seed_product(pool: &PgPool, owner: &User, stock: i32) -> Product {
  products::insert(pool, "Widget", Some("A widget"), 1999, "gadgets", stock, owner.id)
    .await
    .unwrap()
}

fn checkout(items: Vec<NewOrderItem>) -> NewOrder {
  let item_price_cents: i64 = items.iter().map(|i| i.price_cents * i64::from(i.quantity)).sum();
  NewOrder {
    shipping_info: ShippingInfo {
      address: "1 Infinite Loop".into(),
      city: "Cupertino".into(),
      state: "CA".into(),
      country: "US".into(),
      postal_code: "95014".into(),
      phone: "555-0100".into(),
    },
    order_items: items,
    payment_info: PaymentInfo {
      id: "pay_test".into(),
      status: "succeeded".into(),
    },
    item_price_cents,
    tax_price_cents: 0,
    shipping_price_cents: 0,
    total_price_cents: item_price_cents,
  }
}

fn line_item(product: &Product, quantity: i32) -> NewOrderItem {
  NewOrderItem {
    product_id: product.id,
    name: product.name.clone(),
    price_cents: product.price_cents,
    quantity,
    image_url: "https://img.example/widget.png".into(),
  }
}

async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
  sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn shipping_decrements_stock_and_cancelling_restores_it() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let product = seed_product(&pool, &user, 10).await;
  let (order, _) = orders::create(&pool, user.id, &checkout(vec![line_item(&product, 3)]))
    .await
    .unwrap();

  let outcome = orders::transition_status(&pool, order.id, OrderStatus::Shipped)
    .await
    .unwrap();
  assert!(matches!(outcome, TransitionOutcome::Updated { .. }));
  assert_eq!(stock_of(&pool, product.id).await, 7);

  // Crossing back out of fulfillment puts every unit back.
  let outcome = orders::transition_status(&pool, order.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  assert!(matches!(outcome, TransitionOutcome::Updated { .. }));
  assert_eq!(stock_of(&pool, product.id).await, 10);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn same_group_transition_changes_neither_status_nor_stock() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let product = seed_product(&pool, &user, 10).await;
  let (order, _) = orders::create(&pool, user.id, &checkout(vec![line_item(&product, 3)]))
    .await
    .unwrap();

  let outcome = orders::transition_status(&pool, order.id, OrderStatus::Processing)
    .await
    .unwrap();
  match outcome {
    TransitionOutcome::NoOp { current } => assert_eq!(current, OrderStatus::Pending),
    other => panic!("expected a no-op, got {:?}", other),
  }

  assert_eq!(stock_of(&pool, product.id).await, 10);
  let detail = orders::find_detail(&pool, order.id).await.unwrap().unwrap();
  assert_eq!(detail.order.status, OrderStatus::Pending);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn insufficient_stock_rolls_back_every_line_item() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let plentiful = seed_product(&pool, &user, 5).await;
  let scarce = seed_product(&pool, &user, 2).await;
  let (order, _) = orders::create(
    &pool,
    user.id,
    &checkout(vec![line_item(&plentiful, 1), line_item(&scarce, 5)]),
  )
  .await
  .unwrap();

  let err = orders::transition_status(&pool, order.id, OrderStatus::Shipped)
    .await
    .unwrap_err();
  match err {
    AppError::InsufficientStock {
      product_id,
      available,
      requested,
    } => {
      assert_eq!(product_id, scarce.id);
      assert_eq!(available, 2);
      assert_eq!(requested, 5);
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }

  // The first line item's decrement rolled back with the transaction.
  assert_eq!(stock_of(&pool, plentiful.id).await, 5);
  assert_eq!(stock_of(&pool, scarce.id).await, 2);
  let detail = orders::find_detail(&pool, order.id).await.unwrap().unwrap();
  assert_eq!(detail.order.status, OrderStatus::Pending);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn concurrent_duplicate_transitions_move_stock_exactly_once() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let product = seed_product(&pool, &user, 10).await;
  let (order, _) = orders::create(&pool, user.id, &checkout(vec![line_item(&product, 3)]))
    .await
    .unwrap();

  let a = tokio::spawn({
    let pool = pool.clone();
    let order_id = order.id;
    async move { orders::transition_status(&pool, order_id, OrderStatus::Shipped).await }
  });
  let b = tokio::spawn({
    let pool = pool.clone();
    let order_id = order.id;
    async move { orders::transition_status(&pool, order_id, OrderStatus::Shipped).await }
  });

  let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
  let updated = outcomes
    .iter()
    .filter(|o| matches!(o, TransitionOutcome::Updated { .. }))
    .count();
  let noops = outcomes
    .iter()
    .filter(|o| matches!(o, TransitionOutcome::NoOp { .. }))
    .count();

  // The loser waits on the row lock, re-reads Shipped, and plans a no-op.
  assert_eq!(updated, 1);
  assert_eq!(noops, 1);
  assert_eq!(stock_of(&pool, product.id).await, 7);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn delivered_stamps_the_delivery_time() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let product = seed_product(&pool, &user, 10).await;
  let (order, _) = orders::create(&pool, user.id, &checkout(vec![line_item(&product, 1)]))
    .await
    .unwrap();
  assert!(order.delivered_at.is_none());

  match orders::transition_status(&pool, order.id, OrderStatus::Delivered)
    .await
    .unwrap()
  {
    TransitionOutcome::Updated { order } => {
      assert_eq!(order.status, OrderStatus::Delivered);
      assert!(order.delivered_at.is_some());
    }
    other => panic!("expected an update, got {:?}", other),
  }
  assert_eq!(stock_of(&pool, product.id).await, 9);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn completing_a_password_reset_burns_the_token_with_the_hash_swap() {
  let pool = connect().await;
  let user = seed_user(&pool).await;
  let token = Uuid::new_v4().simple().to_string();
  let expires_at = chrono::Utc::now() + chrono::Duration::minutes(15);
  users::set_reset_token(&pool, user.id, &token, expires_at).await.unwrap();

  users::complete_password_reset(&pool, user.id, "new-hash").await.unwrap();

  // One atomic statement: the new hash lands and the token is gone together.
  let reloaded = users::find_by_id(&pool, user.id).await.unwrap().unwrap();
  assert_eq!(reloaded.password_hash, "new-hash");
  assert!(users::find_by_reset_token(&pool, &token).await.unwrap().is_none());
}
