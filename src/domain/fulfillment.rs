//! The order fulfillment boundary and its effect on inventory.
//!
//! Stock moves only when an order *crosses* the fulfillment boundary, not on
//! every status change: a `Shipped` or `Delivered` order has physically left
//! warehouse inventory, while `Pending`, `Processing`, and `Cancelled` orders
//! have not. Crossing forward decrements each line item's product stock by
//! its quantity; crossing back (e.g. a shipped order being cancelled)
//! restores exactly that quantity. A move within one group is a no-op that
//! does not even persist the requested status.

use crate::models::{OrderItem, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
  /// `Pending`, `Processing`, `Cancelled`: inventory still in the warehouse.
  PreFulfillment,
  /// `Shipped`, `Delivered`: inventory has left the warehouse.
  Fulfillment,
}

impl StatusGroup {
  pub fn of(status: OrderStatus) -> Self {
    match status {
      OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Cancelled => StatusGroup::PreFulfillment,
      OrderStatus::Shipped | OrderStatus::Delivered => StatusGroup::Fulfillment,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
  Increase,
  Decrease,
}

/// One inventory mutation owed to a single line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
  pub product_id: uuid::Uuid,
  pub quantity: i32,
  pub direction: StockDirection,
}

/// What a requested status transition must do, decided up front so the
/// database layer can apply the whole plan in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPlan {
  /// Same-group transition: no stock effect, stored status left untouched.
  NoOp,
  Apply {
    adjustments: Vec<StockAdjustment>,
    /// True when the requested status is `Delivered`.
    stamp_delivered_at: bool,
  },
}

/// Plans the transition from `current` to `requested` for the given line
/// items. Pure: performs no bounds checking against live stock counts; the
/// executor enforces `stock >= quantity` atomically on each decrement.
pub fn plan_transition(current: OrderStatus, requested: OrderStatus, items: &[OrderItem]) -> TransitionPlan {
  let direction = match (StatusGroup::of(current), StatusGroup::of(requested)) {
    (StatusGroup::PreFulfillment, StatusGroup::Fulfillment) => StockDirection::Decrease,
    (StatusGroup::Fulfillment, StatusGroup::PreFulfillment) => StockDirection::Increase,
    _ => return TransitionPlan::NoOp,
  };

  let adjustments = items
    .iter()
    .map(|item| StockAdjustment {
      product_id: item.product_id,
      quantity: item.quantity,
      direction,
    })
    .collect();

  TransitionPlan::Apply {
    adjustments,
    stamp_delivered_at: requested == OrderStatus::Delivered,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn item(product_id: Uuid, quantity: i32) -> OrderItem {
    OrderItem {
      id: Uuid::new_v4(),
      order_id: Uuid::new_v4(),
      product_id,
      name: "Widget".into(),
      price_cents: 1999,
      quantity,
      image_url: "https://img.example/widget.png".into(),
    }
  }

  #[test]
  fn grouping_matches_the_fulfillment_boundary() {
    assert_eq!(StatusGroup::of(OrderStatus::Pending), StatusGroup::PreFulfillment);
    assert_eq!(StatusGroup::of(OrderStatus::Processing), StatusGroup::PreFulfillment);
    assert_eq!(StatusGroup::of(OrderStatus::Cancelled), StatusGroup::PreFulfillment);
    assert_eq!(StatusGroup::of(OrderStatus::Shipped), StatusGroup::Fulfillment);
    assert_eq!(StatusGroup::of(OrderStatus::Delivered), StatusGroup::Fulfillment);
  }

  #[test]
  fn same_group_transitions_move_no_stock() {
    let items = vec![item(Uuid::new_v4(), 3)];
    assert_eq!(
      plan_transition(OrderStatus::Pending, OrderStatus::Processing, &items),
      TransitionPlan::NoOp
    );
    assert_eq!(
      plan_transition(OrderStatus::Processing, OrderStatus::Cancelled, &items),
      TransitionPlan::NoOp
    );
    assert_eq!(
      plan_transition(OrderStatus::Shipped, OrderStatus::Delivered, &items),
      TransitionPlan::NoOp
    );
    assert_eq!(
      plan_transition(OrderStatus::Pending, OrderStatus::Pending, &items),
      TransitionPlan::NoOp
    );
  }

  #[test]
  fn crossing_into_fulfillment_decrements_each_line_item_quantity() {
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let items = vec![item(p1, 3), item(p2, 1)];

    match plan_transition(OrderStatus::Pending, OrderStatus::Shipped, &items) {
      TransitionPlan::Apply {
        adjustments,
        stamp_delivered_at,
      } => {
        assert!(!stamp_delivered_at);
        assert_eq!(
          adjustments,
          vec![
            StockAdjustment {
              product_id: p1,
              quantity: 3,
              direction: StockDirection::Decrease
            },
            StockAdjustment {
              product_id: p2,
              quantity: 1,
              direction: StockDirection::Decrease
            },
          ]
        );
      }
      other => panic!("expected Apply, got {:?}", other),
    }
  }

  #[test]
  fn crossing_back_restores_the_same_quantities() {
    let p1 = Uuid::new_v4();
    let items = vec![item(p1, 4)];

    // A shipped order being cancelled returns inventory to the warehouse.
    match plan_transition(OrderStatus::Shipped, OrderStatus::Cancelled, &items) {
      TransitionPlan::Apply {
        adjustments,
        stamp_delivered_at,
      } => {
        assert!(!stamp_delivered_at);
        assert_eq!(adjustments[0].direction, StockDirection::Increase);
        assert_eq!(adjustments[0].quantity, 4);
      }
      other => panic!("expected Apply, got {:?}", other),
    }
  }

  #[test]
  fn delivery_is_stamped_only_for_the_delivered_status() {
    let items = vec![item(Uuid::new_v4(), 1)];
    let to_delivered = plan_transition(OrderStatus::Processing, OrderStatus::Delivered, &items);
    let to_shipped = plan_transition(OrderStatus::Processing, OrderStatus::Shipped, &items);

    assert!(matches!(to_delivered, TransitionPlan::Apply { stamp_delivered_at: true, .. }));
    assert!(matches!(to_shipped, TransitionPlan::Apply { stamp_delivered_at: false, .. }));
  }

  #[test]
  fn decrease_then_increase_round_trips_stock() {
    // Simulate the executor against an in-memory counter to check the
    // round-trip invariant: Pending -> Shipped -> Cancelled restores stock.
    let product = Uuid::new_v4();
    let items = vec![item(product, 3)];
    let mut stock: i32 = 10;

    for (from, to) in [
      (OrderStatus::Pending, OrderStatus::Shipped),
      (OrderStatus::Shipped, OrderStatus::Cancelled),
    ] {
      if let TransitionPlan::Apply { adjustments, .. } = plan_transition(from, to, &items) {
        for adj in adjustments {
          match adj.direction {
            StockDirection::Decrease => stock -= adj.quantity,
            StockDirection::Increase => stock += adj.quantity,
          }
        }
      }
    }

    assert_eq!(stock, 10);
  }
}
