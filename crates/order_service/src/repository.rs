//! Order persistence collaborator.

use crate::order::{Order, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage for orders. Lookups return `None`/empty rather than errors.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order, assigning its id.
    async fn insert(&self, order: Order) -> Order;

    async fn find_by_id(&self, id: u64) -> Option<Order>;

    async fn find_all(&self) -> Vec<Order>;

    async fn find_by_user_id(&self, user_id: u64) -> Vec<Order>;

    async fn find_by_order_number(&self, order_number: &str) -> Option<Order>;

    async fn find_by_status(&self, status: OrderStatus) -> Vec<Order>;

    /// Set the status of an existing order.
    async fn update_status(&self, id: u64, status: OrderStatus) -> Option<Order>;

    /// Remove an order. Returns whether it existed.
    async fn delete(&self, id: u64) -> bool;

    async fn count(&self) -> u64;

    async fn sum_total_amount(&self) -> Decimal;
}

/// DashMap-backed [`OrderRepository`].
#[derive(Debug)]
pub struct InMemoryOrderRepository {
    orders: DashMap<u64, Order>,
    next_id: AtomicU64,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn collect_where(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| predicate(o.value()))
            .map(|o| o.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        orders
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, mut order: Order) -> Order {
        order.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.orders.insert(order.id, order.clone());
        order
    }

    async fn find_by_id(&self, id: u64) -> Option<Order> {
        self.orders.get(&id).map(|o| o.clone())
    }

    async fn find_all(&self) -> Vec<Order> {
        self.collect_where(|_| true)
    }

    async fn find_by_user_id(&self, user_id: u64) -> Vec<Order> {
        self.collect_where(|o| o.user_id == user_id)
    }

    async fn find_by_order_number(&self, order_number: &str) -> Option<Order> {
        self.orders
            .iter()
            .find(|o| o.order_number == order_number)
            .map(|o| o.value().clone())
    }

    async fn find_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.collect_where(|o| o.status == status)
    }

    async fn update_status(&self, id: u64, status: OrderStatus) -> Option<Order> {
        let mut order = self.orders.get_mut(&id)?;
        order.status = status;
        order.updated_at = Utc::now();
        Some(order.clone())
    }

    async fn delete(&self, id: u64) -> bool {
        self.orders.remove(&id).is_some()
    }

    async fn count(&self) -> u64 {
        self.orders.len() as u64
    }

    async fn sum_total_amount(&self) -> Decimal {
        self.orders
            .iter()
            .fold(Decimal::ZERO, |sum, o| sum.saturating_add(o.total_amount))
    }
}
