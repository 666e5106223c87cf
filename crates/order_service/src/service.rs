//! Order business logic.

use crate::error::Result;
use crate::order::{generate_order_number, NewOrder, Order, OrderStatistics, OrderStatus};
use crate::repository::OrderRepository;
use crate::user_client::ResilientUserClient;
use common::ServiceHealth;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Order lifecycle on top of an [`OrderRepository`].
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    users: ResilientUserClient,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, users: ResilientUserClient) -> Self {
        Self { orders, users }
    }

    pub async fn list_orders(&self) -> Vec<Order> {
        self.orders.find_all().await
    }

    pub async fn get_order(&self, id: u64) -> Option<Order> {
        self.orders.find_by_id(id).await
    }

    pub async fn orders_for_user(&self, user_id: u64) -> Vec<Order> {
        self.orders.find_by_user_id(user_id).await
    }

    pub async fn order_by_number(&self, order_number: &str) -> Option<Order> {
        self.orders.find_by_order_number(order_number).await
    }

    /// Orders in `status`, given by name (case-insensitive).
    pub async fn orders_by_status(&self, status: &str) -> Result<Vec<Order>> {
        let status: OrderStatus = status.parse()?;
        Ok(self.orders.find_by_status(status).await)
    }

    /// Create a pending order.
    ///
    /// The user is looked up, but only advisorily: when the user service
    /// answers with the placeholder user the order is still created and a
    /// warning is logged. Fails with `InvalidOrder` if the total amount
    /// cannot be computed.
    pub async fn create_order(&self, req: NewOrder) -> Result<Order> {
        let order = Order::new(generate_order_number(), req)?;

        let user = self.users.fetch_by_id(order.user_id).await;
        if user.is_unavailable() {
            warn!(
                "Could not verify user {}, user service may be unavailable; creating order anyway",
                order.user_id
            );
            counter!("orders_unverified_user_total").increment(1);
        } else {
            debug!("Verified user {} ({})", user.id, user.username);
        }

        let order = self.orders.insert(order).await;

        info!(
            "Created order {} ({}) for user {}: {} x {} = {}",
            order.id,
            order.order_number,
            order.user_id,
            order.quantity,
            order.product_name,
            order.total_amount
        );
        counter!("orders_created_total").increment(1);

        Ok(order)
    }

    /// Set an order's status from its textual name.
    ///
    /// `Ok(None)` if the order does not exist; `Err(InvalidStatus)` if it
    /// exists and `status` names no known status.
    pub async fn update_status(&self, id: u64, status: &str) -> Result<Option<Order>> {
        if self.orders.find_by_id(id).await.is_none() {
            return Ok(None);
        }
        let status: OrderStatus = status.parse()?;
        let updated = self.orders.update_status(id, status).await;
        if let Some(order) = &updated {
            info!("Order {} is now {}", order.id, order.status);
        }
        Ok(updated)
    }

    pub async fn cancel_order(&self, id: u64) -> Option<Order> {
        let cancelled = self.orders.update_status(id, OrderStatus::Cancelled).await;
        if cancelled.is_some() {
            info!("Order {} cancelled", id);
        }
        cancelled
    }

    /// Returns whether the order existed.
    pub async fn delete_order(&self, id: u64) -> bool {
        self.orders.delete(id).await
    }

    pub async fn statistics(&self) -> OrderStatistics {
        OrderStatistics {
            total_orders: self.orders.count().await,
            total_amount: self.orders.sum_total_amount().await,
        }
    }

    /// Health of the user service as seen through the resilient client.
    pub async fn user_service_health(&self) -> ServiceHealth {
        self.users.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::repository::InMemoryOrderRepository;
    use crate::user_client::tests::UnreachableLookup;
    use crate::user_client::{UserLookup, USER_SERVICE_NAME};
    use async_trait::async_trait;
    use common::UserDto;
    use rust_decimal::Decimal;
    use std::time::Duration;

    struct KnownUsers;

    #[async_trait]
    impl UserLookup for KnownUsers {
        async fn fetch_by_id(&self, id: u64) -> Result<UserDto> {
            Ok(UserDto {
                id,
                username: format!("user{}", id),
                email: format!("user{}@example.com", id),
                full_name: None,
                phone_number: None,
                created_at: None,
                updated_at: None,
            })
        }

        async fn health(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::up(USER_SERVICE_NAME, "1.0.0"))
        }
    }

    fn service(live: Arc<dyn UserLookup>) -> OrderService {
        OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            ResilientUserClient::new(live, Duration::from_secs(1)),
        )
    }

    fn new_order(user_id: u64) -> NewOrder {
        NewOrder {
            user_id,
            product_name: "Keyboard".to_string(),
            quantity: 2,
            unit_price: Decimal::new(4999, 2),
        }
    }

    #[tokio::test]
    async fn test_create_order_with_verified_user() {
        let service = service(Arc::new(KnownUsers));
        let order = service.create_order(new_order(1)).await.unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Decimal::new(9998, 2));
        assert_eq!(service.get_order(1).await, Some(order));
    }

    #[tokio::test]
    async fn test_create_order_when_user_service_down() {
        let service = service(Arc::new(UnreachableLookup));
        let order = service.create_order(new_order(42)).await.unwrap();

        assert_eq!(order.user_id, 42);
        assert_eq!(service.orders_for_user(42).await.len(), 1);
        assert!(service.order_by_number(&order.order_number).await.is_some());
    }

    #[tokio::test]
    async fn test_update_status() {
        let service = service(Arc::new(KnownUsers));
        let order = service.create_order(new_order(1)).await.unwrap();

        let updated = service.update_status(order.id, "shipped").await.unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);

        let err = service.update_status(order.id, "teleported").await.unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(_)));
        assert_eq!(service.get_order(order.id).await.unwrap().status, OrderStatus::Shipped);

        assert!(service.update_status(999, "SHIPPED").await.unwrap().is_none());
        assert!(service.update_status(999, "teleported").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_delete_and_statistics() {
        let service = service(Arc::new(KnownUsers));
        let first = service.create_order(new_order(1)).await.unwrap();
        service.create_order(new_order(2)).await.unwrap();

        let stats = service.statistics().await;
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_amount, Decimal::new(19996, 2));

        let cancelled = service.cancel_order(first.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(service.cancel_order(999).await.is_none());

        assert!(service.delete_order(first.id).await);
        assert!(!service.delete_order(first.id).await);
        assert_eq!(service.statistics().await.total_orders, 1);
    }

    #[tokio::test]
    async fn test_create_order_rejects_overflowing_total() {
        let service = service(Arc::new(KnownUsers));
        let req = NewOrder {
            unit_price: Decimal::MAX,
            ..new_order(1)
        };

        let err = service.create_order(req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOrder(_)));
        assert!(service.list_orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_orders_by_status() {
        let service = service(Arc::new(KnownUsers));
        let first = service.create_order(new_order(1)).await.unwrap();
        service.create_order(new_order(2)).await.unwrap();
        service.cancel_order(first.id).await.unwrap();

        let cancelled = service.orders_by_status("cancelled").await.unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, first.id);
        assert_eq!(service.orders_by_status("PENDING").await.unwrap().len(), 1);
        assert!(service.orders_by_status("DELIVERED").await.unwrap().is_empty());

        let err = service.orders_by_status("lost").await.unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn test_user_service_health() {
        assert!(service(Arc::new(KnownUsers)).user_service_health().await.is_up());

        let down = service(Arc::new(UnreachableLookup)).user_service_health().await;
        assert_eq!(down.service, "user-service");
        assert!(!down.is_up());
    }
}
