//! Order types.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    /// Case-insensitive parse (`"shipped"`, `"SHIPPED"`, ...).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Order creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Assigned by the repository on insert.
    pub id: u64,
    pub order_number: String,
    pub user_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// `quantity * unit_price`
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending, not yet persisted order.
    ///
    /// Fails with `InvalidOrder` when `unit_price * quantity` does not fit a `Decimal`.
    pub fn new(order_number: String, req: NewOrder) -> Result<Self> {
        let total_amount = req
            .unit_price
            .checked_mul(Decimal::from(req.quantity))
            .ok_or_else(|| {
                Error::InvalidOrder(format!(
                    "total amount overflows for {} x {}",
                    req.quantity, req.unit_price
                ))
            })?;

        let now = Utc::now();
        Ok(Self {
            id: 0,
            order_number,
            user_id: req.user_id,
            total_amount,
            product_name: req.product_name,
            quantity: req.quantity,
            unit_price: req.unit_price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Aggregate order figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub total_amount: Decimal,
}

/// `ORD` + `yyyyMMddHHmmss` + three random digits.
pub fn generate_order_number() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD{}{:03}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
}
