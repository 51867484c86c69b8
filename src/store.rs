//! Order Store
//!
//! Trait seam over the durable order store plus the in-memory
//! implementation. All status writes go through a single atomic
//! compare-and-set so concurrent writers to the same order never
//! interleave partial field writes.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ServiceError;
use crate::order::{OrderRecord, OrderStatus, now_ms};

/// Durable order store operations
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails if the order number already exists.
    async fn insert(&self, record: OrderRecord) -> Result<(), ServiceError>;

    /// Fetch one order by order number.
    async fn get(&self, order_no: &str) -> Result<Option<OrderRecord>, ServiceError>;

    /// List the most recent orders for a principal, newest first.
    async fn list_recent(
        &self,
        principal_id: &str,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, ServiceError>;

    /// Atomically set the status pair if the current `actual_status` equals
    /// `expected`. Returns false when the guard does not match or the order
    /// is unknown.
    async fn update_status_if(
        &self,
        order_no: &str,
        expected: OrderStatus,
        status: OrderStatus,
        actual_status: OrderStatus,
    ) -> Result<bool, ServiceError>;
}

/// In-memory order store (tests, and running without PostgreSQL)
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, OrderRecord>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, record: OrderRecord) -> Result<(), ServiceError> {
        if self.orders.contains_key(&record.order_no) {
            return Err(ServiceError::Store(format!(
                "duplicate order_no: {}",
                record.order_no
            )));
        }
        self.orders.insert(record.order_no.clone(), record);
        Ok(())
    }

    async fn get(&self, order_no: &str) -> Result<Option<OrderRecord>, ServiceError> {
        Ok(self.orders.get(order_no).map(|r| r.clone()))
    }

    async fn list_recent(
        &self,
        principal_id: &str,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, ServiceError> {
        let mut result: Vec<OrderRecord> = self
            .orders
            .iter()
            .filter(|r| r.principal_id == principal_id)
            .map(|r| r.clone())
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }

    async fn update_status_if(
        &self,
        order_no: &str,
        expected: OrderStatus,
        status: OrderStatus,
        actual_status: OrderStatus,
    ) -> Result<bool, ServiceError> {
        // The shard lock held by get_mut makes the check-and-set atomic.
        match self.orders.get_mut(order_no) {
            Some(mut record) => {
                if record.actual_status != expected {
                    return Ok(false);
                }
                record.status = status;
                record.actual_status = actual_status;
                record.updated_at = now_ms();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
