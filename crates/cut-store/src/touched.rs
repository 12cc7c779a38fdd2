//! 交易內異動列追蹤

use cut_core::{AssignmentId, BatchId, OrderId};
use std::collections::BTreeSet;

/// 異動列追蹤器：記錄目前交易中被寫入的批次、分配與訂單
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchedRows {
    batches: BTreeSet<BatchId>,
    assignments: BTreeSet<AssignmentId>,
    orders: BTreeSet<OrderId>,
}

impl TouchedRows {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記批次已異動
    pub fn mark_batch(&mut self, batch_id: BatchId) {
        self.batches.insert(batch_id);
    }

    /// 標記分配記錄已異動
    pub fn mark_assignment(&mut self, assignment_id: AssignmentId) {
        self.assignments.insert(assignment_id);
    }

    /// 標記訂單已異動
    pub fn mark_order(&mut self, order_id: OrderId) {
        self.orders.insert(order_id);
    }

    pub fn is_batch_touched(&self, batch_id: BatchId) -> bool {
        self.batches.contains(&batch_id)
    }

    pub fn batches(&self) -> Vec<BatchId> {
        self.batches.iter().copied().collect()
    }

    pub fn assignments(&self) -> Vec<AssignmentId> {
        self.assignments.iter().copied().collect()
    }

    pub fn orders(&self) -> Vec<OrderId> {
        self.orders.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty() && self.assignments.is_empty() && self.orders.is_empty()
    }

    /// 清除所有標記
    pub fn clear(&mut self) {
        self.batches.clear();
        self.assignments.clear();
        self.orders.clear();
    }
}
