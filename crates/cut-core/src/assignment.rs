//! 物料分配模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::demand::CompositionId;
use crate::stock::BatchId;

/// 分配記錄ID
pub type AssignmentId = u64;

/// 分配記錄：訂單明細與庫存批次之間的綁定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// 分配ID
    pub id: AssignmentId,

    /// 訂單明細ID
    pub composition_id: CompositionId,

    /// 庫存批次ID
    pub batch_id: BatchId,

    /// 已分配數量
    pub quantity: u32,

    /// 成本（從餘量轉入或補料佔位時為空）
    pub cost: Option<Decimal>,
}

impl Assignment {
    /// 創建新的分配記錄（無成本）
    pub fn new(id: AssignmentId, composition_id: CompositionId, batch_id: BatchId, quantity: u32) -> Self {
        Self {
            id,
            composition_id,
            batch_id,
            quantity,
            cost: None,
        }
    }

    /// 建構器模式：設置成本
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    /// 增加分配數量
    pub fn increase(&mut self, delta: u32) {
        self.quantity += delta;
    }

    /// 是否為補料佔位（數量為 0）
    pub fn is_placeholder(&self) -> bool {
        self.quantity == 0
    }
}
