//! 庫存批次模型

use serde::{Deserialize, Serialize};

use crate::material::{MaterialCategory, MaterialId};
use crate::placement::PanelSize;
use crate::{CutError, Result};

/// 庫存批次ID
pub type BatchId = u64;

/// 批次狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// 已入庫
    Received,
    /// 待確認（補料申請產生，尚未到貨）
    AwaitingConfirmation,
}

impl BatchStatus {
    /// 持久化時使用的狀態標籤
    pub fn label(&self) -> &'static str {
        match self {
            BatchStatus::Received => "Received",
            BatchStatus::AwaitingConfirmation => "AwaitingConfirmation",
        }
    }
}

/// 庫存批次（布料批次帶有布板尺寸，五金批次沒有）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBatch {
    /// 批次ID
    pub id: BatchId,

    /// 物料ID
    pub material_id: MaterialId,

    /// 物料名稱
    pub material_name: String,

    /// 物料類別
    pub category: MaterialCategory,

    /// 布板尺寸（僅布料）
    pub size: Option<PanelSize>,

    /// 在庫數量
    pub quantity: u32,

    /// 餘量（尚未分配給任何訂單）
    pub remainder: u32,

    /// 批次狀態
    pub status: BatchStatus,
}

impl StockBatch {
    /// 創建布料批次（餘量預設等於在庫數量）
    pub fn fabric(
        id: BatchId,
        material_id: MaterialId,
        material_name: impl Into<String>,
        size: PanelSize,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            material_id,
            material_name: material_name.into(),
            category: MaterialCategory::Fabric,
            size: Some(size),
            quantity,
            remainder: quantity,
            status: BatchStatus::Received,
        }
    }

    /// 創建五金批次（餘量預設等於在庫數量）
    pub fn hardware(
        id: BatchId,
        material_id: MaterialId,
        material_name: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            material_id,
            material_name: material_name.into(),
            category: MaterialCategory::Hardware,
            size: None,
            quantity,
            remainder: quantity,
            status: BatchStatus::Received,
        }
    }

    /// 建構器模式：設置餘量（不得超過在庫數量）
    pub fn with_remainder(mut self, remainder: u32) -> Self {
        self.remainder = remainder.min(self.quantity);
        self
    }

    /// 建構器模式：設置批次狀態
    pub fn with_status(mut self, status: BatchStatus) -> Self {
        self.status = status;
        self
    }

    /// 從餘量中扣除，回傳新的餘量
    pub fn draw(&mut self, amount: u32) -> Result<u32> {
        if amount > self.remainder {
            return Err(CutError::InsufficientRemainder {
                batch_id: self.id,
                requested: amount,
                remainder: self.remainder,
            });
        }
        self.remainder -= amount;
        Ok(self.remainder)
    }

    /// 已承諾（已分配）的數量
    pub fn committed(&self) -> u32 {
        self.quantity - self.remainder
    }

    pub fn is_pending(&self) -> bool {
        self.status == BatchStatus::AwaitingConfirmation
    }
}

/// 已分配給訂單的批次（依批次ID去重並加總數量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedBatch {
    /// 物料名稱
    pub material_name: String,

    /// 物料ID
    pub material_id: MaterialId,

    /// 物料類別
    pub category: MaterialCategory,

    /// 批次ID
    pub batch_id: BatchId,

    /// 已分配數量
    pub quantity: u32,

    /// 布板尺寸（僅布料）
    pub size: Option<PanelSize>,
}
