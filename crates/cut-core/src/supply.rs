//! 補料申請模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::material::MaterialId;
use crate::stock::BatchStatus;

/// 入庫申請ID
pub type IntakeId = u64;

/// 入庫申請（補料單表頭）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyIntake {
    /// 申請ID（持久化後回填）
    pub id: Option<IntakeId>,

    /// 申請人
    pub requester_id: u64,

    /// 供應商（建立時尚未指定）
    pub supplier_id: Option<u64>,

    /// 總金額
    pub total_amount: Decimal,

    /// 申請日期
    pub date: NaiveDate,
}

impl SupplyIntake {
    /// 創建尚未指定供應商、金額為 0 的申請
    pub fn new(requester_id: u64, date: NaiveDate) -> Self {
        Self {
            id: None,
            requester_id,
            supplier_id: None,
            total_amount: Decimal::ZERO,
            date,
        }
    }
}

/// 待到貨批次（補料單明細）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatch {
    /// 所屬入庫申請
    pub intake_id: IntakeId,

    /// 物料ID
    pub material_id: MaterialId,

    /// 物料名稱
    pub material_name: String,

    /// 申請數量
    pub quantity: u32,

    /// 批次狀態
    pub status: BatchStatus,

    /// 餘量（到貨確認前不可用）
    pub remainder: u32,
}

impl PendingBatch {
    /// 創建待確認批次，餘量為 0
    pub fn new(
        intake_id: IntakeId,
        material_id: MaterialId,
        material_name: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            intake_id,
            material_id,
            material_name: material_name.into(),
            quantity,
            status: BatchStatus::AwaitingConfirmation,
            remainder: 0,
        }
    }
}
