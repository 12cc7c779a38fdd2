//! 訂單與訂單狀態模型

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CutError, Result};

/// 訂單ID
pub type OrderId = u64;

/// 訂單狀態（僅列出裁剪引擎涉及的狀態）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 已確認
    Confirmed,
    /// 裁剪中（短缺已由庫存餘量補足）
    Cutting,
    /// 車間備妥（物料齊全）
    ReadyInWorkshop,
    /// 物料採購中（已建立補料申請）
    MaterialsOrdered,
}

impl OrderStatus {
    /// 持久化時使用的狀態標籤
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cutting => "Cutting",
            OrderStatus::ReadyInWorkshop => "ReadyInWorkshop",
            OrderStatus::MaterialsOrdered => "MaterialsOrdered",
        }
    }

    /// 從狀態標籤解析
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Cutting" => Some(OrderStatus::Cutting),
            "ReadyInWorkshop" => Some(OrderStatus::ReadyInWorkshop),
            "MaterialsOrdered" => Some(OrderStatus::MaterialsOrdered),
            _ => None,
        }
    }

    /// 是否可進行裁剪計算
    pub fn is_calculable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Cutting)
    }

    /// 檢查狀態轉換是否合法
    ///
    /// 只有可計算的狀態（已確認、裁剪中）能轉出，目標只能是三個計算結果狀態之一。
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.is_calculable()
            && matches!(
                target,
                OrderStatus::Cutting | OrderStatus::ReadyInWorkshop | OrderStatus::MaterialsOrdered
            )
    }

    /// 執行狀態轉換
    pub fn transition_to(self, target: OrderStatus) -> Result<OrderStatus> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(CutError::InvalidStatusTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 訂單
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// 訂單ID
    pub id: OrderId,

    /// 訂單狀態
    pub status: OrderStatus,

    /// 客戶名稱
    pub customer: Option<String>,

    /// 負責業務
    pub manager: Option<String>,
}

impl Order {
    /// 創建新的訂單
    pub fn new(id: OrderId, status: OrderStatus) -> Self {
        Self {
            id,
            status,
            customer: None,
            manager: None,
        }
    }

    /// 建構器模式：設置客戶
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// 建構器模式：設置負責業務
    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }
}
