//! # Cutting Core
//!
//! 核心資料模型與類型定義（物料、庫存批次、裁片需求、訂單、分配、短缺、排版結果）

pub mod assignment;
pub mod config;
pub mod demand;
pub mod material;
pub mod order;
pub mod placement;
pub mod shortage;
pub mod stock;
pub mod store;
pub mod supply;

// Re-export 主要類型
pub use assignment::{Assignment, AssignmentId};
pub use config::{CuttingConfig, PackingMode};
pub use demand::{CompositionId, OrderComposition, PieceDemand};
pub use material::{Material, MaterialCategory, MaterialId};
pub use order::{Order, OrderId, OrderStatus};
pub use placement::{fit_count, PanelCell, PanelPlacement, PanelSize, PlacedPiece};
pub use shortage::{ShortageEntry, ShortageMap};
pub use stock::{AssignedBatch, BatchId, BatchStatus, StockBatch};
pub use store::InventoryStore;
pub use supply::{IntakeId, PendingBatch, SupplyIntake};

/// 裁剪與物料分配錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CutError {
    #[error("資料庫連線失敗: {0}")]
    ConnectionFailure(String),

    #[error("查詢失敗: {0}")]
    QueryFailure(String),

    #[error("找不到訂單: {0}")]
    OrderNotFound(OrderId),

    #[error("訂單 {order_id} 狀態為 {status}，不可進行裁剪計算")]
    OrderNotEligible { order_id: OrderId, status: OrderStatus },

    #[error("無效的狀態轉換: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("資料關聯缺失 ({material}): {message}")]
    DataIntegrityGap { material: String, message: String },

    #[error("批次 {batch_id} 餘量不足：需要 {requested}, 餘量 {remainder}")]
    InsufficientRemainder {
        batch_id: BatchId,
        requested: u32,
        remainder: u32,
    },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CutError>;
