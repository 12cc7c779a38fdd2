//! # Cutting Calculation Engine
//!
//! 裁剪排版與物料分配引擎：需求彙總 → 布板排版 → 庫存對帳 → 短缺分配 → 訂單狀態

pub mod aggregator;
pub mod allocation;
pub mod engine;
pub mod packer;
pub mod presenter;
pub mod reconcile;
pub mod session;
pub mod shelf;
pub mod status;
pub mod supply_request;

// Re-export 主要類型
pub use aggregator::{FabricDemand, HardwareTally, MaterialDemand, MaterialDemandAggregator, OrderOverview};
pub use allocation::{
    AllocationDecision, AllocationReport, AllocationResolver, Deficit, MaterialDrawPlan, RemainderDraw,
};
pub use engine::{CuttingEngine, CuttingPlan};
pub use packer::{MaterialPackResult, PanelPack, PanelPacker, PieceSlot, UnplaceableDemand};
pub use presenter::{LogPresenter, Presenter};
pub use reconcile::{InventoryReconciler, Reconciliation};
pub use session::AllocationSession;
pub use status::{OrderStatusMachine, StatusTrigger};
pub use supply_request::{
    CreatedRequest, SupplyPlan, SupplyReport, SupplyRequestGenerator, SupplyRequestLine,
};

use cut_core::{OrderId, OrderStatus};

/// 裁剪計算結果
#[derive(Debug, Clone)]
pub struct CalculationReport {
    /// 計算工作階段ID
    pub session_id: uuid::Uuid,

    /// 訂單ID
    pub order_id: OrderId,

    /// 各布料的排版結果
    pub packs: Vec<MaterialPackResult>,

    /// 庫存對帳結果
    pub reconciliation: Reconciliation,

    /// 分配結果
    pub outcome: AllocationOutcome,

    /// 計算前的訂單狀態
    pub previous_status: OrderStatus,

    /// 計算後的訂單狀態
    pub final_status: OrderStatus,

    /// 警告信息
    pub warnings: Vec<CalcWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CalculationReport {
    /// 某布料需要的布板數
    pub fn panels_required(&self, material_name: &str) -> Option<u32> {
        self.packs
            .iter()
            .find(|p| p.material_name == material_name)
            .map(|p| p.panels_required)
    }

    /// 所有裁片是否都已排入布板
    pub fn fully_placed(&self) -> bool {
        self.reconciliation.unplaceable.is_empty()
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: CalcWarning) {
        self.warnings.push(warning);
    }

    /// 訂單狀態是否改變
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.final_status
    }
}

/// 分配結果
#[derive(Debug, Clone)]
pub enum AllocationOutcome {
    /// 無短缺，物料齊全
    Satisfied,
    /// 短缺已由庫存餘量補足
    ResolvedFromRemainder(AllocationReport),
    /// 餘量不足，使用者確認後已建立補料申請
    SupplyRequested(SupplyReport),
    /// 餘量不足，使用者拒絕建立補料申請
    Declined(Vec<Deficit>),
}

/// 因資料關聯缺失而略過的物料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMaterial {
    pub material_name: String,
    pub reason: String,
}

/// 計算警告
#[derive(Debug, Clone)]
pub struct CalcWarning {
    pub material_name: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CalcWarning {
    pub fn new(material_name: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            material_name,
            message,
            severity,
        }
    }

    pub fn info(material_name: String, message: String) -> Self {
        Self::new(material_name, message, WarningSeverity::Info)
    }

    pub fn warning(material_name: String, message: String) -> Self {
        Self::new(material_name, message, WarningSeverity::Warning)
    }

    pub fn error(material_name: String, message: String) -> Self {
        Self::new(material_name, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
