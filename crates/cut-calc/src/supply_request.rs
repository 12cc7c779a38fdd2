//! 補料申請
//!
//! `propose` 依短缺表產生補料計劃供使用者確認，確認後 `commit` 寫入入庫申請、
//! 待到貨批次與佔位分配（呼叫方負責交易範圍）。

use chrono::NaiveDate;
use cut_core::{
    AssignmentId, BatchId, CutError, CuttingConfig, IntakeId, InventoryStore, OrderId,
    PendingBatch, Result, ShortageMap, SupplyIntake,
};
use uuid::Uuid;

use crate::session::AllocationSession;
use crate::SkippedMaterial;

/// 補料明細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyRequestLine {
    pub material_name: String,
    pub quantity: u32,
}

/// 補料計劃（待確認）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyPlan {
    pub session_id: Uuid,
    pub order_id: OrderId,

    /// 申請人
    pub requester_id: u64,

    /// 申請日期
    pub date: NaiveDate,

    /// 依物料名稱排序的明細
    pub lines: Vec<SupplyRequestLine>,
}

impl SupplyPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 申請總數量
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// 確認對話框使用的明細文字（每行 `物料: 數量`）
    pub fn details(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.material_name, l.quantity))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 已建立的補料申請
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRequest {
    pub material_name: String,
    pub intake_id: IntakeId,
    pub batch_id: BatchId,
    pub quantity: u32,

    /// 佔位分配（訂單沒有明細時為 `None`）
    pub placeholder: Option<AssignmentId>,
}

/// 補料申請執行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyReport {
    pub created: Vec<CreatedRequest>,

    /// 找不到物料而略過的明細
    pub skipped: Vec<SkippedMaterial>,
}

impl SupplyReport {
    /// 缺少佔位分配的申請
    pub fn missing_placeholders(&self) -> impl Iterator<Item = &CreatedRequest> {
        self.created.iter().filter(|c| c.placeholder.is_none())
    }
}

/// 補料申請產生器
pub struct SupplyRequestGenerator;

impl SupplyRequestGenerator {
    /// 依短缺表產生補料計劃（不讀寫存儲）
    pub fn propose(
        session: &AllocationSession,
        shortage: &ShortageMap,
        config: &CuttingConfig,
    ) -> SupplyPlan {
        SupplyPlan {
            session_id: session.id,
            order_id: session.order_id(),
            requester_id: config.requester_id,
            date: session.today,
            lines: shortage
                .iter()
                .map(|(material_name, quantity)| SupplyRequestLine {
                    material_name: material_name.to_string(),
                    quantity,
                })
                .collect(),
        }
    }

    /// 寫入補料計劃
    ///
    /// 每筆明細建立一張入庫申請、一個待確認批次（餘量 0）與一筆數量 0 的佔位分配。
    /// 找不到物料的明細略過；訂單沒有明細時只略過佔位分配。
    pub fn commit<S: InventoryStore>(store: &mut S, plan: &SupplyPlan) -> Result<SupplyReport> {
        let mut report = SupplyReport::default();
        let composition_id = store.find_order_composition(plan.order_id, None)?;

        for line in &plan.lines {
            let material = match store.find_material(&line.material_name)? {
                Some(material) => material,
                None => {
                    let gap = CutError::DataIntegrityGap {
                        material: line.material_name.clone(),
                        message: "找不到物料".to_string(),
                    };
                    tracing::warn!("{}，略過補料申請", gap);
                    report.skipped.push(SkippedMaterial {
                        material_name: line.material_name.clone(),
                        reason: gap.to_string(),
                    });
                    continue;
                }
            };

            let intake_id = store.create_intake(&SupplyIntake::new(plan.requester_id, plan.date))?;
            let batch_id = store.create_pending_batch(&PendingBatch::new(
                intake_id,
                material.id,
                material.name.clone(),
                line.quantity,
            ))?;

            let placeholder = match composition_id {
                Some(composition_id) => Some(store.create_assignment(composition_id, batch_id, 0)?),
                None => {
                    tracing::warn!(
                        "訂單 {} 沒有明細，批次 {} 不建立佔位分配",
                        plan.order_id,
                        batch_id
                    );
                    None
                }
            };

            tracing::debug!(
                "補料申請：物料 {} 數量 {}，入庫申請 {}，批次 {}",
                line.material_name,
                line.quantity,
                intake_id,
                batch_id
            );

            report.created.push(CreatedRequest {
                material_name: line.material_name.clone(),
                intake_id,
                batch_id,
                quantity: line.quantity,
                placeholder,
            });
        }

        Ok(report)
    }
}
