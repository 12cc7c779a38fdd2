//! 短缺分配：以庫存餘量補足短缺
//!
//! 兩階段：`propose` 只讀取存儲並產生提領計劃，`apply` 執行計劃（呼叫方負責交易範圍）。

use cut_core::{BatchId, CutError, InventoryStore, Result, ShortageMap};

use crate::session::AllocationSession;
use crate::SkippedMaterial;

/// 從單一批次提領的餘量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainderDraw {
    pub batch_id: BatchId,
    pub amount: u32,
    /// 提領前的餘量
    pub remainder_before: u32,
}

impl RemainderDraw {
    pub fn remainder_after(&self) -> u32 {
        self.remainder_before - self.amount
    }
}

/// 單一物料的提領計劃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDrawPlan {
    pub material_name: String,

    /// 短缺數量
    pub shortage: u32,

    /// 依批次ID遞增的提領明細
    pub draws: Vec<RemainderDraw>,
}

impl MaterialDrawPlan {
    /// 提領總量
    pub fn total(&self) -> u32 {
        self.draws.iter().map(|d| d.amount).sum()
    }
}

/// 餘量不足的物料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deficit {
    pub material_name: String,
    pub shortage: u32,
    pub remainder: u32,
}

impl Deficit {
    /// 扣除餘量後仍欠缺的數量
    pub fn uncovered(&self) -> u32 {
        self.shortage.saturating_sub(self.remainder)
    }
}

/// 分配判斷
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationDecision {
    /// 無短缺
    Satisfied,
    /// 所有短缺都可由餘量補足
    Resolvable(Vec<MaterialDrawPlan>),
    /// 至少一種物料餘量不足（列出所有不足的物料）
    Unresolvable(Vec<Deficit>),
}

/// 提領執行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// 已執行的計劃
    pub applied: Vec<MaterialDrawPlan>,

    /// 因資料關聯缺失略過的物料
    pub skipped: Vec<SkippedMaterial>,
}

impl AllocationReport {
    /// 某物料已提領的數量
    pub fn drawn(&self, material_name: &str) -> u32 {
        self.applied
            .iter()
            .filter(|p| p.material_name == material_name)
            .map(MaterialDrawPlan::total)
            .sum()
    }
}

/// 分配解析器
pub struct AllocationResolver;

impl AllocationResolver {
    /// 判斷短缺能否由餘量補足並產生提領計劃（唯讀）
    pub fn propose<S: InventoryStore>(
        store: &S,
        session: &AllocationSession,
        shortage: &ShortageMap,
    ) -> Result<AllocationDecision> {
        if shortage.is_empty() {
            tracing::debug!("訂單 {} 無短缺", session.order_id());
            return Ok(AllocationDecision::Satisfied);
        }

        let mut deficits = Vec::new();
        for (material_name, missing) in shortage.iter() {
            let remainder = store.fetch_remainder(material_name)?;
            tracing::debug!(
                "物料 {}：短缺 {}，庫存餘量 {}",
                material_name,
                missing,
                remainder
            );
            if remainder < missing {
                deficits.push(Deficit {
                    material_name: material_name.to_string(),
                    shortage: missing,
                    remainder,
                });
            }
        }

        if !deficits.is_empty() {
            tracing::info!(
                "訂單 {} 有 {} 種物料餘量不足",
                session.order_id(),
                deficits.len()
            );
            return Ok(AllocationDecision::Unresolvable(deficits));
        }

        let mut plans = Vec::new();
        for (material_name, missing) in shortage.iter() {
            let batches = store.fetch_batches_with_remainder(material_name)?;
            let plan = Self::draw_ascending(material_name, missing, &batches);
            if plan.total() < missing {
                // 餘量總和與批次明細不一致
                deficits.push(Deficit {
                    material_name: material_name.to_string(),
                    shortage: missing,
                    remainder: plan.total(),
                });
                continue;
            }
            plans.push(plan);
        }

        if deficits.is_empty() {
            Ok(AllocationDecision::Resolvable(plans))
        } else {
            Ok(AllocationDecision::Unresolvable(deficits))
        }
    }

    /// 依批次ID遞增，每批提領 `min(餘量, 尚欠數量)`
    fn draw_ascending(material_name: &str, shortage: u32, batches: &[(BatchId, u32)]) -> MaterialDrawPlan {
        let mut sorted = batches.to_vec();
        sorted.sort_by_key(|(batch_id, _)| *batch_id);

        let mut needed = shortage;
        let mut draws = Vec::new();
        for (batch_id, remainder) in sorted {
            if needed == 0 {
                break;
            }
            if remainder == 0 {
                continue;
            }
            let amount = remainder.min(needed);
            needed -= amount;
            draws.push(RemainderDraw {
                batch_id,
                amount,
                remainder_before: remainder,
            });
        }

        MaterialDrawPlan {
            material_name: material_name.to_string(),
            shortage,
            draws,
        }
    }

    /// 執行提領計劃：扣減批次餘量並增加訂單分配
    ///
    /// 找不到訂單明細的物料視為資料關聯缺失，記錄後略過（不提領任何餘量）。
    /// 須在呼叫方開啟的交易範圍內執行。
    pub fn apply<S: InventoryStore>(
        store: &mut S,
        session: &AllocationSession,
        plans: &[MaterialDrawPlan],
    ) -> Result<AllocationReport> {
        let mut report = AllocationReport::default();

        for plan in plans {
            let composition_id =
                match store.find_order_composition(session.order_id(), Some(&plan.material_name))? {
                    Some(id) => id,
                    None => {
                        let gap = CutError::DataIntegrityGap {
                            material: plan.material_name.clone(),
                            message: format!("訂單 {} 沒有任何明細", session.order_id()),
                        };
                        tracing::warn!("{}，略過", gap);
                        report.skipped.push(SkippedMaterial {
                            material_name: plan.material_name.clone(),
                            reason: gap.to_string(),
                        });
                        continue;
                    }
                };

            for draw in &plan.draws {
                let remainder = draw
                    .remainder_before
                    .checked_sub(draw.amount)
                    .ok_or(CutError::InsufficientRemainder {
                        batch_id: draw.batch_id,
                        requested: draw.amount,
                        remainder: draw.remainder_before,
                    })?;
                store.update_batch_remainder(draw.batch_id, remainder)?;
                store.upsert_assignment(composition_id, draw.batch_id, draw.amount)?;
                tracing::debug!(
                    "物料 {}：批次 {} 提領 {}，餘量 {} -> {}",
                    plan.material_name,
                    draw.batch_id,
                    draw.amount,
                    draw.remainder_before,
                    remainder
                );
            }

            report.applied.push(plan.clone());
        }

        Ok(report)
    }
}
