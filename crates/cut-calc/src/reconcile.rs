//! 庫存對帳：需求對照已分配與庫存，產生短缺表

use cut_core::ShortageMap;
use std::collections::BTreeMap;

use crate::aggregator::MaterialDemand;
use crate::packer::{MaterialPackResult, UnplaceableDemand};

/// 對帳結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// 短缺表（布料與五金合併）
    pub shortage: ShortageMap,

    /// 各布料需要的布板數
    pub fabric_required: BTreeMap<String, u32>,

    /// 無法排入布板的裁片需求
    pub unplaceable: Vec<UnplaceableDemand>,
}

impl Reconciliation {
    pub fn has_shortage(&self) -> bool {
        !self.shortage.is_empty()
    }
}

/// 庫存對帳器
pub struct InventoryReconciler;

impl InventoryReconciler {
    /// 合併布料與五金的短缺
    ///
    /// 布料：`max(0, 需要布板數 − 已分配布板數)`，需要布板數包含無法排入的剩餘需求；
    /// 五金：`max(0, 需求總量 − 庫存總量)`。
    /// 同名物料同時出現在布料與五金時短缺相加。
    pub fn reconcile(demand: &MaterialDemand, packs: &[MaterialPackResult]) -> Reconciliation {
        let mut reconciliation = Reconciliation::default();

        for pack in packs {
            let assigned = demand
                .fabrics
                .get(&pack.material_name)
                .map_or(0, |f| f.assigned_panels());

            // 無法排入的裁片仍算需求
            let required = pack.total_panels_required();
            tracing::debug!(
                "布料 {}：需要 {} 張（含剩餘需求 {} 張），已分配 {} 張",
                pack.material_name,
                required,
                pack.unmet_panels,
                assigned
            );

            reconciliation
                .shortage
                .record_gap(&pack.material_name, required, assigned);
            let total = reconciliation
                .fabric_required
                .entry(pack.material_name.clone())
                .or_insert(0);
            *total = total.saturating_add(required);
            reconciliation.unplaceable.extend(pack.unmet.iter().cloned());
        }

        for tally in &demand.hardware {
            reconciliation
                .shortage
                .record_gap(&tally.material_name, tally.required, tally.available);
        }

        tracing::debug!("訂單 {} 短缺表: {:?}", demand.order_id, reconciliation.shortage);
        reconciliation
    }
}
