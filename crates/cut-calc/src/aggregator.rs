//! 物料需求彙總

use cut_core::{
    AssignedBatch, InventoryStore, MaterialCategory, MaterialId, Order, OrderId, PanelSize,
    PieceDemand, Result,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 單一布料的需求彙總
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricDemand {
    /// 布料名稱
    pub material_name: String,

    /// 布料ID
    pub material_id: Option<MaterialId>,

    /// 排版使用的布板尺寸（批次ID最小且帶尺寸的已分配批次）
    pub panel: Option<PanelSize>,

    /// 已分配給訂單的批次（依批次ID去重、數量加總）
    pub batches: Vec<AssignedBatch>,

    /// 裁片需求
    pub pieces: Vec<PieceDemand>,
}

impl FabricDemand {
    fn new(material_name: &str) -> Self {
        Self {
            material_name: material_name.to_string(),
            material_id: None,
            panel: None,
            batches: Vec::new(),
            pieces: Vec::new(),
        }
    }

    /// 已分配給訂單的布板總數
    pub fn assigned_panels(&self) -> u32 {
        self.batches
            .iter()
            .fold(0u32, |acc, b| acc.saturating_add(b.quantity))
    }

    /// 是否有待裁剪的裁片
    pub fn has_active_pieces(&self) -> bool {
        self.pieces.iter().any(PieceDemand::is_active)
    }
}

/// 單一五金的需求與庫存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareTally {
    pub material_name: String,
    pub required: u32,
    pub available: u32,
}

/// 訂單的物料需求彙總
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDemand {
    pub order_id: OrderId,

    /// 布料（依名稱排序）
    pub fabrics: BTreeMap<String, FabricDemand>,

    /// 五金（依名稱排序）
    pub hardware: Vec<HardwareTally>,
}

/// 訂單概覽
#[derive(Debug, Clone)]
pub struct OrderOverview {
    pub order: Order,

    /// 需要的產品總數
    pub total_products: u32,

    /// 需要的布料總面積（平方公分）
    pub total_area: Decimal,

    /// 已分配的布料批次
    pub fabric_batches: Vec<AssignedBatch>,

    /// 五金需求與庫存
    pub hardware: Vec<HardwareTally>,
}

/// 物料需求彙總器
pub struct MaterialDemandAggregator;

impl MaterialDemandAggregator {
    /// 彙總訂單的布料與五金需求
    ///
    /// 訂單不存在時回傳 `OrderNotFound`。無副作用。
    pub fn aggregate<S: InventoryStore>(store: &S, order_id: OrderId) -> Result<MaterialDemand> {
        store.fetch_order(order_id)?;

        let mut fabrics: BTreeMap<String, FabricDemand> = BTreeMap::new();

        // 已分配的布料批次，依批次ID去重
        for assigned in store.fetch_assigned_batches(order_id)? {
            if assigned.category != MaterialCategory::Fabric {
                continue;
            }
            let fabric = fabrics
                .entry(assigned.material_name.clone())
                .or_insert_with(|| FabricDemand::new(&assigned.material_name));
            fabric.material_id = Some(assigned.material_id);

            match fabric
                .batches
                .iter_mut()
                .find(|b| b.batch_id == assigned.batch_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(assigned.quantity);
                }
                None => fabric.batches.push(assigned),
            }
        }

        for fabric in fabrics.values_mut() {
            fabric.batches.sort_by_key(|b| b.batch_id);
            fabric.panel = fabric.batches.iter().find_map(|b| b.size);
        }

        for piece in store.fetch_piece_demand(order_id)? {
            fabrics
                .entry(piece.material_name.clone())
                .or_insert_with(|| FabricDemand::new(&piece.material_name))
                .pieces
                .push(piece);
        }

        tracing::debug!(
            "訂單 {} 布料彙總: {:?}",
            order_id,
            fabrics
                .values()
                .map(|f| (&f.material_name, f.assigned_panels(), f.pieces.len()))
                .collect::<Vec<_>>()
        );

        let hardware = Self::hardware_tallies(store, order_id)?;
        tracing::debug!("訂單 {} 五金彙總: {:?}", order_id, hardware);

        Ok(MaterialDemand {
            order_id,
            fabrics,
            hardware,
        })
    }

    /// 五金需求對照庫存
    fn hardware_tallies<S: InventoryStore>(store: &S, order_id: OrderId) -> Result<Vec<HardwareTally>> {
        let available: BTreeMap<String, u32> = store.fetch_hardware_available()?.into_iter().collect();

        let mut required: BTreeMap<String, u32> = BTreeMap::new();
        for (material_name, quantity) in store.fetch_hardware_required(order_id)? {
            let total = required.entry(material_name).or_insert(0);
            *total = total.saturating_add(quantity);
        }

        Ok(required
            .into_iter()
            .map(|(material_name, required)| {
                let available = available.get(&material_name).copied().unwrap_or(0);
                HardwareTally {
                    material_name,
                    required,
                    available,
                }
            })
            .collect())
    }

    /// 訂單概覽：產品總數、布料總面積、已分配布料批次、五金需求
    pub fn overview<S: InventoryStore>(store: &S, order_id: OrderId) -> Result<OrderOverview> {
        let order = store.fetch_order(order_id)?;
        let compositions = store.fetch_order_compositions(order_id)?;
        let demand = Self::aggregate(store, order_id)?;

        let total_products = compositions
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.quantity));
        let total_area = compositions
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.area()));
        let fabric_batches = demand
            .fabrics
            .into_values()
            .flat_map(|f| f.batches)
            .collect();

        Ok(OrderOverview {
            order,
            total_products,
            total_area,
            fabric_batches,
            hardware: demand.hardware,
        })
    }
}
