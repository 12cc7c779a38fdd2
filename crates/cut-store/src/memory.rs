//! 記憶體內庫存存儲

use cut_core::{
    AssignedBatch, Assignment, AssignmentId, BatchId, BatchStatus, CompositionId, CutError,
    IntakeId, InventoryStore, Material, MaterialCategory, MaterialId, Order, OrderComposition,
    OrderId, OrderStatus, PendingBatch, PieceDemand, Result, StockBatch, SupplyIntake,
};
use std::collections::BTreeMap;

use crate::fault::{FaultPlan, StoreOperation};
use crate::touched::TouchedRows;

/// 資料表
#[derive(Debug, Clone, Default)]
struct Tables {
    materials: BTreeMap<MaterialId, Material>,
    orders: BTreeMap<OrderId, Order>,
    compositions: BTreeMap<CompositionId, OrderComposition>,
    batches: BTreeMap<BatchId, StockBatch>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    intakes: BTreeMap<IntakeId, SupplyIntake>,
}

fn next_id<V>(table: &BTreeMap<u64, V>) -> u64 {
    table.keys().next_back().map_or(1, |id| id + 1)
}

/// 記憶體內庫存存儲
///
/// 交易以整份資料表快照實作：`begin` 複製資料表，`rollback` 還原快照。
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
    touched: TouchedRows,
    last_committed: TouchedRows,
    fault: Option<FaultPlan>,
    disconnected: bool,
    rollbacks: u32,
}

impl MemoryStore {
    /// 創建空的存儲
    pub fn new() -> Self {
        Self::default()
    }

    // ===== 種子資料 =====

    pub fn add_material(&mut self, material: Material) -> &mut Self {
        self.tables.materials.insert(material.id, material);
        self
    }

    pub fn add_order(&mut self, order: Order) -> &mut Self {
        self.tables.orders.insert(order.id, order);
        self
    }

    pub fn add_composition(&mut self, composition: OrderComposition) -> &mut Self {
        self.tables.compositions.insert(composition.id, composition);
        self
    }

    pub fn add_batch(&mut self, batch: StockBatch) -> &mut Self {
        self.tables.batches.insert(batch.id, batch);
        self
    }

    /// 建立既有的分配記錄（不影響批次餘量）
    pub fn assign(
        &mut self,
        composition_id: CompositionId,
        batch_id: BatchId,
        quantity: u32,
    ) -> AssignmentId {
        let id = next_id(&self.tables.assignments);
        self.tables
            .assignments
            .insert(id, Assignment::new(id, composition_id, batch_id, quantity));
        id
    }

    // ===== 故障模擬 =====

    /// 注入寫入故障
    pub fn inject_fault(&mut self, plan: FaultPlan) {
        self.fault = Some(plan);
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// 模擬連線中斷，之後所有操作回傳連線失敗
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    pub fn reconnect(&mut self) {
        self.disconnected = false;
    }

    // ===== 查詢輔助（測試與示例使用） =====

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.tables.orders.get(&order_id)
    }

    pub fn batch(&self, batch_id: BatchId) -> Option<&StockBatch> {
        self.tables.batches.get(&batch_id)
    }

    /// 某物料的所有批次，依批次ID遞增
    pub fn batches_of(&self, material_name: &str) -> Vec<&StockBatch> {
        self.tables
            .batches
            .values()
            .filter(|b| b.material_name == material_name)
            .collect()
    }

    pub fn assignments(&self) -> Vec<&Assignment> {
        self.tables.assignments.values().collect()
    }

    pub fn assignments_for_batch(&self, batch_id: BatchId) -> Vec<&Assignment> {
        self.tables
            .assignments
            .values()
            .filter(|a| a.batch_id == batch_id)
            .collect()
    }

    pub fn intakes(&self) -> Vec<&SupplyIntake> {
        self.tables.intakes.values().collect()
    }

    pub fn in_transaction_open(&self) -> bool {
        self.snapshot.is_some()
    }

    /// 最近一次提交的交易所異動的列
    pub fn last_committed(&self) -> &TouchedRows {
        &self.last_committed
    }

    pub fn rollback_count(&self) -> u32 {
        self.rollbacks
    }

    // ===== 內部輔助 =====

    fn ensure_connected(&self) -> Result<()> {
        if self.disconnected {
            return Err(CutError::ConnectionFailure("記憶體存儲已斷線".to_string()));
        }
        Ok(())
    }

    fn before_write(&mut self, operation: StoreOperation) -> Result<()> {
        self.ensure_connected()?;
        if let Some(plan) = self.fault.as_mut() {
            plan.check(operation)?;
        }
        Ok(())
    }

    fn order_of(&self, composition_id: CompositionId) -> Option<OrderId> {
        self.tables
            .compositions
            .get(&composition_id)
            .map(|c| c.order_id)
    }

    /// 訂單的分配記錄與對應批次，依分配ID遞增
    fn order_assignments(&self, order_id: OrderId) -> Vec<(&Assignment, &StockBatch)> {
        self.tables
            .assignments
            .values()
            .filter(|a| self.order_of(a.composition_id) == Some(order_id))
            .filter_map(|a| self.tables.batches.get(&a.batch_id).map(|b| (a, b)))
            .collect()
    }
}

impl InventoryStore for MemoryStore {
    fn fetch_order(&self, order_id: OrderId) -> Result<Order> {
        self.ensure_connected()?;
        self.tables
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(CutError::OrderNotFound(order_id))
    }

    fn fetch_order_compositions(&self, order_id: OrderId) -> Result<Vec<OrderComposition>> {
        self.ensure_connected()?;
        Ok(self
            .tables
            .compositions
            .values()
            .filter(|c| c.order_id == order_id)
            .cloned()
            .collect())
    }

    fn fetch_piece_demand(&self, order_id: OrderId) -> Result<Vec<PieceDemand>> {
        self.ensure_connected()?;
        let assigned = self.order_assignments(order_id);
        let mut demands = Vec::new();

        for composition in self
            .tables
            .compositions
            .values()
            .filter(|c| c.order_id == order_id)
        {
            let mut materials: Vec<&str> = Vec::new();
            for (assignment, batch) in &assigned {
                if assignment.composition_id == composition.id
                    && batch.category == MaterialCategory::Fabric
                    && !materials.contains(&batch.material_name.as_str())
                {
                    materials.push(&batch.material_name);
                }
            }
            for material in materials {
                demands.push(PieceDemand::new(
                    composition.id,
                    composition.product_name.clone(),
                    material,
                    composition.width,
                    composition.height,
                    composition.quantity,
                ));
            }
        }

        Ok(demands)
    }

    fn fetch_assigned_batches(&self, order_id: OrderId) -> Result<Vec<AssignedBatch>> {
        self.ensure_connected()?;
        Ok(self
            .order_assignments(order_id)
            .into_iter()
            .map(|(assignment, batch)| AssignedBatch {
                material_name: batch.material_name.clone(),
                material_id: batch.material_id,
                category: batch.category,
                batch_id: batch.id,
                quantity: assignment.quantity,
                size: batch.size,
            })
            .collect())
    }

    fn fetch_hardware_required(&self, order_id: OrderId) -> Result<Vec<(String, u32)>> {
        self.ensure_connected()?;
        let mut required: BTreeMap<String, u32> = BTreeMap::new();
        for (assignment, batch) in self.order_assignments(order_id) {
            if batch.category == MaterialCategory::Hardware {
                let total = required.entry(batch.material_name.clone()).or_insert(0);
                *total = total.saturating_add(assignment.quantity);
            }
        }
        Ok(required.into_iter().collect())
    }

    fn fetch_hardware_available(&self) -> Result<Vec<(String, u32)>> {
        self.ensure_connected()?;
        let mut available: BTreeMap<String, u32> = BTreeMap::new();
        for batch in self.tables.batches.values() {
            if batch.category == MaterialCategory::Hardware && !batch.is_pending() {
                let total = available.entry(batch.material_name.clone()).or_insert(0);
                *total = total.saturating_add(batch.quantity);
            }
        }
        Ok(available.into_iter().collect())
    }

    fn fetch_remainder(&self, material_name: &str) -> Result<u32> {
        self.ensure_connected()?;
        Ok(self
            .tables
            .batches
            .values()
            .filter(|b| b.material_name == material_name)
            .fold(0u32, |acc, b| acc.saturating_add(b.remainder)))
    }

    fn fetch_batches_with_remainder(&self, material_name: &str) -> Result<Vec<(BatchId, u32)>> {
        self.ensure_connected()?;
        Ok(self
            .tables
            .batches
            .values()
            .filter(|b| b.material_name == material_name && b.remainder > 0)
            .map(|b| (b.id, b.remainder))
            .collect())
    }

    fn find_material(&self, name: &str) -> Result<Option<Material>> {
        self.ensure_connected()?;
        Ok(self
            .tables
            .materials
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    fn find_order_composition(
        &self,
        order_id: OrderId,
        material_name: Option<&str>,
    ) -> Result<Option<CompositionId>> {
        self.ensure_connected()?;
        if let Some(material) = material_name {
            let using_material = self
                .order_assignments(order_id)
                .into_iter()
                .find(|(_, batch)| batch.material_name == material)
                .map(|(assignment, _)| assignment.composition_id);
            if using_material.is_some() {
                return Ok(using_material);
            }
        }
        Ok(self
            .tables
            .compositions
            .values()
            .find(|c| c.order_id == order_id)
            .map(|c| c.id))
    }

    fn update_batch_remainder(&mut self, batch_id: BatchId, remainder: u32) -> Result<()> {
        self.before_write(StoreOperation::UpdateBatchRemainder)?;
        let batch = self
            .tables
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| CutError::QueryFailure(format!("找不到批次 {}", batch_id)))?;
        if remainder > batch.quantity {
            return Err(CutError::QueryFailure(format!(
                "批次 {} 餘量 {} 超過在庫數量 {}",
                batch_id, remainder, batch.quantity
            )));
        }
        batch.remainder = remainder;
        self.touched.mark_batch(batch_id);
        Ok(())
    }

    fn upsert_assignment(
        &mut self,
        composition_id: CompositionId,
        batch_id: BatchId,
        delta: u32,
    ) -> Result<AssignmentId> {
        self.before_write(StoreOperation::UpsertAssignment)?;
        let order_id = self.order_of(composition_id).ok_or_else(|| {
            CutError::QueryFailure(format!("找不到訂單明細 {}", composition_id))
        })?;

        let existing = self
            .tables
            .assignments
            .values()
            .find(|a| a.batch_id == batch_id && self.order_of(a.composition_id) == Some(order_id))
            .map(|a| a.id);

        let id = match existing {
            Some(id) => {
                if let Some(assignment) = self.tables.assignments.get_mut(&id) {
                    assignment.increase(delta);
                }
                id
            }
            None => {
                let id = next_id(&self.tables.assignments);
                self.tables
                    .assignments
                    .insert(id, Assignment::new(id, composition_id, batch_id, delta));
                id
            }
        };
        self.touched.mark_assignment(id);
        Ok(id)
    }

    fn create_assignment(
        &mut self,
        composition_id: CompositionId,
        batch_id: BatchId,
        quantity: u32,
    ) -> Result<AssignmentId> {
        self.before_write(StoreOperation::CreateAssignment)?;
        if !self.tables.compositions.contains_key(&composition_id) {
            return Err(CutError::QueryFailure(format!(
                "找不到訂單明細 {}",
                composition_id
            )));
        }
        let id = next_id(&self.tables.assignments);
        self.tables
            .assignments
            .insert(id, Assignment::new(id, composition_id, batch_id, quantity));
        self.touched.mark_assignment(id);
        Ok(id)
    }

    fn create_intake(&mut self, intake: &SupplyIntake) -> Result<IntakeId> {
        self.before_write(StoreOperation::CreateIntake)?;
        let id = next_id(&self.tables.intakes);
        let mut stored = intake.clone();
        stored.id = Some(id);
        self.tables.intakes.insert(id, stored);
        Ok(id)
    }

    fn create_pending_batch(&mut self, batch: &PendingBatch) -> Result<BatchId> {
        self.before_write(StoreOperation::CreatePendingBatch)?;
        let category = self
            .tables
            .materials
            .get(&batch.material_id)
            .map(|m| m.category)
            .ok_or_else(|| {
                CutError::QueryFailure(format!("找不到物料 {}", batch.material_id))
            })?;

        let id = next_id(&self.tables.batches);
        self.tables.batches.insert(
            id,
            StockBatch {
                id,
                material_id: batch.material_id,
                material_name: batch.material_name.clone(),
                category,
                size: None,
                quantity: batch.quantity,
                remainder: batch.remainder,
                status: BatchStatus::AwaitingConfirmation,
            },
        );
        self.touched.mark_batch(id);
        Ok(id)
    }

    fn update_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        self.before_write(StoreOperation::UpdateOrderStatus)?;
        let order = self
            .tables
            .orders
            .get_mut(&order_id)
            .ok_or(CutError::OrderNotFound(order_id))?;
        order.status = status;
        self.touched.mark_order(order_id);
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        self.ensure_connected()?;
        if self.snapshot.is_some() {
            return Err(CutError::QueryFailure("交易已開始，不支援巢狀交易".to_string()));
        }
        self.snapshot = Some(self.tables.clone());
        self.touched.clear();
        tracing::debug!("記憶體存儲：開始交易");
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if let Err(err) = self.ensure_connected() {
            // 提交失敗時還原快照，不留下未提交的異動
            if let Some(snapshot) = self.snapshot.take() {
                self.tables = snapshot;
                self.touched.clear();
                self.rollbacks += 1;
            }
            return Err(err);
        }
        if self.snapshot.take().is_none() {
            return Err(CutError::QueryFailure("沒有進行中的交易".to_string()));
        }
        tracing::debug!(
            "記憶體存儲：提交交易，異動批次 {:?}，分配 {:?}，訂單 {:?}",
            self.touched.batches(),
            self.touched.assignments(),
            self.touched.orders()
        );
        self.last_committed = std::mem::take(&mut self.touched);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.tables = snapshot;
                self.touched.clear();
                self.rollbacks += 1;
                tracing::debug!("記憶體存儲：交易已回滾");
                Ok(())
            }
            None => Err(CutError::QueryFailure("沒有進行中的交易".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cut_core::PanelSize;
    use rust_decimal::Decimal;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .add_material(Material::fabric(1, "Canvas"))
            .add_material(Material::hardware(2, "Zipper"))
            .add_order(Order::new(100, OrderStatus::Confirmed))
            .add_composition(OrderComposition::new(
                1000,
                100,
                "Tote",
                10,
                Decimal::from(100),
                Decimal::from(50),
            ))
            .add_batch(StockBatch::fabric(
                10,
                1,
                "Canvas",
                PanelSize::new(Decimal::from(300), Decimal::from(200)),
                5,
            ))
            .add_batch(StockBatch::hardware(20, 2, "Zipper", 25).with_remainder(10))
            .add_batch(StockBatch::hardware(21, 2, "Zipper", 8).with_remainder(3));
        store.assign(1000, 10, 1);
        store.assign(1000, 20, 40);
        store
    }

    #[test]
    fn test_fetch_order_not_found() {
        let store = seeded_store();
        assert!(matches!(store.fetch_order(7), Err(CutError::OrderNotFound(7))));
    }

    #[test]
    fn test_piece_demand_per_fabric_material() {
        let store = seeded_store();
        let demand = store.fetch_piece_demand(100).unwrap();

        // 五金分配不產生裁片需求
        assert_eq!(demand.len(), 1);
        assert_eq!(demand[0].material_name, "Canvas");
        assert_eq!(demand[0].quantity, 10);
    }

    #[test]
    fn test_hardware_tallies() {
        let store = seeded_store();

        assert_eq!(
            store.fetch_hardware_required(100).unwrap(),
            vec![("Zipper".to_string(), 40)]
        );
        assert_eq!(
            store.fetch_hardware_available().unwrap(),
            vec![("Zipper".to_string(), 33)]
        );
        assert_eq!(store.fetch_remainder("Zipper").unwrap(), 13);
        assert_eq!(
            store.fetch_batches_with_remainder("Zipper").unwrap(),
            vec![(20, 10), (21, 3)]
        );
    }

    #[test]
    fn test_hardware_sums_saturate() {
        let mut store = seeded_store();
        store.add_batch(StockBatch::hardware(22, 2, "Zipper", u32::MAX).with_remainder(u32::MAX));
        store.assign(1000, 22, u32::MAX);

        assert_eq!(
            store.fetch_hardware_required(100).unwrap(),
            vec![("Zipper".to_string(), u32::MAX)]
        );
        assert_eq!(
            store.fetch_hardware_available().unwrap(),
            vec![("Zipper".to_string(), u32::MAX)]
        );
        assert_eq!(store.fetch_remainder("Zipper").unwrap(), u32::MAX);
    }

    #[test]
    fn test_upsert_increases_existing_binding() {
        let mut store = seeded_store();

        let id = store.upsert_assignment(1000, 20, 5).unwrap();
        assert_eq!(store.assignments_for_batch(20).len(), 1);
        assert_eq!(store.assignments_for_batch(20)[0].id, id);
        assert_eq!(store.assignments_for_batch(20)[0].quantity, 45);

        // 未綁定的批次建立新的無成本分配
        let new_id = store.upsert_assignment(1000, 21, 3).unwrap();
        assert_ne!(new_id, id);
        assert_eq!(store.assignments_for_batch(21)[0].quantity, 3);
        assert!(store.assignments_for_batch(21)[0].cost.is_none());
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut store = seeded_store();

        store.begin().unwrap();
        store.update_batch_remainder(20, 0).unwrap();
        store.upsert_assignment(1000, 20, 10).unwrap();
        store.rollback().unwrap();

        assert_eq!(store.batch(20).unwrap().remainder, 10);
        assert_eq!(store.assignments_for_batch(20)[0].quantity, 40);
        assert_eq!(store.rollback_count(), 1);
        assert!(!store.in_transaction_open());
    }

    #[test]
    fn test_in_transaction_rolls_back_on_fault() {
        let mut store = seeded_store();
        store.inject_fault(FaultPlan::immediately(StoreOperation::UpsertAssignment));

        let result = store.in_transaction(|s| {
            s.update_batch_remainder(20, 5)?;
            s.upsert_assignment(1000, 20, 5)
        });

        assert!(matches!(result, Err(CutError::QueryFailure(_))));
        assert_eq!(store.batch(20).unwrap().remainder, 10);
        assert!(!store.in_transaction_open());
    }

    #[test]
    fn test_commit_failure_discards_writes() {
        let mut store = seeded_store();

        // 寫入後斷線，提交失敗
        let result = store.in_transaction(|s| {
            s.update_batch_remainder(20, 0)?;
            s.disconnect();
            Ok(())
        });
        store.reconnect();

        assert!(matches!(result, Err(CutError::ConnectionFailure(_))));
        assert_eq!(store.batch(20).unwrap().remainder, 10);
        assert!(!store.in_transaction_open());
        // 之後仍可開始新的交易
        assert!(store.in_transaction(|s| s.update_batch_remainder(20, 4)).is_ok());
        assert_eq!(store.batch(20).unwrap().remainder, 4);
    }

    #[test]
    fn test_commit_records_touched_rows() {
        let mut store = seeded_store();

        store
            .in_transaction(|s| {
                s.update_batch_remainder(21, 0)?;
                s.update_order_status(100, OrderStatus::Cutting)
            })
            .unwrap();

        assert_eq!(store.last_committed().batches(), vec![21]);
        assert_eq!(store.last_committed().orders(), vec![100]);
        assert_eq!(store.order(100).unwrap().status, OrderStatus::Cutting);
    }

    #[test]
    fn test_pending_batch_excluded_from_available() {
        let mut store = seeded_store();
        let intake_id = store
            .create_intake(&SupplyIntake::new(
                1,
                NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            ))
            .unwrap();
        let batch_id = store
            .create_pending_batch(&PendingBatch::new(intake_id, 2, "Zipper", 15))
            .unwrap();

        let batch = store.batch(batch_id).unwrap();
        assert!(batch.is_pending());
        assert_eq!(batch.remainder, 0);
        assert_eq!(store.intakes()[0].id, Some(intake_id));
        assert_eq!(
            store.fetch_hardware_available().unwrap(),
            vec![("Zipper".to_string(), 33)]
        );
    }

    #[test]
    fn test_disconnected_store() {
        let mut store = seeded_store();
        store.disconnect();

        assert!(matches!(
            store.fetch_order(100),
            Err(CutError::ConnectionFailure(_))
        ));
        assert!(matches!(store.begin(), Err(CutError::ConnectionFailure(_))));

        store.reconnect();
        assert!(store.fetch_order(100).is_ok());
    }

    #[test]
    fn test_find_order_composition_fallback() {
        let store = seeded_store();

        assert_eq!(store.find_order_composition(100, Some("Canvas")).unwrap(), Some(1000));
        assert_eq!(store.find_order_composition(100, Some("Buckle")).unwrap(), Some(1000));
        assert_eq!(store.find_order_composition(101, None).unwrap(), None);
    }
}
