//! 持久化介面
//!
//! 裁剪引擎透過此 trait 讀寫訂單、庫存批次與分配記錄。連線管理與儲存技術由實作方負責。

use crate::assignment::AssignmentId;
use crate::demand::{CompositionId, OrderComposition, PieceDemand};
use crate::material::Material;
use crate::order::{Order, OrderId, OrderStatus};
use crate::stock::{AssignedBatch, BatchId};
use crate::supply::{IntakeId, PendingBatch, SupplyIntake};
use crate::Result;

/// 庫存持久化介面
pub trait InventoryStore {
    /// 讀取訂單，不存在時回傳 `CutError::OrderNotFound`
    fn fetch_order(&self, order_id: OrderId) -> Result<Order>;

    /// 讀取訂單明細
    fn fetch_order_compositions(&self, order_id: OrderId) -> Result<Vec<OrderComposition>>;

    /// 讀取訂單的裁片需求（每個明細 × 每種已分配布料一筆）
    fn fetch_piece_demand(&self, order_id: OrderId) -> Result<Vec<PieceDemand>>;

    /// 讀取訂單已分配的批次（每筆分配記錄一列，未去重）
    fn fetch_assigned_batches(&self, order_id: OrderId) -> Result<Vec<AssignedBatch>>;

    /// 訂單所需五金（物料名稱, 數量）
    fn fetch_hardware_required(&self, order_id: OrderId) -> Result<Vec<(String, u32)>>;

    /// 庫存中的五金總量（物料名稱, 數量），與訂單無關
    fn fetch_hardware_available(&self) -> Result<Vec<(String, u32)>>;

    /// 某物料所有批次的餘量總和
    fn fetch_remainder(&self, material_name: &str) -> Result<u32>;

    /// 某物料餘量大於 0 的批次（批次ID, 餘量），依批次ID遞增
    fn fetch_batches_with_remainder(&self, material_name: &str) -> Result<Vec<(BatchId, u32)>>;

    /// 依名稱查詢物料
    fn find_material(&self, name: &str) -> Result<Option<Material>>;

    /// 查詢訂單明細：優先回傳已使用該物料的明細，否則回傳訂單的第一筆明細
    fn find_order_composition(
        &self,
        order_id: OrderId,
        material_name: Option<&str>,
    ) -> Result<Option<CompositionId>>;

    /// 更新批次餘量
    fn update_batch_remainder(&mut self, batch_id: BatchId, remainder: u32) -> Result<()>;

    /// 增加分配數量：同一訂單已綁定該批次時原地增加，否則在指定明細上新增無成本的分配
    fn upsert_assignment(
        &mut self,
        composition_id: CompositionId,
        batch_id: BatchId,
        delta: u32,
    ) -> Result<AssignmentId>;

    /// 新增分配記錄
    fn create_assignment(
        &mut self,
        composition_id: CompositionId,
        batch_id: BatchId,
        quantity: u32,
    ) -> Result<AssignmentId>;

    /// 新增入庫申請
    fn create_intake(&mut self, intake: &SupplyIntake) -> Result<IntakeId>;

    /// 新增待到貨批次
    fn create_pending_batch(&mut self, batch: &PendingBatch) -> Result<BatchId>;

    /// 更新訂單狀態
    fn update_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<()>;

    /// 開始交易
    fn begin(&mut self) -> Result<()>;

    /// 提交交易
    fn commit(&mut self) -> Result<()>;

    /// 回滾交易
    fn rollback(&mut self) -> Result<()>;

    /// 在單一交易中執行 `f`，失敗時回滾並回傳原始錯誤
    fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.begin()?;
        match f(self).and_then(|value| self.commit().map(|()| value)) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!("交易失敗，回滾: {}", err);
                if let Err(rollback_err) = self.rollback() {
                    tracing::error!("回滾失敗: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}
