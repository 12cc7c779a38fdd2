//! 裁剪計算主流程

use cut_core::{CutError, CuttingConfig, InventoryStore, OrderId, Result};

use crate::aggregator::{MaterialDemand, MaterialDemandAggregator};
use crate::allocation::{AllocationDecision, AllocationResolver};
use crate::packer::{MaterialPackResult, PanelPacker};
use crate::presenter::Presenter;
use crate::reconcile::{InventoryReconciler, Reconciliation};
use crate::session::AllocationSession;
use crate::status::{OrderStatusMachine, StatusTrigger};
use crate::supply_request::SupplyRequestGenerator;
use crate::{AllocationOutcome, CalcWarning, CalculationReport, WarningSeverity};

/// 排版與對帳結果（尚未分配）
#[derive(Debug, Clone)]
pub struct CuttingPlan {
    pub demand: MaterialDemand,
    pub packs: Vec<MaterialPackResult>,
    pub reconciliation: Reconciliation,
    pub warnings: Vec<CalcWarning>,
}

/// 裁剪計算引擎
pub struct CuttingEngine {
    config: CuttingConfig,
    packer: PanelPacker,
}

impl CuttingEngine {
    /// 創建新的裁剪計算引擎
    pub fn new(config: CuttingConfig) -> Result<Self> {
        config.validate()?;
        let packer = PanelPacker::from_config(&config);
        Ok(Self { config, packer })
    }

    pub fn config(&self) -> &CuttingConfig {
        &self.config
    }

    /// 開啟訂單的計算工作階段
    pub fn open_session<S: InventoryStore>(&self, store: &S, order_id: OrderId) -> Result<AllocationSession> {
        AllocationSession::open(store, order_id)
    }

    /// 需求彙總 → 排版 → 對帳（唯讀）
    pub fn plan<S: InventoryStore>(&self, store: &S, session: &AllocationSession) -> Result<CuttingPlan> {
        // Step 1: 需求彙總
        tracing::debug!("Step 1: 需求彙總");
        let demand = MaterialDemandAggregator::aggregate(store, session.order_id())?;

        // Step 2: 逐布料排版
        tracing::debug!("Step 2: 布板排版（{:?}）", self.packer.mode());
        let mut packs = Vec::new();
        let mut warnings = Vec::new();
        for fabric in demand.fabrics.values() {
            if !fabric.has_active_pieces() {
                tracing::debug!("布料 {} 沒有待裁剪的裁片，跳過", fabric.material_name);
                continue;
            }
            let Some(panel) = fabric.panel else {
                let gap = CutError::DataIntegrityGap {
                    material: fabric.material_name.clone(),
                    message: "已分配的批次都沒有布板尺寸".to_string(),
                };
                tracing::warn!("{}，略過排版", gap);
                warnings.push(CalcWarning::warning(fabric.material_name.clone(), gap.to_string()));
                continue;
            };

            let result = self
                .packer
                .pack_material(&fabric.material_name, panel, &fabric.pieces);
            for unmet in &result.unmet {
                warnings.push(CalcWarning::warning(
                    unmet.material_name.clone(),
                    format!("{} 片 {} 無法排入布板", unmet.quantity, unmet.piece_name),
                ));
            }
            packs.push(result);
        }

        // Step 3: 庫存對帳
        tracing::debug!("Step 3: 庫存對帳");
        let reconciliation = InventoryReconciler::reconcile(&demand, &packs);

        Ok(CuttingPlan {
            demand,
            packs,
            reconciliation,
            warnings,
        })
    }

    /// 主裁剪計算入口
    ///
    /// 任何失敗都先以錯誤通知呈現層再回傳。
    pub fn calculate<S: InventoryStore, P: Presenter>(
        &self,
        store: &mut S,
        presenter: &mut P,
        order_id: OrderId,
    ) -> Result<CalculationReport> {
        match self.run(store, presenter, order_id) {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!("訂單 {} 裁剪計算失敗: {}", order_id, err);
                presenter.notify(WarningSeverity::Error, &err.to_string());
                Err(err)
            }
        }
    }

    fn run<S: InventoryStore, P: Presenter>(
        &self,
        store: &mut S,
        presenter: &mut P,
        order_id: OrderId,
    ) -> Result<CalculationReport> {
        tracing::info!("開始裁剪計算：訂單 {}", order_id);
        let start_time = std::time::Instant::now();

        let mut session = self.open_session(&*store, order_id)?;
        let previous_status = session.order.status;

        let CuttingPlan {
            packs,
            reconciliation,
            mut warnings,
            ..
        } = self.plan(&*store, &session)?;

        // Step 4: 繪製裁剪圖
        tracing::debug!("Step 4: 繪製裁剪圖");
        for pack in &packs {
            for placement in &pack.placements {
                presenter.render_panels(&pack.material_name, pack.panel, placement);
            }
        }
        Self::notify_warnings(presenter, &warnings);
        let notified = warnings.len();

        // Step 5: 短缺分配與狀態轉換
        tracing::debug!("Step 5: 短缺分配");
        let decision = AllocationResolver::propose(&*store, &session, &reconciliation.shortage)?;
        let (outcome, next_status) = match decision {
            AllocationDecision::Satisfied => {
                let next = store.in_transaction(|s| {
                    OrderStatusMachine::advance(s, &session, StatusTrigger::NoShortage)
                })?;
                (AllocationOutcome::Satisfied, next)
            }
            AllocationDecision::Resolvable(plans) => {
                let (report, next) = store.in_transaction(|s| {
                    let report = AllocationResolver::apply(s, &session, &plans)?;
                    let next = OrderStatusMachine::advance(
                        s,
                        &session,
                        StatusTrigger::CoveredFromRemainder,
                    )?;
                    Ok((report, next))
                })?;
                for skipped in &report.skipped {
                    warnings.push(CalcWarning::warning(
                        skipped.material_name.clone(),
                        skipped.reason.clone(),
                    ));
                }
                (AllocationOutcome::ResolvedFromRemainder(report), next)
            }
            AllocationDecision::Unresolvable(deficits) => {
                let supply_plan =
                    SupplyRequestGenerator::propose(&session, &reconciliation.shortage, &self.config);

                if presenter.confirm_supply_request(&supply_plan) {
                    let (report, next) = store.in_transaction(|s| {
                        let report = SupplyRequestGenerator::commit(s, &supply_plan)?;
                        let next = OrderStatusMachine::advance(
                            s,
                            &session,
                            StatusTrigger::SupplyRequested,
                        )?;
                        Ok((report, next))
                    })?;
                    for skipped in &report.skipped {
                        warnings.push(CalcWarning::warning(
                            skipped.material_name.clone(),
                            skipped.reason.clone(),
                        ));
                    }
                    for created in report.missing_placeholders() {
                        warnings.push(CalcWarning::warning(
                            created.material_name.clone(),
                            format!("訂單 {} 沒有明細，批次 {} 未建立佔位分配", order_id, created.batch_id),
                        ));
                    }
                    (AllocationOutcome::SupplyRequested(report), next)
                } else {
                    tracing::info!("訂單 {} 使用者拒絕建立補料申請", order_id);
                    let next = OrderStatusMachine::advance(store, &session, StatusTrigger::Declined)?;
                    (AllocationOutcome::Declined(deficits), next)
                }
            }
        };
        Self::notify_warnings(presenter, &warnings[notified..]);

        if let Some(status) = next_status {
            session.order.status = status;
        }

        let report = CalculationReport {
            session_id: session.id,
            order_id,
            packs,
            reconciliation,
            outcome,
            previous_status,
            final_status: session.order.status,
            warnings,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("裁剪計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "訂單 {} 狀態: {} -> {}，短缺 {} 種",
            order_id,
            report.previous_status,
            report.final_status,
            report.reconciliation.shortage.len()
        );

        Ok(report)
    }

    fn notify_warnings<P: Presenter>(presenter: &mut P, warnings: &[CalcWarning]) {
        for warning in warnings {
            presenter.notify(
                warning.severity,
                &format!("{}: {}", warning.material_name, warning.message),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::LogPresenter;
    use cut_core::{
        BatchStatus, Material, Order, OrderComposition, OrderStatus, PackingMode, PanelSize,
        StockBatch,
    };
    use cut_store::{FaultPlan, MemoryStore, StoreOperation};
    use rust_decimal::Decimal;

    fn panel() -> PanelSize {
        PanelSize::new(Decimal::from(300), Decimal::from(200))
    }

    /// 訂單 100：Tote 100×50 × 10、Pouch 80×40 × 5，Canvas 已分配 1 張 300×200
    fn base_store() -> MemoryStore {
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
            .add_composition(OrderComposition::new(
                1001,
                100,
                "Pouch",
                5,
                Decimal::from(80),
                Decimal::from(40),
            ))
            .add_batch(StockBatch::fabric(10, 1, "Canvas", panel(), 6).with_remainder(2));
        store.assign(1000, 10, 1);
        store.assign(1001, 10, 0);
        store
    }

    /// Zipper 需求 40，庫存 25，餘量 `remainders` 分散在兩個批次
    fn store_with_zipper(remainders: (u32, u32)) -> MemoryStore {
        let mut store = base_store();
        store
            .add_batch(StockBatch::hardware(20, 2, "Zipper", 10).with_remainder(remainders.0))
            .add_batch(StockBatch::hardware(21, 2, "Zipper", 15).with_remainder(remainders.1));
        store.assign(1000, 20, 40);
        store
    }

    fn engine() -> CuttingEngine {
        CuttingEngine::new(CuttingConfig::default()).unwrap()
    }

    #[test]
    fn test_no_shortage_ready_in_workshop() {
        let mut store = base_store();
        let mut presenter = LogPresenter::declining();

        let report = engine().calculate(&mut store, &mut presenter, 100).unwrap();

        assert_eq!(report.panels_required("Canvas"), Some(1));
        assert!(matches!(report.outcome, AllocationOutcome::Satisfied));
        assert_eq!(report.final_status, OrderStatus::ReadyInWorkshop);
        assert_eq!(store.order(100).unwrap().status, OrderStatus::ReadyInWorkshop);
        assert_eq!(presenter.rendered().len(), 1);
        assert_eq!(presenter.rendered()[0].covered_area(), Decimal::from(66000));
        assert!(presenter.confirmations().is_empty());
    }

    #[test]
    fn test_shortage_covered_from_remainder() {
        // 短缺 Zipper 15，餘量 8 + 12 = 20
        let mut store = store_with_zipper((8, 12));
        let mut presenter = LogPresenter::declining();

        let report = engine().calculate(&mut store, &mut presenter, 100).unwrap();

        assert_eq!(report.reconciliation.shortage.get("Zipper"), Some(15));
        let AllocationOutcome::ResolvedFromRemainder(allocation) = &report.outcome else {
            panic!("expected resolution from remainder");
        };
        assert_eq!(allocation.drawn("Zipper"), 15);
        assert_eq!(store.batch(20).unwrap().remainder, 0);
        assert_eq!(store.batch(21).unwrap().remainder, 5);
        assert_eq!(report.final_status, OrderStatus::Cutting);
        assert_eq!(store.order(100).unwrap().status, OrderStatus::Cutting);
    }

    #[test]
    fn test_shortage_supply_requested_on_confirm() {
        let mut store = store_with_zipper((2, 3));
        let mut presenter = LogPresenter::approving();

        let report = engine().calculate(&mut store, &mut presenter, 100).unwrap();

        let AllocationOutcome::SupplyRequested(supply) = &report.outcome else {
            panic!("expected a supply request");
        };
        assert_eq!(supply.created.len(), 1);
        let pending = store.batch(supply.created[0].batch_id).unwrap();
        assert_eq!(pending.quantity, 15);
        assert_eq!(pending.status, BatchStatus::AwaitingConfirmation);
        assert_eq!(store.intakes().len(), 1);
        assert_eq!(report.final_status, OrderStatus::MaterialsOrdered);
        assert_eq!(presenter.confirmations()[0].details(), "Zipper: 15");
    }

    #[test]
    fn test_shortage_declined_leaves_status() {
        let mut store = store_with_zipper((2, 3));
        let mut presenter = LogPresenter::declining();

        let report = engine().calculate(&mut store, &mut presenter, 100).unwrap();

        assert!(matches!(report.outcome, AllocationOutcome::Declined(ref d) if d.len() == 1));
        assert!(!report.status_changed());
        assert_eq!(store.order(100).unwrap().status, OrderStatus::Confirmed);
        assert!(store.intakes().is_empty());
        assert_eq!(store.batch(20).unwrap().remainder, 2);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let store = store_with_zipper((8, 12));
        let engine = engine();
        let session = engine.open_session(&store, 100).unwrap();

        let first = engine.plan(&store, &session).unwrap();
        let second = engine.plan(&store, &session).unwrap();

        assert_eq!(first.packs, second.packs);
        assert_eq!(first.reconciliation, second.reconciliation);
    }

    #[test]
    fn test_fault_rolls_back_allocation() {
        let mut store = store_with_zipper((8, 12));
        store.inject_fault(FaultPlan::after(StoreOperation::UpsertAssignment, 1));
        let mut presenter = LogPresenter::declining();

        let result = engine().calculate(&mut store, &mut presenter, 100);

        assert!(matches!(result, Err(CutError::QueryFailure(_))));
        assert_eq!(store.rollback_count(), 1);
        assert!(!store.in_transaction_open());
        // 第一個批次的提領已被回滾
        assert_eq!(store.batch(20).unwrap().remainder, 8);
        assert_eq!(store.order(100).unwrap().status, OrderStatus::Confirmed);
        assert!(presenter.has_notification(WarningSeverity::Error));
    }

    #[test]
    fn test_status_update_failure_rolls_back_draws() {
        let mut store = store_with_zipper((8, 12));
        store.inject_fault(FaultPlan::immediately(StoreOperation::UpdateOrderStatus));
        let mut presenter = LogPresenter::declining();

        assert!(engine().calculate(&mut store, &mut presenter, 100).is_err());
        assert_eq!(store.batch(20).unwrap().remainder, 8);
        assert_eq!(store.batch(21).unwrap().remainder, 12);
    }

    #[test]
    fn test_ineligible_order_is_reported() {
        let mut store = base_store();
        store.add_order(Order::new(200, OrderStatus::MaterialsOrdered));
        let mut presenter = LogPresenter::declining();

        let result = engine().calculate(&mut store, &mut presenter, 200);

        assert!(matches!(result, Err(CutError::OrderNotEligible { .. })));
        assert!(presenter.has_notification(WarningSeverity::Error));
    }

    #[test]
    fn test_unplaceable_piece_is_warned() {
        let mut store = base_store();
        store.add_composition(OrderComposition::new(
            1002,
            100,
            "Banner",
            2,
            Decimal::from(400),
            Decimal::from(400),
        ));
        store.assign(1002, 10, 0);
        let mut presenter = LogPresenter::declining();

        let report = engine().calculate(&mut store, &mut presenter, 100).unwrap();

        assert_eq!(report.reconciliation.unplaceable.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(presenter.has_notification(WarningSeverity::Warning));
        assert!(!report.fully_placed());
        // 剩餘裁片仍算 1 張布板的需求，訂單不可視為物料齊全
        assert_eq!(report.reconciliation.shortage.get("Canvas"), Some(1));
        assert_ne!(report.final_status, OrderStatus::ReadyInWorkshop);
        assert_eq!(report.final_status, OrderStatus::Cutting);
    }

    #[test]
    fn test_shelf_mode_reports_fabric_shortage() {
        // 分層排版需要 2 張布板，已分配 1 張，餘量 2 張可補足
        let mut store = base_store();
        let engine =
            CuttingEngine::new(CuttingConfig::new().with_packing_mode(PackingMode::Shelf)).unwrap();
        let mut presenter = LogPresenter::declining();

        let report = engine.calculate(&mut store, &mut presenter, 100).unwrap();

        assert_eq!(report.panels_required("Canvas"), Some(2));
        assert_eq!(report.reconciliation.shortage.get("Canvas"), Some(1));
        assert_eq!(report.final_status, OrderStatus::Cutting);
        assert_eq!(store.batch(10).unwrap().remainder, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CuttingConfig::new().with_max_panels_per_material(0);
        assert!(matches!(CuttingEngine::new(config), Err(CutError::InvalidConfig(_))));
    }
}
