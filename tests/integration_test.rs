//! 集成測試

use chrono::NaiveDate;
use cutplan::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

/// 工坊訂單：
/// - 訂單 100（已確認）：Tote 100×50 × 10、Pouch 80×40 × 5，布料 Canvas 300×200 已分配 1 張
/// - Zipper 需求 40，庫存兩批共 25（餘量由參數指定）
fn workshop(zipper_remainders: (u32, u32)) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .add_material(Material::fabric(1, "Canvas"))
        .add_material(Material::hardware(2, "Zipper"))
        .add_order(
            Order::new(100, OrderStatus::Confirmed)
                .with_customer("North Atelier")
                .with_manager("Lin"),
        )
        .add_composition(OrderComposition::new(1000, 100, "Tote", 10, d(100), d(50)))
        .add_composition(OrderComposition::new(1001, 100, "Pouch", 5, d(80), d(40)))
        .add_batch(StockBatch::fabric(10, 1, "Canvas", PanelSize::new(d(300), d(200)), 6).with_remainder(2))
        .add_batch(StockBatch::hardware(20, 2, "Zipper", 10).with_remainder(zipper_remainders.0))
        .add_batch(StockBatch::hardware(21, 2, "Zipper", 15).with_remainder(zipper_remainders.1));
    store.assign(1000, 10, 1);
    store.assign(1001, 10, 0);
    store.assign(1000, 20, 40);
    store
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
}

#[test]
fn test_single_panel_scenario() {
    // 300×200 布板：A 100×50 × 10 與 B 80×40 × 5 只需一張，覆蓋面積 66000
    logging::init_test();

    let packer = PanelPacker::default();
    let result = packer.pack_material(
        "Canvas",
        PanelSize::new(d(300), d(200)),
        &[
            PieceDemand::new(1, "A", "Canvas", d(100), d(50), 10),
            PieceDemand::new(2, "B", "Canvas", d(80), d(40), 5),
        ],
    );

    assert_eq!(result.panels_required, 1);
    assert_eq!(result.placements[0].covered_area(), d(66000));
    // 展開後的矩形數量與放置數量一致
    assert_eq!(result.placements[0].cells().len(), 15);
}

#[test]
fn test_zipper_shortage_scenario() {
    let store = workshop((8, 12));
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let session = engine.open_session(&store, 100).unwrap();

    let plan = engine.plan(&store, &session).unwrap();

    assert_eq!(
        plan.reconciliation.shortage.entries(),
        vec![ShortageEntry {
            material_name: "Zipper".to_string(),
            missing: 15,
        }]
    );
}

#[test]
fn test_zipper_drained_from_remainder() {
    logging::init_test();
    let mut store = workshop((8, 12));
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let mut presenter = LogPresenter::declining();

    let before = store.fetch_remainder("Zipper").unwrap();
    let report = engine.calculate(&mut store, &mut presenter, 100).unwrap();
    let after = store.fetch_remainder("Zipper").unwrap();

    // 批次依ID遞增提領：20 提領 8、21 提領 7
    assert_eq!(before - after, 15);
    assert_eq!(store.batch(20).unwrap().remainder, 0);
    assert_eq!(store.batch(21).unwrap().remainder, 5);
    assert_eq!(report.final_status, OrderStatus::Cutting);
    assert_eq!(store.order(100).unwrap().status, OrderStatus::Cutting);

    // 提領與分配增加量一致
    let drawn: u32 = store
        .assignments_for_batch(20)
        .iter()
        .chain(store.assignments_for_batch(21).iter())
        .map(|a| a.quantity)
        .sum();
    assert_eq!(drawn, 40 + 15);
    assert_eq!(store.last_committed().batches().len(), 2);
}

#[rstest]
#[case::covered((8, 12), true, OrderStatus::Cutting)]
#[case::confirmed((2, 3), true, OrderStatus::MaterialsOrdered)]
#[case::declined((2, 3), false, OrderStatus::Confirmed)]
fn test_status_paths(
    #[case] remainders: (u32, u32),
    #[case] approve: bool,
    #[case] expected: OrderStatus,
) {
    let mut store = workshop(remainders);
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let mut presenter = if approve {
        LogPresenter::approving()
    } else {
        LogPresenter::declining()
    };

    let report = engine.calculate(&mut store, &mut presenter, 100).unwrap();

    assert_eq!(report.final_status, expected);
    assert_eq!(store.order(100).unwrap().status, expected);
}

#[test]
fn test_ready_when_nothing_missing() {
    let mut store = workshop((0, 0));
    // 補足 Zipper 庫存
    store.add_batch(StockBatch::hardware(22, 2, "Zipper", 15));
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let mut presenter = LogPresenter::declining();

    let report = engine.calculate(&mut store, &mut presenter, 100).unwrap();

    assert!(report.reconciliation.shortage.is_empty());
    assert_eq!(report.final_status, OrderStatus::ReadyInWorkshop);
}

#[test]
fn test_supply_request_records() {
    let mut store = workshop((2, 3));
    let engine = CuttingEngine::new(CuttingConfig::new().with_requester_id(9)).unwrap();
    let mut presenter = LogPresenter::approving();

    let report = engine.calculate(&mut store, &mut presenter, 100).unwrap();

    let AllocationOutcome::SupplyRequested(supply) = &report.outcome else {
        panic!("expected a supply request");
    };
    let intake = store.intakes()[0];
    assert_eq!(intake.requester_id, 9);
    assert!(intake.supplier_id.is_none());
    assert_eq!(intake.total_amount, Decimal::ZERO);

    let pending = store.batch(supply.created[0].batch_id).unwrap();
    assert!(pending.is_pending());
    assert_eq!(pending.remainder, 0);
    // 待到貨批次不計入五金庫存，再次計算仍有相同短缺
    let session = AllocationSession::new(store.order(100).unwrap().clone(), today());
    assert!(matches!(
        engine.plan(&store, &session),
        Ok(plan) if plan.reconciliation.shortage.get("Zipper") == Some(15)
    ));
}

#[test]
fn test_supply_commit_failure_rolls_back() {
    let mut store = workshop((2, 3));
    store.inject_fault(FaultPlan::immediately(StoreOperation::CreatePendingBatch));
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let mut presenter = LogPresenter::approving();

    let result = engine.calculate(&mut store, &mut presenter, 100);

    assert!(matches!(result, Err(CutError::QueryFailure(_))));
    assert!(store.intakes().is_empty());
    assert_eq!(store.order(100).unwrap().status, OrderStatus::Confirmed);
    assert!(presenter.has_notification(WarningSeverity::Error));
}

#[test]
fn test_connection_failure_propagates() {
    let mut store = workshop((8, 12));
    store.disconnect();
    let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
    let mut presenter = LogPresenter::declining();

    assert!(matches!(
        engine.calculate(&mut store, &mut presenter, 100),
        Err(CutError::ConnectionFailure(_))
    ));
}

#[test]
fn test_order_overview() {
    let store = workshop((8, 12));

    let overview = MaterialDemandAggregator::overview(&store, 100).unwrap();

    assert_eq!(overview.order.customer.as_deref(), Some("North Atelier"));
    assert_eq!(overview.total_products, 15);
    assert_eq!(overview.total_area, d(66000));
    assert_eq!(overview.fabric_batches[0].size, Some(PanelSize::new(d(300), d(200))));
    assert_eq!(overview.hardware[0].required, 40);
    assert_eq!(overview.hardware[0].available, 25);
}

#[test]
fn test_config_from_json() {
    let config = CuttingConfig::from_json_str(r#"{"packing_mode": "Shelf", "requester_id": 3}"#).unwrap();

    assert_eq!(config.packing_mode, PackingMode::Shelf);
    assert!(config.allow_rotation);
    assert!(CuttingEngine::new(config).is_ok());
}
