//! 訂單裁剪計算示例

use anyhow::Context;
use cutplan::{
    logging, AllocationOutcome, CuttingConfig, CuttingEngine, LogPresenter, Material,
    MaterialDemandAggregator, MemoryStore, Order, OrderComposition, OrderStatus, PanelSize,
    StockBatch,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("=== 訂單裁剪計算示例 ===\n");

    // 建立庫存與訂單
    let mut store = MemoryStore::new();
    store
        .add_material(Material::fabric(1, "Canvas"))
        .add_material(Material::fabric(2, "Lining"))
        .add_material(Material::hardware(3, "Zipper"))
        .add_order(Order::new(42, OrderStatus::Confirmed).with_customer("North Atelier"))
        .add_composition(OrderComposition::new(
            420,
            42,
            "Tote",
            24,
            Decimal::from(100),
            Decimal::from(50),
        ))
        .add_composition(OrderComposition::new(
            421,
            42,
            "Pouch",
            10,
            Decimal::from(80),
            Decimal::from(40),
        ))
        .add_batch(StockBatch::fabric(
            1,
            1,
            "Canvas",
            PanelSize::new(Decimal::from(300), Decimal::from(200)),
            10,
        ).with_remainder(4))
        .add_batch(StockBatch::fabric(
            2,
            2,
            "Lining",
            PanelSize::new(Decimal::from(150), Decimal::from(140)),
            2,
        ).with_remainder(0))
        .add_batch(StockBatch::hardware(3, 3, "Zipper", 20).with_remainder(6));
    store.assign(420, 1, 1);
    store.assign(421, 1, 0);
    store.assign(421, 2, 1);
    store.assign(420, 3, 34);

    let overview = MaterialDemandAggregator::overview(&store, 42)?;
    println!("訂單 {} ({})", overview.order.id, overview.order.status);
    println!("  產品總數: {}", overview.total_products);
    println!("  布料總面積: {} cm²", overview.total_area);
    for batch in &overview.fabric_batches {
        println!(
            "  布料批次 {}: {} × {}",
            batch.batch_id, batch.material_name, batch.quantity
        );
    }
    for tally in &overview.hardware {
        println!(
            "  五金 {}: 需求 {}, 庫存 {}",
            tally.material_name, tally.required, tally.available
        );
    }

    // 執行計算，餘量不足時自動同意補料
    let engine = CuttingEngine::new(CuttingConfig::default())?;
    let mut presenter = LogPresenter::approving();
    let report = engine
        .calculate(&mut store, &mut presenter, 42)
        .context("裁剪計算失敗")?;

    println!("\n排版結果:");
    for pack in &report.packs {
        println!(
            "  {}: 需要 {} 張 {}x{} 布板",
            pack.material_name, pack.panels_required, pack.panel.width, pack.panel.height
        );
    }

    println!("\n短缺:");
    for entry in report.reconciliation.shortage.entries() {
        println!("  {}: {}", entry.material_name, entry.missing);
    }

    match &report.outcome {
        AllocationOutcome::Satisfied => println!("\n物料齊全"),
        AllocationOutcome::ResolvedFromRemainder(allocation) => {
            println!("\n已從庫存餘量補足 {} 種物料", allocation.applied.len())
        }
        AllocationOutcome::SupplyRequested(supply) => {
            println!("\n已建立 {} 筆補料申請", supply.created.len())
        }
        AllocationOutcome::Declined(deficits) => {
            println!("\n未建立補料申請，{} 種物料不足", deficits.len())
        }
    }

    println!(
        "訂單狀態: {} -> {}（耗時 {:?} ms）",
        report.previous_status, report.final_status, report.calculation_time_ms
    );

    Ok(())
}
