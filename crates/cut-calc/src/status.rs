//! 訂單狀態轉換

use cut_core::{InventoryStore, OrderStatus, Result};

use crate::session::AllocationSession;

/// 觸發狀態轉換的分配結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTrigger {
    /// 無短缺
    NoShortage,
    /// 短缺已由餘量補足
    CoveredFromRemainder,
    /// 已建立補料申請
    SupplyRequested,
    /// 使用者拒絕建立補料申請
    Declined,
}

/// 訂單狀態機
pub struct OrderStatusMachine;

impl OrderStatusMachine {
    /// 依分配結果決定下一個狀態，`None` 表示維持不變
    pub fn next_status(current: OrderStatus, trigger: StatusTrigger) -> Result<Option<OrderStatus>> {
        let target = match trigger {
            StatusTrigger::NoShortage => OrderStatus::ReadyInWorkshop,
            StatusTrigger::CoveredFromRemainder => OrderStatus::Cutting,
            StatusTrigger::SupplyRequested => OrderStatus::MaterialsOrdered,
            StatusTrigger::Declined => return Ok(None),
        };
        current.transition_to(target).map(Some)
    }

    /// 寫入狀態轉換
    ///
    /// 只更新存儲；工作階段中的訂單快照由呼叫方在交易提交後更新。
    pub fn advance<S: InventoryStore>(
        store: &mut S,
        session: &AllocationSession,
        trigger: StatusTrigger,
    ) -> Result<Option<OrderStatus>> {
        let current = session.order.status;
        let next = Self::next_status(current, trigger)?;

        match next {
            Some(status) => {
                store.update_order_status(session.order_id(), status)?;
                tracing::info!(
                    "訂單 {} 狀態: {} -> {}",
                    session.order_id(),
                    current,
                    status
                );
            }
            None => tracing::info!("訂單 {} 狀態維持 {}", session.order_id(), current),
        }

        Ok(next)
    }
}
