//! 分配工作階段

use chrono::NaiveDate;
use cut_core::{CutError, InventoryStore, Order, OrderId, Result};
use uuid::Uuid;

/// 單一訂單的計算工作階段
///
/// 每次計算開啟一個工作階段並顯式傳遞給各元件，取代共用的「目前訂單」狀態。
#[derive(Debug, Clone)]
pub struct AllocationSession {
    /// 工作階段ID
    pub id: Uuid,

    /// 訂單快照（狀態於轉換提交後更新）
    pub order: Order,

    /// 營業日（補料申請日期）
    pub today: NaiveDate,
}

impl AllocationSession {
    /// 創建新的工作階段
    pub fn new(order: Order, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            order,
            today,
        }
    }

    /// 從存儲讀取訂單並開啟工作階段
    ///
    /// 訂單不存在時回傳 `OrderNotFound`，狀態不可計算時回傳 `OrderNotEligible`。
    pub fn open<S: InventoryStore>(store: &S, order_id: OrderId) -> Result<Self> {
        let order = store.fetch_order(order_id)?;
        if !order.status.is_calculable() {
            return Err(CutError::OrderNotEligible {
                order_id,
                status: order.status,
            });
        }
        Ok(Self::new(order, chrono::Local::now().date_naive()))
    }

    /// 建構器模式：設置營業日
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn order_id(&self) -> OrderId {
        self.order.id
    }
}
