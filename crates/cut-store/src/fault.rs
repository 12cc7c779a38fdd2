//! 故障注入

use cut_core::CutError;

/// 可注入故障的寫入操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    UpdateBatchRemainder,
    UpsertAssignment,
    CreateAssignment,
    CreateIntake,
    CreatePendingBatch,
    UpdateOrderStatus,
}

/// 故障計劃：指定操作在成功 `after` 次之後失敗
#[derive(Debug, Clone)]
pub struct FaultPlan {
    operation: StoreOperation,
    after: u32,
    seen: u32,
}

impl FaultPlan {
    /// 第一次呼叫即失敗
    pub fn immediately(operation: StoreOperation) -> Self {
        Self::after(operation, 0)
    }

    /// 前 `after` 次成功，之後失敗
    pub fn after(operation: StoreOperation, after: u32) -> Self {
        Self {
            operation,
            after,
            seen: 0,
        }
    }

    /// 記錄一次操作，若應失敗則回傳查詢錯誤
    pub fn check(&mut self, operation: StoreOperation) -> Result<(), CutError> {
        if operation != self.operation {
            return Ok(());
        }
        self.seen += 1;
        if self.seen > self.after {
            return Err(CutError::QueryFailure(format!(
                "注入故障: {:?} 第 {} 次呼叫",
                operation, self.seen
            )));
        }
        Ok(())
    }
}
