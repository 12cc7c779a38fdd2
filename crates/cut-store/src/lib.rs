//! # Cutting Store
//!
//! 記憶體內的庫存持久化實作（交易快照、故障注入），供測試與示例使用

pub mod fault;
pub mod memory;
pub mod touched;

// Re-export 主要類型
pub use fault::{FaultPlan, StoreOperation};
pub use memory::MemoryStore;
pub use touched::TouchedRows;
