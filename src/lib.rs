//! # cutplan
//!
//! 訂單裁剪排版與物料分配：計算每種布料需要的布板數、對照庫存找出短缺、
//! 以庫存餘量補足或建立補料申請，並推進訂單狀態。
//!
//! ```no_run
//! use cutplan::{logging, CuttingConfig, CuttingEngine, LogPresenter, MemoryStore};
//!
//! logging::init();
//! let engine = CuttingEngine::new(CuttingConfig::default()).unwrap();
//! let mut store = MemoryStore::new();
//! let mut presenter = LogPresenter::approving();
//! let report = engine.calculate(&mut store, &mut presenter, 1);
//! ```

pub mod logging;

pub use cut_calc::*;
pub use cut_core::*;
pub use cut_store::{FaultPlan, MemoryStore, StoreOperation, TouchedRows};
