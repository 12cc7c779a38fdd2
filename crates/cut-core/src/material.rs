//! 物料模型

use serde::{Deserialize, Serialize};

/// 物料ID
pub type MaterialId = u64;

/// 物料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// 布料（以整張布板裁剪）
    Fabric,
    /// 五金配件（按件計數）
    Hardware,
}

/// 物料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: MaterialId,

    /// 物料名稱（同一類別內唯一，查詢依名稱進行）
    pub name: String,

    /// 物料類別
    pub category: MaterialCategory,
}

impl Material {
    /// 創建新的物料
    pub fn new(id: MaterialId, name: impl Into<String>, category: MaterialCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }

    /// 創建布料
    pub fn fabric(id: MaterialId, name: impl Into<String>) -> Self {
        Self::new(id, name, MaterialCategory::Fabric)
    }

    /// 創建五金配件
    pub fn hardware(id: MaterialId, name: impl Into<String>) -> Self {
        Self::new(id, name, MaterialCategory::Hardware)
    }

    pub fn is_fabric(&self) -> bool {
        self.category == MaterialCategory::Fabric
    }

    pub fn is_hardware(&self) -> bool {
        self.category == MaterialCategory::Hardware
    }
}
