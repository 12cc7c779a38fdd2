//! 裁剪引擎配置模型

use serde::{Deserialize, Serialize};

use crate::{CutError, Result};

/// 裁剪引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuttingConfig {
    /// 排版模式
    pub packing_mode: PackingMode,

    /// 是否評估旋轉 90 度的方向
    pub allow_rotation: bool,

    /// 補料申請的申請人（員工ID）
    pub requester_id: u64,

    /// 單一布料最多消耗的布板數（None 表示不限制）
    ///
    /// 達到上限後剩餘裁片視為無法排入，並產生警告。
    pub max_panels_per_material: Option<u32>,
}

impl Default for CuttingConfig {
    fn default() -> Self {
        Self {
            packing_mode: PackingMode::IndependentCapacity,
            allow_rotation: true,
            requester_id: 1,
            max_panels_per_material: None,
        }
    }
}

impl CuttingConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置排版模式
    pub fn with_packing_mode(mut self, mode: PackingMode) -> Self {
        self.packing_mode = mode;
        self
    }

    /// 建構器模式：設置是否允許旋轉
    pub fn with_allow_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// 建構器模式：設置補料申請人
    pub fn with_requester_id(mut self, requester_id: u64) -> Self {
        self.requester_id = requester_id;
        self
    }

    /// 建構器模式：設置單一布料的布板上限
    pub fn with_max_panels_per_material(mut self, max_panels: u32) -> Self {
        self.max_panels_per_material = Some(max_panels);
        self
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    ///
    /// # 範例
    /// ```
    /// # use cut_core::{CuttingConfig, PackingMode};
    /// let config = CuttingConfig::from_json_str(r#"{ "packing_mode": "Shelf" }"#).unwrap();
    /// assert_eq!(config.packing_mode, PackingMode::Shelf);
    /// assert!(config.allow_rotation);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CuttingConfig =
            serde_json::from_str(json).map_err(|e| CutError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.max_panels_per_material == Some(0) {
            return Err(CutError::InvalidConfig(
                "max_panels_per_material 必須大於 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 排版模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackingMode {
    /// 獨立產能估算：每種裁片各自以整張布板計算可放數量（相容既有結果）
    IndependentCapacity,

    /// 層架排版：裁片按列實際排入，不會超出布板面積
    Shelf,
}

impl Default for PackingMode {
    fn default() -> Self {
        PackingMode::IndependentCapacity
    }
}
