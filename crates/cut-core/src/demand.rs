//! 訂單明細與裁片需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderId;
use crate::placement::PanelSize;

/// 訂單明細ID
pub type CompositionId = u64;

/// 訂單明細（產品 × 數量 × 尺寸）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderComposition {
    /// 明細ID
    pub id: CompositionId,

    /// 所屬訂單
    pub order_id: OrderId,

    /// 產品名稱
    pub product_name: String,

    /// 數量
    pub quantity: u32,

    /// 裁片寬度（公分）
    pub width: Decimal,

    /// 裁片高度（公分）
    pub height: Decimal,
}

impl OrderComposition {
    pub fn new(
        id: CompositionId,
        order_id: OrderId,
        product_name: impl Into<String>,
        quantity: u32,
        width: Decimal,
        height: Decimal,
    ) -> Self {
        Self {
            id,
            order_id,
            product_name: product_name.into(),
            quantity,
            width,
            height,
        }
    }

    /// 此明細所需布料面積
    pub fn area(&self) -> Decimal {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// 裁片需求（某訂單需要從某布料裁出的矩形）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDemand {
    /// 來源訂單明細
    pub composition_id: CompositionId,

    /// 產品名稱
    pub product_name: String,

    /// 布料名稱
    pub material_name: String,

    /// 寬度（公分）
    pub width: Decimal,

    /// 高度（公分）
    pub height: Decimal,

    /// 需求數量（0 表示無需求）
    pub quantity: u32,
}

impl PieceDemand {
    pub fn new(
        composition_id: CompositionId,
        product_name: impl Into<String>,
        material_name: impl Into<String>,
        width: Decimal,
        height: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            composition_id,
            product_name: product_name.into(),
            material_name: material_name.into(),
            width,
            height,
            quantity,
        }
    }

    pub fn size(&self) -> PanelSize {
        PanelSize::new(self.width, self.height)
    }

    /// 是否仍有需求
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_area() {
        let composition =
            OrderComposition::new(1, 7, "Tote", 10, Decimal::from(100), Decimal::from(50));
        assert_eq!(composition.area(), Decimal::from(50000));
    }

    #[test]
    fn test_zero_quantity_demand_is_inert() {
        let demand = PieceDemand::new(
            1,
            "Tote",
            "Canvas",
            Decimal::from(100),
            Decimal::from(50),
            0,
        );
        assert!(!demand.is_active());
        assert_eq!(demand.size().area(), Decimal::from(5000));
    }
}
