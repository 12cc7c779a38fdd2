//! 布板尺寸與排版結果

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 矩形尺寸（公分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: Decimal,
    pub height: Decimal,
}

impl PanelSize {
    pub fn new(width: Decimal, height: Decimal) -> Self {
        Self { width, height }
    }

    /// 面積
    pub fn area(&self) -> Decimal {
        self.width.saturating_mul(self.height)
    }

    /// 寬高皆為正數才可參與裁剪
    pub fn is_valid(&self) -> bool {
        self.width > Decimal::ZERO && self.height > Decimal::ZERO
    }

    /// 旋轉 90 度
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// 以此尺寸在 `panel` 上排成網格時的（列數, 行數）
    ///
    /// 任一邊非正數時回傳 (0, 0)。
    pub fn grid_on(&self, panel: &PanelSize) -> (u32, u32) {
        if !self.is_valid() || !panel.is_valid() {
            return (0, 0);
        }
        (
            fit_count(panel.width, self.width),
            fit_count(panel.height, self.height),
        )
    }
}

/// `length` 內可並排幾個 `piece`（`floor(length / piece)`，飽和至 `u32::MAX`）
///
/// 任一方非正數時回傳 0。
pub fn fit_count(length: Decimal, piece: Decimal) -> u32 {
    if length <= Decimal::ZERO || piece <= Decimal::ZERO {
        return 0;
    }
    match length.checked_div(piece) {
        Some(quotient) => quotient.floor().to_u32().unwrap_or(u32::MAX),
        None => u32::MAX,
    }
}

/// 單張布板上某一種裁片的放置結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    /// 產品（裁片）名稱
    pub name: String,

    /// 放置時的寬度（已考慮旋轉）
    pub width: Decimal,

    /// 放置時的高度（已考慮旋轉）
    pub height: Decimal,

    /// 放置數量
    pub count: u32,
}

impl PlacedPiece {
    pub fn size(&self) -> PanelSize {
        PanelSize::new(self.width, self.height)
    }

    /// 覆蓋面積
    pub fn area(&self) -> Decimal {
        self.width * self.height * Decimal::from(self.count)
    }
}

/// 單張布板的排版結果（供繪製裁剪圖使用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPlacement {
    /// 布料名稱
    pub material_name: String,

    /// 布板尺寸
    pub panel: PanelSize,

    /// 是否採用旋轉 90 度的方向
    pub rotated: bool,

    /// 各裁片的放置結果
    pub pieces: Vec<PlacedPiece>,
}

impl PanelPlacement {
    /// 覆蓋總面積
    pub fn covered_area(&self) -> Decimal {
        self.pieces.iter().map(PlacedPiece::area).sum()
    }

    /// 放置的裁片總數
    pub fn piece_count(&self) -> u32 {
        self.pieces.iter().map(|p| p.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.piece_count() == 0
    }

    /// 展開為逐片矩形（每種裁片自左下角起按列排成網格）
    ///
    /// 各種裁片的網格互相獨立，與獨立產能估算的排版一致。
    pub fn cells(&self) -> Vec<PanelCell> {
        let mut cells = Vec::new();
        for piece in &self.pieces {
            let (columns, _) = piece.size().grid_on(&self.panel);
            if columns == 0 {
                continue;
            }
            for i in 0..piece.count {
                let row = i / columns;
                let col = i % columns;
                cells.push(PanelCell {
                    name: piece.name.clone(),
                    x: piece.width * Decimal::from(col),
                    y: piece.height * Decimal::from(row),
                    width: piece.width,
                    height: piece.height,
                });
            }
        }
        cells
    }
}

/// 裁剪圖上的單一裁片矩形
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelCell {
    pub name: String,
    pub x: Decimal,
    pub y: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 50, (3, 4))]
    #[case(80, 40, (3, 5))]
    #[case(301, 10, (0, 20))]
    #[case(0, 10, (0, 0))]
    #[case(-5, 10, (0, 0))]
    fn test_grid_on_panel(#[case] width: i64, #[case] height: i64, #[case] expected: (u32, u32)) {
        let panel = PanelSize::new(Decimal::from(300), Decimal::from(200));
        let piece = PanelSize::new(Decimal::from(width), Decimal::from(height));

        assert_eq!(piece.grid_on(&panel), expected);
    }

    #[test]
    fn test_grid_on_extreme_ratios() {
        let panel = PanelSize::new(Decimal::from(1_000_000), Decimal::from(200));

        // 商超出 Decimal 範圍時不 panic，視為飽和
        let tiny = PanelSize::new(Decimal::new(1, 25), Decimal::from(10));
        assert_eq!(tiny.grid_on(&panel), (u32::MAX, 20));

        // 商超過 u32 時飽和，不可變成 0
        let thin = PanelSize::new(Decimal::new(1, 6), Decimal::from(10));
        assert_eq!(thin.grid_on(&panel), (u32::MAX, 20));
    }

    #[test]
    fn test_fit_count() {
        assert_eq!(fit_count(Decimal::from(300), Decimal::from(100)), 3);
        assert_eq!(fit_count(Decimal::from(300), Decimal::ZERO), 0);
        assert_eq!(fit_count(Decimal::ZERO, Decimal::from(10)), 0);
    }

    #[test]
    fn test_fractional_dimensions() {
        // 150.5 x 100 布板，50.1 寬的裁片只能放 3 列
        let panel = PanelSize::new(Decimal::new(1505, 1), Decimal::from(100));
        let piece = PanelSize::new(Decimal::new(501, 1), Decimal::from(25));

        assert_eq!(piece.grid_on(&panel), (3, 4));
    }

    #[test]
    fn test_placement_area_and_cells() {
        let placement = PanelPlacement {
            material_name: "Canvas".to_string(),
            panel: PanelSize::new(Decimal::from(300), Decimal::from(200)),
            rotated: false,
            pieces: vec![PlacedPiece {
                name: "Bag".to_string(),
                width: Decimal::from(100),
                height: Decimal::from(50),
                count: 4,
            }],
        };

        assert_eq!(placement.covered_area(), Decimal::from(20000));
        assert_eq!(placement.piece_count(), 4);

        let cells = placement.cells();
        assert_eq!(cells.len(), 4);
        // 第 4 片換到第二列
        assert_eq!(cells[3].x, Decimal::ZERO);
        assert_eq!(cells[3].y, Decimal::from(50));
        assert_eq!(cells[2].x, Decimal::from(200));
    }
}
