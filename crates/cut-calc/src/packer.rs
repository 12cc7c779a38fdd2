//! 布板排版
//!
//! 單張布板的排版 (`PanelPacker::pack`) 與逐張消耗布板直到裁片需求滿足的驅動迴圈
//! (`PanelPacker::pack_material`)。
//!
//! 預設的獨立產能估算中，每種裁片的可放數量都以整張空布板計算，不扣除其他裁片已佔用的空間。
//! 混合多種裁片時會高估單張布板的容量，這是既有計算結果的一部分，需保持一致；
//! 需要實際聯合排版時改用 `PackingMode::Shelf`。

use cut_core::{CuttingConfig, PackingMode, PanelPlacement, PanelSize, PieceDemand, PlacedPiece};
use rust_decimal::Decimal;

use crate::shelf;

/// 排版中的裁片（剩餘數量會隨每張布板遞減）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSlot {
    pub name: String,
    pub size: PanelSize,
    pub remaining: u32,
}

impl PieceSlot {
    pub fn new(name: impl Into<String>, size: PanelSize, remaining: u32) -> Self {
        Self {
            name: name.into(),
            size,
            remaining,
        }
    }

    pub fn from_demand(demand: &PieceDemand) -> Self {
        Self::new(demand.product_name.clone(), demand.size(), demand.quantity)
    }
}

/// 單張布板的排版結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPack {
    /// 排版（供繪圖）
    pub placement: PanelPlacement,

    /// 每個裁片（與輸入順序相同）在此布板上放置的數量
    pub consumed: Vec<u32>,
}

impl PanelPack {
    /// 此布板放置的裁片總數
    pub fn placed_total(&self) -> u32 {
        self.consumed.iter().sum()
    }
}

/// 無法排入的裁片需求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnplaceableDemand {
    pub material_name: String,
    pub piece_name: String,
    pub quantity: u32,
}

/// 單一布料的排版結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialPackResult {
    /// 布料名稱
    pub material_name: String,

    /// 布板尺寸
    pub panel: PanelSize,

    /// 需要的布板數
    pub panels_required: u32,

    /// 每張布板的排版
    pub placements: Vec<PanelPlacement>,

    /// 無法排入的剩餘需求
    pub unmet: Vec<UnplaceableDemand>,

    /// 剩餘需求仍需要的布板數（估算）
    ///
    /// 每種剩餘裁片以單獨排入空布板的容量估算；連一片都放不下的裁片記為 1 張。
    pub unmet_panels: u32,
}

impl MaterialPackResult {
    pub fn is_fully_placed(&self) -> bool {
        self.unmet.is_empty()
    }

    /// 需要的布板總數（含剩餘需求）
    pub fn total_panels_required(&self) -> u32 {
        self.panels_required.saturating_add(self.unmet_panels)
    }
}

/// 單一方向的排版候選
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) consumed: Vec<u32>,
    pub(crate) pieces: Vec<PlacedPiece>,
    pub(crate) area: Decimal,
}

impl Layout {
    pub(crate) fn empty(slot_count: usize) -> Self {
        Self {
            consumed: vec![0; slot_count],
            pieces: Vec::new(),
            area: Decimal::ZERO,
        }
    }

    pub(crate) fn record(&mut self, index: usize, name: &str, size: PanelSize, count: u32) {
        self.consumed[index] += count;
        self.area = self
            .area
            .saturating_add(size.area().saturating_mul(Decimal::from(count)));
        self.pieces.push(PlacedPiece {
            name: name.to_string(),
            width: size.width,
            height: size.height,
            count,
        });
    }
}

/// 放置時的尺寸（考慮旋轉）
pub(crate) fn oriented(size: PanelSize, rotated: bool) -> PanelSize {
    if rotated {
        size.rotated()
    } else {
        size
    }
}

/// 布板排版器
#[derive(Debug, Clone)]
pub struct PanelPacker {
    mode: PackingMode,
    allow_rotation: bool,
    max_panels: Option<u32>,
}

impl Default for PanelPacker {
    fn default() -> Self {
        Self::new(PackingMode::IndependentCapacity)
    }
}

impl PanelPacker {
    /// 創建排版器（允許旋轉、不限制布板數）
    pub fn new(mode: PackingMode) -> Self {
        Self {
            mode,
            allow_rotation: true,
            max_panels: None,
        }
    }

    pub fn from_config(config: &CuttingConfig) -> Self {
        Self {
            mode: config.packing_mode,
            allow_rotation: config.allow_rotation,
            max_panels: config.max_panels_per_material,
        }
    }

    /// 建構器模式：設置是否允許旋轉
    pub fn with_allow_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// 建構器模式：設置布板上限
    pub fn with_max_panels(mut self, max_panels: u32) -> Self {
        self.max_panels = Some(max_panels);
        self
    }

    pub fn mode(&self) -> PackingMode {
        self.mode
    }

    /// 排版單張布板
    ///
    /// 分別評估不旋轉與旋轉 90 度兩個方向，保留覆蓋面積較大者（相同時保留不旋轉）。
    /// 不修改輸入，各裁片放置數量回傳於 `consumed`。
    pub fn pack(&self, material_name: &str, panel: PanelSize, slots: &[PieceSlot]) -> PanelPack {
        let mut best = self.layout(panel, slots, false);
        let mut rotated = false;

        if self.allow_rotation {
            let candidate = self.layout(panel, slots, true);
            if candidate.area > best.area {
                best = candidate;
                rotated = true;
            }
        }

        PanelPack {
            placement: PanelPlacement {
                material_name: material_name.to_string(),
                panel,
                rotated,
                pieces: best.pieces,
            },
            consumed: best.consumed,
        }
    }

    fn layout(&self, panel: PanelSize, slots: &[PieceSlot], rotated: bool) -> Layout {
        match self.mode {
            PackingMode::IndependentCapacity => independent_layout(panel, slots, rotated),
            PackingMode::Shelf => shelf::shelf_layout(panel, slots, rotated),
        }
    }

    /// 計算單一布料需要的布板數
    ///
    /// 反覆排版直到所有裁片數量歸零。某張空布板一片都放不下（或達到布板上限）時提前結束，
    /// 剩餘需求記錄於 `unmet`。
    pub fn pack_material(
        &self,
        material_name: &str,
        panel: PanelSize,
        demands: &[PieceDemand],
    ) -> MaterialPackResult {
        let mut slots: Vec<PieceSlot> = demands
            .iter()
            .filter(|d| d.is_active())
            .map(PieceSlot::from_demand)
            .collect();

        tracing::debug!(
            "布料 {} 排版開始：布板 {}x{}，裁片 {} 種",
            material_name,
            panel.width,
            panel.height,
            slots.len()
        );

        let mut placements = Vec::new();
        let mut panels_required = 0u32;

        while slots.iter().any(|s| s.remaining > 0) {
            if let Some(max_panels) = self.max_panels {
                if panels_required >= max_panels {
                    tracing::warn!(
                        "布料 {} 已達布板上限 {}，停止排版",
                        material_name,
                        max_panels
                    );
                    break;
                }
            }

            let pack = self.pack(material_name, panel, &slots);
            if pack.placed_total() == 0 {
                tracing::warn!(
                    "布料 {} 的剩餘裁片無法排入空布板: {:?}",
                    material_name,
                    slots
                        .iter()
                        .filter(|s| s.remaining > 0)
                        .map(|s| (&s.name, s.remaining))
                        .collect::<Vec<_>>()
                );
                break;
            }

            for (slot, placed) in slots.iter_mut().zip(&pack.consumed) {
                slot.remaining -= placed;
            }
            panels_required += 1;

            tracing::debug!(
                "布料 {} 第 {} 張布板：放置 {} 片，覆蓋面積 {}，旋轉 {}",
                material_name,
                panels_required,
                pack.placed_total(),
                pack.placement.covered_area(),
                pack.placement.rotated
            );
            placements.push(pack.placement);
        }

        let unmet_panels = slots
            .iter()
            .filter(|s| s.remaining > 0)
            .map(|s| {
                let per_panel = self
                    .pack(material_name, panel, std::slice::from_ref(s))
                    .placed_total();
                if per_panel == 0 {
                    1
                } else {
                    s.remaining.div_ceil(per_panel)
                }
            })
            .fold(0u32, u32::saturating_add);

        let unmet = slots
            .into_iter()
            .filter(|s| s.remaining > 0)
            .map(|s| UnplaceableDemand {
                material_name: material_name.to_string(),
                piece_name: s.name,
                quantity: s.remaining,
            })
            .collect();

        MaterialPackResult {
            material_name: material_name.to_string(),
            panel,
            panels_required,
            placements,
            unmet,
            unmet_panels,
        }
    }
}

/// 獨立產能估算：每種裁片各自以整張布板計算 `floor(W/w) × floor(H/h)`
fn independent_layout(panel: PanelSize, slots: &[PieceSlot], rotated: bool) -> Layout {
    let mut layout = Layout::empty(slots.len());

    for index in widest_first(slots) {
        let slot = &slots[index];
        if slot.remaining == 0 {
            continue;
        }
        let size = oriented(slot.size, rotated);
        let (columns, rows) = size.grid_on(&panel);
        let capacity = u64::from(columns) * u64::from(rows);
        let placed = capacity.min(u64::from(slot.remaining)) as u32;
        if placed > 0 {
            layout.record(index, &slot.name, size, placed);
        }
    }

    layout
}

/// 依寬度、高度遞減排列的裁片索引（以未旋轉尺寸排序）
pub(crate) fn widest_first(slots: &[PieceSlot]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| {
        slots[b]
            .size
            .width
            .cmp(&slots[a].size.width)
            .then(slots[b].size.height.cmp(&slots[a].size.height))
    });
    order
}
