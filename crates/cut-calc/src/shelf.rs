//! 分層排版（聯合放置）
//!
//! 裁片由左至右排在水平層上，目前層放滿時在其上方開新層。所有裁片共用同一張布板，
//! 放置總面積不會超過布板面積。

use cut_core::{fit_count, PanelSize};
use rust_decimal::Decimal;

use crate::packer::{oriented, widest_first, Layout, PieceSlot};

/// 以分層方式排版單張布板
pub(crate) fn shelf_layout(panel: PanelSize, slots: &[PieceSlot], rotated: bool) -> Layout {
    let mut layout = Layout::empty(slots.len());
    if !panel.is_valid() {
        return layout;
    }

    // 目前層（最上層）的底邊、高度與水平游標
    let mut shelf_y = Decimal::ZERO;
    let mut shelf_height = Decimal::ZERO;
    let mut cursor_x = Decimal::ZERO;

    for index in widest_first(slots) {
        let slot = &slots[index];
        let size = oriented(slot.size, rotated);
        if slot.remaining == 0 || !size.is_valid() {
            continue;
        }

        let mut remaining = slot.remaining;
        let mut placed = 0u32;

        while remaining > 0 {
            // 最上層可以長高，只要不超出布板
            let fits_height = shelf_y
                .checked_add(size.height)
                .is_some_and(|top| top <= panel.height);
            let across = if fits_height {
                fit_count(panel.width - cursor_x, size.width)
            } else {
                0
            };

            if across > 0 {
                let count = across.min(remaining);
                remaining -= count;
                placed += count;
                cursor_x += size.width * Decimal::from(count);
                shelf_height = shelf_height.max(size.height);
                continue;
            }

            // 空層也放不下，此裁片無法再放入
            if shelf_height.is_zero() {
                break;
            }
            shelf_y += shelf_height;
            shelf_height = Decimal::ZERO;
            cursor_x = Decimal::ZERO;
        }

        if placed > 0 {
            layout.record(index, &slot.name, size, placed);
        }
    }

    layout
}
