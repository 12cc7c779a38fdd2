//! 呈現層介面

use cut_core::{PanelPlacement, PanelSize};

use crate::supply_request::SupplyPlan;
use crate::WarningSeverity;

/// 呈現層：繪製裁剪圖、確認補料申請、顯示通知
pub trait Presenter {
    /// 每消耗一張布板呼叫一次
    fn render_panels(&mut self, material_name: &str, panel: PanelSize, placement: &PanelPlacement);

    /// 詢問是否建立補料申請（阻塞直到使用者回覆）
    fn confirm_supply_request(&mut self, plan: &SupplyPlan) -> bool;

    fn notify(&mut self, severity: WarningSeverity, message: &str);
}

/// 以 tracing 輸出的呈現層，確認結果固定
///
/// 同時保留呈現過的內容，供示例與測試檢查。
#[derive(Debug, Clone, Default)]
pub struct LogPresenter {
    approve_supply: bool,
    rendered: Vec<PanelPlacement>,
    notifications: Vec<(WarningSeverity, String)>,
    confirmations: Vec<SupplyPlan>,
}

impl LogPresenter {
    /// 自動同意補料申請
    pub fn approving() -> Self {
        Self {
            approve_supply: true,
            ..Self::default()
        }
    }

    /// 自動拒絕補料申請
    pub fn declining() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> &[PanelPlacement] {
        &self.rendered
    }

    pub fn notifications(&self) -> &[(WarningSeverity, String)] {
        &self.notifications
    }

    /// 被詢問過的補料計劃
    pub fn confirmations(&self) -> &[SupplyPlan] {
        &self.confirmations
    }

    pub fn has_notification(&self, severity: WarningSeverity) -> bool {
        self.notifications.iter().any(|(s, _)| *s == severity)
    }
}

impl Presenter for LogPresenter {
    fn render_panels(&mut self, material_name: &str, panel: PanelSize, placement: &PanelPlacement) {
        tracing::info!(
            "布料 {} 布板 {}x{}：{} 片，覆蓋面積 {}",
            material_name,
            panel.width,
            panel.height,
            placement.piece_count(),
            placement.covered_area()
        );
        for piece in &placement.pieces {
            tracing::debug!("  {} {}x{} × {}", piece.name, piece.width, piece.height, piece.count);
        }
        self.rendered.push(placement.clone());
    }

    fn confirm_supply_request(&mut self, plan: &SupplyPlan) -> bool {
        tracing::info!(
            "訂單 {} 餘量不足，補料明細:\n{}\n回覆: {}",
            plan.order_id,
            plan.details(),
            if self.approve_supply { "同意" } else { "拒絕" }
        );
        self.confirmations.push(plan.clone());
        self.approve_supply
    }

    fn notify(&mut self, severity: WarningSeverity, message: &str) {
        match severity {
            WarningSeverity::Info => tracing::info!("{}", message),
            WarningSeverity::Warning => tracing::warn!("{}", message),
            WarningSeverity::Error => tracing::error!("{}", message),
        }
        self.notifications.push((severity, message.to_string()));
    }
}
