use eframe::egui;

use crate::session::{SessionState, Tab};
use crate::ui::{chat_panel, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CompressorLabApp {
    pub state: SessionState,
}

impl eframe::App for CompressorLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tab strip ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: per-tab controls ----
        if self.state.tab != Tab::Chat {
            egui::SidePanel::left("controls_panel")
                .default_width(260.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Overview => plot::overview_view(ui, &self.state),
            Tab::Analysis => plot::analysis_view(ui, &mut self.state),
            Tab::Chat => chat_panel::chat_panel(ui, &mut self.state),
        });

        // Keep draining stream events while a reply is in flight.
        if self.state.chat.reply.is_some() {
            ctx.request_repaint();
        }
    }
}
