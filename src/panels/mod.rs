mod central_panel;
mod layers_panel;
mod search_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use layers_panel::layers_panel;
pub use search_panel::search_panel;
pub use tools_panel::tools_panel;

use crate::AnnotateApp;

/// Bottom line with the latest status message
pub fn status_bar(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if let Some(status) = app.status() {
                ui.label(status);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(app.editor().phase().label());
            });
        });
    });
}
