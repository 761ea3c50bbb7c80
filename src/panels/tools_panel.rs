use crate::AnnotateApp;
use crate::element::ShapeKind;

/// Editor toolbar: add objects, delete the selection, export, close.
pub fn tools_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("tools_panel").show(ctx, |ui| {
        let phase = app.editor().phase();
        let has_selection = app
            .editor()
            .surface()
            .and_then(|surface| surface.scene().selected())
            .is_some();
        let mounted = phase.is_mounted();

        ui.horizontal(|ui| {
            if ui.add_enabled(mounted, egui::Button::new("Add Text")).clicked() {
                log::info!("Toolbar: add text");
                if let Err(err) = app.editor_mut().add_text() {
                    app.set_status(err.to_string());
                }
            }

            ui.separator();

            for kind in ShapeKind::ALL {
                let label = format!("Add {}", capitalized(kind.as_str()));
                if ui.add_enabled(mounted, egui::Button::new(label)).clicked() {
                    log::info!("Toolbar: add {kind}");
                    if let Err(err) = app.editor_mut().add_shape(kind) {
                        app.set_status(err.to_string());
                    }
                }
            }

            ui.separator();

            if ui
                .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                .clicked()
            {
                if let Err(err) = app.editor_mut().remove_selected() {
                    app.set_status(err.to_string());
                }
            }

            if ui.add_enabled(mounted, egui::Button::new("Download PNG")).clicked() {
                app.export();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    app.close_editor();
                }
                if phase.is_loading() {
                    ui.spinner();
                    ui.label("Loading image…");
                }
            });
        });
    });
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
