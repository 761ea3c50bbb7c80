use crate::AnnotateApp;
use crate::layer::LayerEntry;

/// Read-only list of scene objects in paint order; clicking a row selects it.
pub fn layers_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Layers");

            let Some(surface) = app.editor_mut().surface_mut() else {
                ui.label("No canvas");
                return;
            };
            let entries: Vec<LayerEntry> = surface.scene().layer_summary().entries().to_vec();
            let selected = surface.scene().selected();

            if entries.is_empty() {
                ui.weak("Nothing on the canvas yet");
                return;
            }

            let mut clicked = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("layers_grid")
                    .num_columns(4)
                    .spacing([12.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.strong("#");
                        ui.strong("Type");
                        ui.strong("Position");
                        ui.strong("Details");
                        ui.end_row();

                        // topmost first, like a layer stack
                        for entry in entries.iter().rev() {
                            let is_selected = selected == Some(entry.id);
                            if ui
                                .selectable_label(is_selected, format!("{} (id {})", entry.index, entry.id))
                                .clicked()
                            {
                                clicked = Some(entry.id);
                            }
                            ui.label(entry.kind);
                            ui.label(format!("{:.0}, {:.0}", entry.x, entry.y));
                            ui.label(details(entry));
                            ui.end_row();
                        }
                    });
            });

            if let Some(id) = clicked {
                surface.select(Some(id));
            }
        });
}

fn details(entry: &LayerEntry) -> String {
    let mut parts = Vec::new();
    if let (Some(width), Some(height)) = (entry.width, entry.height) {
        parts.push(format!("{width:.0}×{height:.0}"));
    }
    if let Some(text) = &entry.text {
        parts.push(format!("\"{text}\""));
    }
    if let Some(size) = entry.font_size {
        parts.push(format!("{size}px"));
    }
    if let Some(radius) = entry.radius {
        parts.push(format!("r={radius}"));
    }
    if let Some(fill) = &entry.fill {
        parts.push(fill.clone());
    }
    parts.join(" ")
}
