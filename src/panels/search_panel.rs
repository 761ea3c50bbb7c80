use crate::AnnotateApp;

const THUMB_SIZE: f32 = 160.0;
const COLUMNS: usize = 4;

/// Query box and a grid of clickable thumbnails.
pub fn search_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Find a photo to annotate");

        ui.horizontal(|ui| {
            let search = app.search_mut();
            let field = ui.add(
                egui::TextEdit::singleline(&mut search.query)
                    .hint_text("e.g. cats")
                    .desired_width(280.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Search").clicked() || submitted {
                search.submit();
            }
            if search.is_searching() {
                ui.spinner();
            }
        });

        if let Some(error) = app.search().error() {
            ui.colored_label(ui.visuals().error_fg_color, error);
        }

        ui.separator();

        let mut chosen = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("search_results")
                .num_columns(COLUMNS)
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    for (index, photo) in app.search().results().iter().enumerate() {
                        let image = egui::Image::new(photo.thumb_url.as_str())
                            .max_size(egui::Vec2::splat(THUMB_SIZE))
                            .maintain_aspect_ratio(true);
                        let mut response = ui.add(egui::ImageButton::new(image));
                        if let Some(description) = &photo.description {
                            response = response.on_hover_text(description.as_str());
                        }
                        if response.clicked() {
                            chosen = Some(index);
                        }
                        if (index + 1) % COLUMNS == 0 {
                            ui.end_row();
                        }
                    }
                });
        });

        if let Some(index) = chosen {
            app.select_photo(index);
        }
    });
}
