use egui::{Color32, Pos2, Rect, Stroke};

use crate::AnnotateApp;
use crate::element::{Element, SELECTION_PADDING};
use crate::input::{CanvasTransform, collect_canvas_input};

const SELECTION_STROKE: Stroke = Stroke {
    width: 1.5,
    color: Color32::from_rgb(0, 120, 215),
};

/// The canvas: scene raster, selection outline, gestures, in-place text editing.
pub fn central_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas_size = app.config().canvas.size;
        let transform = CanvasTransform::fit(canvas_size, ui.available_rect_before_wrap());
        let response = ui.allocate_rect(transform.screen_rect, egui::Sense::click_and_drag());

        let canvas_key = app.canvas_key().unwrap_or_default();
        let Some(surface) = app.editor_mut().surface_mut() else {
            ui.painter()
                .rect_filled(transform.screen_rect, 0.0, ui.visuals().extreme_bg_color);
            return;
        };

        let editing = surface.editing_text().is_some();
        for input in collect_canvas_input(ctx, &response, transform, editing) {
            surface.handle_input(input);
        }

        let raster = surface.render();
        let version = surface.scene().version();
        let selection = surface.scene().selected_object().map(|object| object.element.rect());

        let texture = app
            .textures_mut()
            .canvas_texture(canvas_key, version, &raster, ctx);
        let painter = ui.painter_at(transform.screen_rect);
        match texture {
            Ok(texture_id) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture_id, transform.screen_rect, uv, Color32::WHITE);
            }
            Err(err) => {
                log::error!("Failed to upload canvas texture: {err}");
            }
        }

        // chrome is UI only; it never reaches the raster or the export
        if let Some(rect) = selection {
            let outline = transform.rect_to_screen(rect.expand(SELECTION_PADDING));
            painter.rect_stroke(outline, 0.0, SELECTION_STROKE);
        }

        text_editor(app, ui, transform);
    });
}

/// Overlay a text field on the text object being edited in place
fn text_editor(app: &mut AnnotateApp, ui: &mut egui::Ui, transform: CanvasTransform) {
    let Some(surface) = app.editor_mut().surface_mut() else {
        return;
    };
    let Some(id) = surface.editing_text() else {
        return;
    };
    let Some((rect, mut content, font_size)) = surface.scene().get(id).and_then(|object| {
        let text = object.element.as_text()?;
        Some((object.element.rect(), text.content().to_owned(), text.font_size()))
    }) else {
        surface.finish_text_edit();
        return;
    };

    let screen_rect = transform.rect_to_screen(rect.expand(SELECTION_PADDING));
    let font = egui::FontId::proportional(font_size * transform.scale);
    let edit = egui::TextEdit::multiline(&mut content)
        .font(font)
        .desired_width(screen_rect.width().max(120.0))
        .frame(true);
    let response = ui.put(screen_rect, edit);
    if !response.has_focus() && !response.lost_focus() {
        response.request_focus();
    }

    if response.changed() {
        surface.edit_text(&content);
    }
    let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
    if response.lost_focus() || escape {
        surface.finish_text_edit();
    }
}
