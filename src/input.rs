use egui::{Pos2, Rect, Vec2};

/// Canvas gestures, already converted to canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasInput {
    /// Primary button pressed: select what is under the pointer, or nothing
    PointerDown(Pos2),
    /// Pointer moved with the button held
    Drag(Vec2),
    PointerUp,
    /// Start editing an editable text object in place
    DoubleClick(Pos2),
    /// Delete / Backspace with the canvas focused
    DeleteSelected,
}

/// Maps between screen space and canvas space for a canvas drawn into
/// `screen_rect` at uniform `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub screen_rect: Rect,
    pub scale: f32,
}

impl CanvasTransform {
    /// Fit a canvas of `canvas_size` inside `available`, centred, never upscaled.
    pub fn fit(canvas_size: Vec2, available: Rect) -> Self {
        let scale = (available.width() / canvas_size.x)
            .min(available.height() / canvas_size.y)
            .clamp(0.05, 1.0);
        let screen_rect = Rect::from_center_size(available.center(), canvas_size * scale);
        Self { screen_rect, scale }
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        Pos2::ZERO + (screen - self.screen_rect.min) / self.scale
    }

    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.screen_rect.min + canvas.to_vec2() * self.scale
    }

    pub fn rect_to_screen(&self, canvas: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(canvas.min), self.to_screen(canvas.max))
    }
}

/// Translate this frame's pointer and keyboard activity on the canvas widget
/// into gestures.
pub fn collect_canvas_input(
    ctx: &egui::Context,
    response: &egui::Response,
    transform: CanvasTransform,
    text_editing: bool,
) -> Vec<CanvasInput> {
    let mut inputs = Vec::new();
    let pointer = response.interact_pointer_pos();

    if response.double_clicked() {
        if let Some(pos) = pointer {
            inputs.push(CanvasInput::DoubleClick(transform.to_canvas(pos)));
        }
    } else if response.drag_started_by(egui::PointerButton::Primary)
        || response.clicked_by(egui::PointerButton::Primary)
    {
        if let Some(pos) = pointer.or_else(|| ctx.input(|i| i.pointer.press_origin())) {
            inputs.push(CanvasInput::PointerDown(transform.to_canvas(pos)));
        }
    }

    if response.dragged_by(egui::PointerButton::Primary) {
        let delta = response.drag_delta() / transform.scale;
        if delta != Vec2::ZERO {
            inputs.push(CanvasInput::Drag(delta));
        }
    }

    if response.drag_stopped() || response.clicked() {
        inputs.push(CanvasInput::PointerUp);
    }

    if !text_editing
        && response.hovered()
        && ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
    {
        inputs.push(CanvasInput::DeleteSelected);
    }

    inputs
}
