use egui::{Context, Pos2, Rect};

mod router;
pub use router::route_event;

/// Pointer events on the drawing surface, in canvas-local pixel coordinates.
///
/// Timestamps are monotonic milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas
    PointerDown { position: Pos2, time_ms: f64 },
    /// Pointer moved over the canvas while the primary button is held
    PointerMove { position: Pos2, time_ms: f64 },
    /// Primary button released
    PointerUp,
    /// Pointer left the canvas area
    PointerLeave,
}

/// Handles converting raw egui input into canvas [`InputEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
    was_inside: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the screen rectangle occupied by the canvas
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    /// Forget pointer tracking, e.g. while a modal dialog covers the canvas
    pub fn reset(&mut self) {
        self.last_pointer_pos = None;
        self.was_inside = false;
    }

    /// Process raw egui input and generate canvas events
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let Some(rect) = self.canvas_rect else {
            return events;
        };

        ctx.input(|input| {
            let time_ms = input.time * 1000.0;
            let hover = input.pointer.hover_pos();
            let inside = hover.is_some_and(|pos| rect.contains(pos));
            let local = hover.filter(|_| inside).map(|pos| (pos - rect.min).to_pos2());

            if self.was_inside && !inside {
                events.push(InputEvent::PointerLeave);
            }

            if let Some(position) = local {
                if input.pointer.primary_pressed() {
                    events.push(InputEvent::PointerDown { position, time_ms });
                } else if input.pointer.primary_down() && Some(position) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove { position, time_ms });
                }
            }

            if input.pointer.primary_released() {
                events.push(InputEvent::PointerUp);
            }

            self.was_inside = inside;
            self.last_pointer_pos = local;
        });

        events
    }
}
