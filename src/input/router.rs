use crate::brush::{self, BrushState};
use crate::grid::{CellCoord, Grid};
use crate::state::EditorState;

use super::InputEvent;

/// Routes one canvas event through the drawing state machine.
///
/// Press and move samples stamp the brush and then become the stroke's
/// previous sample. Release and leave end the stroke. Returns the cells that
/// changed so the caller can redraw just those.
pub fn route_event(
    event: &InputEvent,
    state: &mut EditorState,
    brush: &mut BrushState,
    grid: &mut Grid,
    cell_size: f32,
) -> Vec<CellCoord> {
    match (*state, *event) {
        (EditorState::Idle, InputEvent::PointerDown { position, time_ms }) => {
            transition(state, EditorState::Drawing);
            brush.end_stroke();
            stamp(position, time_ms, brush, grid, cell_size)
        }
        (EditorState::Drawing, InputEvent::PointerDown { position, time_ms }) => {
            // A press without a release in between (focus lost mid-stroke): start over.
            brush.end_stroke();
            stamp(position, time_ms, brush, grid, cell_size)
        }
        (EditorState::Drawing, InputEvent::PointerMove { position, time_ms }) => {
            stamp(position, time_ms, brush, grid, cell_size)
        }
        (EditorState::Drawing, InputEvent::PointerUp | InputEvent::PointerLeave) => {
            transition(state, EditorState::Idle);
            brush.end_stroke();
            Vec::new()
        }
        (EditorState::Idle, _) => Vec::new(),
    }
}

fn transition(state: &mut EditorState, next: EditorState) {
    debug_assert!(state.can_transition_to(&next));
    log::debug!("Editor state {} -> {}", state.name(), next.name());
    *state = next;
}

fn stamp(
    position: egui::Pos2,
    time_ms: f64,
    brush: &mut BrushState,
    grid: &mut Grid,
    cell_size: f32,
) -> Vec<CellCoord> {
    let size = brush::compute_effective_brush_size(position, time_ms, brush);
    let changed = brush::rasterize_stroke(position, size, cell_size, grid);
    brush.record_sample(position, time_ms);
    log::trace!(
        "Stamped brush size {} at {:?}: {} cells changed",
        size,
        position,
        changed.len()
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn down(x: f32, y: f32, t: f64) -> InputEvent {
        InputEvent::PointerDown {
            position: pos2(x, y),
            time_ms: t,
        }
    }

    fn mv(x: f32, y: f32, t: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: pos2(x, y),
            time_ms: t,
        }
    }

    #[test]
    fn press_move_release_cycle() {
        let mut state = EditorState::Idle;
        let mut brush = BrushState::new(1, false);
        let mut grid = Grid::new(8, 8);

        let changed = route_event(&down(5.0, 5.0, 0.0), &mut state, &mut brush, &mut grid, 10.0);
        assert_eq!(changed, vec![CellCoord::new(0, 0)]);
        assert!(state.is_drawing());
        assert_eq!(brush.last_position(), Some(pos2(5.0, 5.0)));

        let changed = route_event(&mv(15.0, 5.0, 16.0), &mut state, &mut brush, &mut grid, 10.0);
        assert_eq!(changed, vec![CellCoord::new(1, 0)]);
        assert_eq!(brush.last_timestamp(), Some(16.0));

        route_event(&InputEvent::PointerUp, &mut state, &mut brush, &mut grid, 10.0);
        assert_eq!(state, EditorState::Idle);
        assert_eq!(brush.last_position(), None);
        assert_eq!(grid.painted_count(), 2);
    }

    #[test]
    fn moves_while_idle_do_not_paint() {
        let mut state = EditorState::Idle;
        let mut brush = BrushState::default();
        let mut grid = Grid::new(4, 4);
        let changed = route_event(&mv(5.0, 5.0, 1.0), &mut state, &mut brush, &mut grid, 10.0);
        assert!(changed.is_empty());
        assert!(grid.is_blank());
    }

    #[test]
    fn leave_ends_the_stroke() {
        let mut state = EditorState::Idle;
        let mut brush = BrushState::new(1, true);
        let mut grid = Grid::new(4, 4);
        route_event(&down(5.0, 5.0, 0.0), &mut state, &mut brush, &mut grid, 10.0);
        route_event(&InputEvent::PointerLeave, &mut state, &mut brush, &mut grid, 10.0);
        assert_eq!(state, EditorState::Idle);
        assert_eq!(brush.last_position(), None);
        assert_eq!(brush.last_timestamp(), None);
    }
}
