// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline panel rendering and gesture handling.
//!
//! Features:
//! - Time ruler with duration-derived tick intervals
//! - Track lanes with colored event markers
//! - Snap guide line while hovering or dragging
//! - Right-click to place events, drag to move them
//! - Wheel zoom about the cursor, left-drag panning
//!
//! All model mutation goes through `waveline_core` operations; this module
//! only translates pointer input through the coordinate engine.

use crate::session::EditorSession;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};
use waveline_core::{
    CoordinateEngine, EventId, RegistryValidation, TimelineEvent, TrackId, DEFAULT_EVENT_TYPE,
};

const TRACK_HEIGHT: f32 = 34.0;
const TRACK_HEADER_WIDTH: f32 = 180.0;
const RULER_HEIGHT: f32 = 28.0;
const EVENT_SIZE: f32 = 12.0;

/// Selection state
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected track
    pub track: Option<TrackId>,
    /// Selected event (`track_id`, `event_id`)
    pub event: Option<(TrackId, EventId)>,
}

/// Drag operation state
#[derive(Debug, Clone)]
pub enum DragOperation {
    /// Not dragging
    None,
    /// Panning the viewport
    Pan {
        /// Horizontal scroll offset when the pan started
        scroll_start: f64,
        /// Vertical scroll offset when the pan started
        vertical_start: f32,
        /// Pointer position when the pan started
        pan_start: Pos2,
    },
    /// Dragging an event along its track.
    ///
    /// The provisional time lives here, outside the sorted event sequence;
    /// the track is only re-sorted when the drag commits on release.
    Event {
        /// Owning track
        track_id: TrackId,
        /// Dragged event
        event_id: EventId,
        /// Event time when the drag started
        start_time: f64,
        /// Pointer x when the drag started
        start_x: f32,
        /// Unsnapped candidate time tracking the pointer
        provisional_time: f64,
    },
}

/// A wave export awaiting host confirmation.
///
/// Presenting the advisory and writing the file are the host application's
/// job; the panel only records that the user asked for an export.
#[derive(Debug, Clone)]
pub struct PendingExport {
    /// The serialized wave configuration
    pub json: String,
    /// Pre-export registry advisory (confirmable, never blocking)
    pub advisory: RegistryValidation,
}

/// Timeline editor panel state.
pub struct TimelineEditorState {
    /// Coordinate engine: zoom, scroll, snapping
    pub coords: CoordinateEngine,
    /// Vertical scroll offset (in pixels)
    pub vertical_scroll: f32,
    /// Selection state
    pub selection: Selection,
    /// Event type used for right-click placement
    pub placement_type: String,
    /// Export requested this frame, if any
    pub pending_export: Option<PendingExport>,
    drag_op: DragOperation,
    snap_hover: Option<f64>,
}

impl TimelineEditorState {
    /// Create a new editor state.
    pub fn new() -> Self {
        Self {
            coords: CoordinateEngine::new(),
            vertical_scroll: 0.0,
            selection: Selection::default(),
            placement_type: DEFAULT_EVENT_TYPE.to_string(),
            pending_export: None,
            drag_op: DragOperation::None,
            snap_hover: None,
        }
    }

    /// Place a new event of the current placement type at a viewport x
    /// position: pixel to time, snap, clamp, then default payload.
    pub fn place_event(&self, session: &mut EditorSession, track_id: TrackId, viewport_x: f64) -> Option<EventId> {
        let duration = session.timeline.duration;
        let time = self.coords.x_to_time(viewport_x);
        let time = CoordinateEngine::clamp_time(self.coords.snap_time(time, duration), duration);
        let event = TimelineEvent::with_defaults(time, &self.placement_type, &session.event_types);
        let track = session.timeline.get_track_mut(track_id)?;
        Some(track.add_event(event))
    }

    /// Commit the active event drag: snap and clamp the provisional time,
    /// write it through the track, re-sort. No-op for other drag states.
    pub fn commit_event_drag(&mut self, session: &mut EditorSession) {
        if let DragOperation::Event {
            track_id,
            event_id,
            provisional_time,
            ..
        } = self.drag_op
        {
            let duration = session.timeline.duration;
            let time = CoordinateEngine::clamp_time(
                self.coords.snap_time(provisional_time, duration),
                duration,
            );
            if let Some(track) = session.timeline.get_track_mut(track_id) {
                track.set_event_time(event_id, time);
            }
        }
        self.drag_op = DragOperation::None;
    }

    /// The provisional time of an in-flight event drag, if `event_id` is the
    /// one being dragged. Rendering uses this instead of the stored time.
    fn provisional_for(&self, event_id: EventId) -> Option<f64> {
        match self.drag_op {
            DragOperation::Event {
                event_id: dragged,
                provisional_time,
                ..
            } if dragged == event_id => Some(provisional_time),
            _ => None,
        }
    }

    /// Render the full panel.
    pub fn ui(&mut self, ui: &mut egui::Ui, session: &mut EditorSession) {
        self.snap_hover = None;

        self.render_toolbar(ui, session);
        ui.separator();

        let remaining = ui.available_rect_before_wrap();
        let ruler_rect = Rect::from_min_size(
            remaining.min,
            Vec2::new(remaining.width(), RULER_HEIGHT),
        );
        let tracks_rect = Rect::from_min_max(
            Pos2::new(remaining.min.x, ruler_rect.max.y),
            remaining.max,
        );

        self.handle_tracks_input(ui, tracks_rect, session);
        self.render_ruler(ui, ruler_rect, session);
        self.render_tracks(ui, tracks_rect, session);
        self.handle_global_input(ui, tracks_rect, session);
    }

    /// Screen x of the timeline content origin (right edge of track headers).
    fn origin_x(rect: Rect) -> f32 {
        rect.min.x + TRACK_HEADER_WIDTH
    }

    fn time_to_screen_x(&self, rect: Rect, time: f64) -> f32 {
        Self::origin_x(rect) + self.coords.time_to_viewport_x(time) as f32
    }

    fn screen_x_to_viewport(rect: Rect, screen_x: f32) -> f64 {
        f64::from(screen_x - Self::origin_x(rect))
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, session: &mut EditorSession) {
        ui.horizontal(|ui| {
            if ui.button("+ Track").clicked() {
                session.add_numbered_track();
            }

            ui.separator();

            ui.label("Duration:");
            let mut duration = session.timeline.duration;
            let response = ui.add(
                egui::DragValue::new(&mut duration)
                    .range(1.0..=3600.0)
                    .speed(1.0)
                    .suffix("s"),
            );
            if response.changed() {
                session.timeline.set_duration(duration);
            }

            ui.separator();

            ui.checkbox(&mut self.coords.snap_to_grid, "Snap");

            ui.separator();

            ui.label("Type:");
            let selected_name = session
                .event_types
                .get(&self.placement_type)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("placement_type")
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    for ty in session.event_types.get_all() {
                        ui.selectable_value(&mut self.placement_type, ty.id.clone(), &ty.name);
                    }
                });

            ui.separator();

            if ui.button("-").clicked() {
                self.coords.zoom_about(-1.0, 0.0);
            }
            ui.monospace(format!("{}%", self.coords.zoom_percentage()));
            if ui.button("+").clicked() {
                self.coords.zoom_about(1.0, 0.0);
            }

            ui.separator();

            if ui.button("Export Wave").clicked() {
                let (json, advisory) = session.export_wave();
                self.pending_export = Some(PendingExport { json, advisory });
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "{} tracks | {} enemies | {:.0}s",
                    session.timeline.track_count(),
                    session.enemy_types.len(),
                    session.timeline.duration
                ));
            });
        });
    }

    fn render_ruler(&self, ui: &egui::Ui, rect: Rect, session: &EditorSession) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        let duration = session.timeline.duration;

        for (time, is_major) in ruler_ticks(duration) {
            let x = self.time_to_screen_x(rect, time);
            if x >= Self::origin_x(rect) && x <= rect.max.x {
                let tick_height = if is_major { 12.0 } else { 6.0 };
                let tick_color = if is_major {
                    Color32::from_gray(180)
                } else {
                    Color32::from_gray(100)
                };

                painter.line_segment(
                    [
                        Pos2::new(x, rect.max.y - tick_height),
                        Pos2::new(x, rect.max.y),
                    ],
                    Stroke::new(1.0, tick_color),
                );

                if is_major {
                    painter.text(
                        Pos2::new(x + 2.0, rect.min.y + 4.0),
                        egui::Align2::LEFT_TOP,
                        format!("{time}s"),
                        egui::FontId::monospace(10.0),
                        Color32::from_gray(180),
                    );
                }
            }
        }
    }

    fn render_tracks(&mut self, ui: &mut egui::Ui, rect: Rect, session: &mut EditorSession) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));

        let header_rect =
            Rect::from_min_size(rect.min, Vec2::new(TRACK_HEADER_WIDTH, rect.height()));
        painter.rect_filled(header_rect, 0.0, Color32::from_gray(35));

        let track_ids: Vec<TrackId> = session.timeline.tracks().iter().map(|t| t.id).collect();
        let mut y = rect.min.y - self.vertical_scroll;

        for (index, track_id) in track_ids.iter().enumerate() {
            if y > rect.max.y {
                break;
            }
            if y + TRACK_HEIGHT > rect.min.y {
                let row_rect = Rect::from_min_size(
                    Pos2::new(rect.min.x, y),
                    Vec2::new(rect.width(), TRACK_HEIGHT),
                );
                self.render_track_row(ui, &painter, rect, row_rect, *track_id, index, session);
            }
            y += TRACK_HEIGHT;
        }

        // Snap guide line
        if let Some(snap_time) = self.snap_hover {
            let x = self.time_to_screen_x(rect, snap_time);
            if x >= Self::origin_x(rect) && x <= rect.max.x {
                painter.line_segment(
                    [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
                    Stroke::new(1.0, Color32::from_rgb(100, 200, 255)),
                );
            }
        }
    }

    fn render_track_row(
        &mut self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        area_rect: Rect,
        row_rect: Rect,
        track_id: TrackId,
        index: usize,
        session: &mut EditorSession,
    ) {
        let is_selected = self.selection.track == Some(track_id);
        let bg_color = if is_selected {
            Color32::from_rgba_unmultiplied(100, 150, 255, 40)
        } else if index % 2 == 0 {
            Color32::from_gray(32)
        } else {
            Color32::from_gray(28)
        };
        painter.rect_filled(row_rect, 0.0, bg_color);

        let Some(track) = session.timeline.get_track(track_id) else {
            return;
        };

        // Header: color strip, name, event count
        let header_rect =
            Rect::from_min_size(row_rect.min, Vec2::new(TRACK_HEADER_WIDTH, TRACK_HEIGHT));
        let strip =
            Rect::from_min_size(header_rect.min, Vec2::new(4.0, TRACK_HEIGHT));
        painter.rect_filled(strip, 0.0, hex_color(&track.color));
        painter.text(
            Pos2::new(header_rect.min.x + 10.0, header_rect.center().y),
            egui::Align2::LEFT_CENTER,
            &track.name,
            egui::FontId::proportional(12.0),
            Color32::from_gray(200),
        );
        painter.text(
            Pos2::new(header_rect.max.x - 8.0, header_rect.center().y),
            egui::Align2::RIGHT_CENTER,
            format!("{}", track.event_count()),
            egui::FontId::proportional(10.0),
            Color32::from_gray(120),
        );

        let header_response = ui.interact(
            header_rect,
            ui.id().with(("track_header", track_id.0)),
            Sense::click(),
        );
        if header_response.clicked() {
            self.selection.track = Some(track_id);
        }

        // Lane: right-click places an event
        let lane_rect = Rect::from_min_max(
            Pos2::new(Self::origin_x(area_rect), row_rect.min.y),
            row_rect.max,
        );
        let lane_response = ui.interact(
            lane_rect,
            ui.id().with(("track_lane", track_id.0)),
            Sense::click(),
        );
        if lane_response.secondary_clicked() {
            if let Some(pos) = lane_response.interact_pointer_pos() {
                let vx = Self::screen_x_to_viewport(area_rect, pos.x);
                if let Some(event_id) = self.place_event(session, track_id, vx) {
                    self.selection.track = Some(track_id);
                    self.selection.event = Some((track_id, event_id));
                    tracing::debug!("placed event on track {:?}", track_id.0);
                }
            }
        }
        if self.coords.snap_to_grid && matches!(self.drag_op, DragOperation::None) {
            if let Some(pos) = lane_response.hover_pos() {
                let duration = session.timeline.duration;
                let hover_time = self
                    .coords
                    .x_to_time(Self::screen_x_to_viewport(area_rect, pos.x));
                self.snap_hover = Some(self.coords.snap_time(hover_time, duration));
            }
        }

        self.render_events(ui, painter, area_rect, row_rect, track_id, session);
    }

    fn render_events(
        &mut self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        area_rect: Rect,
        row_rect: Rect,
        track_id: TrackId,
        session: &mut EditorSession,
    ) {
        let duration = session.timeline.duration;
        let Some(track) = session.timeline.get_track(track_id) else {
            return;
        };
        let center_y = row_rect.center().y;

        struct Marker {
            event_id: EventId,
            time: f64,
            color: Color32,
        }

        let markers: Vec<Marker> = track
            .events()
            .iter()
            .map(|event| {
                // A dragged event renders at its snapped provisional time.
                let time = match self.provisional_for(event.id) {
                    Some(provisional) => self.coords.snap_time(provisional, duration),
                    None => event.time,
                };
                let color = event
                    .type_config(&session.event_types)
                    .map(|t| hex_color(&t.color))
                    .unwrap_or(Color32::GRAY);
                Marker {
                    event_id: event.id,
                    time,
                    color,
                }
            })
            .collect();

        for marker in markers {
            let x = self.time_to_screen_x(area_rect, marker.time);
            if x < Self::origin_x(area_rect) - EVENT_SIZE || x > area_rect.max.x + EVENT_SIZE {
                continue;
            }

            let is_selected = self.selection.event == Some((track_id, marker.event_id));
            let half = EVENT_SIZE / 2.0;
            let diamond = vec![
                Pos2::new(x, center_y - half),
                Pos2::new(x + half, center_y),
                Pos2::new(x, center_y + half),
                Pos2::new(x - half, center_y),
            ];
            let stroke = if is_selected {
                Stroke::new(2.0, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_gray(80))
            };
            painter.add(egui::Shape::convex_polygon(diamond, marker.color, stroke));
            painter.text(
                Pos2::new(x, center_y - half - 2.0),
                egui::Align2::CENTER_BOTTOM,
                format!("{:.2}s", marker.time),
                egui::FontId::monospace(9.0),
                Color32::from_gray(150),
            );

            let hit_rect = Rect::from_center_size(
                Pos2::new(x, center_y),
                Vec2::splat(EVENT_SIZE + 4.0),
            );
            let response = ui.interact(
                hit_rect,
                ui.id().with(("event", marker.event_id.0)),
                Sense::click_and_drag(),
            );

            if response.clicked() {
                self.selection.track = Some(track_id);
                self.selection.event = Some((track_id, marker.event_id));
            }
            if response.drag_started() {
                self.drag_op = DragOperation::Event {
                    track_id,
                    event_id: marker.event_id,
                    start_time: marker.time,
                    start_x: response
                        .interact_pointer_pos()
                        .map(|p| p.x)
                        .unwrap_or(x),
                    provisional_time: marker.time,
                };
            }
            if response.dragged() {
                if let (
                    DragOperation::Event {
                        event_id,
                        start_time,
                        start_x,
                        provisional_time,
                        ..
                    },
                    Some(pos),
                ) = (&mut self.drag_op, response.interact_pointer_pos())
                {
                    if *event_id == marker.event_id {
                        let delta_time =
                            f64::from(pos.x - *start_x) / self.coords.pixels_per_second();
                        *provisional_time =
                            CoordinateEngine::clamp_time(*start_time + delta_time, duration);
                        if self.coords.snap_to_grid {
                            self.snap_hover =
                                Some(self.coords.snap_time(*provisional_time, duration));
                        }
                    }
                }
            }
            if response.drag_stopped() {
                self.commit_event_drag(session);
            }
        }
    }

    /// Pan gesture over the lane area (left-drag on empty space).
    fn handle_tracks_input(&mut self, ui: &mut egui::Ui, rect: Rect, _session: &mut EditorSession) {
        let pan_rect = Rect::from_min_max(
            Pos2::new(Self::origin_x(rect), rect.min.y),
            rect.max,
        );
        let response = ui.interact(pan_rect, ui.id().with("pan_surface"), Sense::drag());

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_op = DragOperation::Pan {
                    scroll_start: self.coords.scroll_offset,
                    vertical_start: self.vertical_scroll,
                    pan_start: pos,
                };
            }
        }
        if response.dragged() {
            if let (
                DragOperation::Pan {
                    scroll_start,
                    vertical_start,
                    pan_start,
                },
                Some(pos),
            ) = (self.drag_op.clone(), response.interact_pointer_pos())
            {
                self.coords
                    .pan(scroll_start, f64::from(pan_start.x), f64::from(pos.x));
                self.vertical_scroll = (vertical_start - (pos.y - pan_start.y)).max(0.0);
            }
        }
        if response.drag_stopped() && matches!(self.drag_op, DragOperation::Pan { .. }) {
            self.drag_op = DragOperation::None;
        }
    }

    fn handle_global_input(&mut self, ui: &egui::Ui, rect: Rect, session: &mut EditorSession) {
        // Wheel zoom about the cursor, anywhere over the lane area.
        let (scroll_delta, hover_pos) =
            ui.input(|i| (i.smooth_scroll_delta, i.pointer.hover_pos()));
        if scroll_delta.y != 0.0 {
            if let Some(pos) = hover_pos {
                if rect.contains(pos) && pos.x >= Self::origin_x(rect) {
                    let direction = f64::from(scroll_delta.y.signum());
                    let vx = Self::screen_x_to_viewport(rect, pos.x);
                    self.coords.zoom_about(direction, vx);
                }
            }
        }

        // Delete removes the selected event.
        if ui.input(|i| i.key_pressed(egui::Key::Delete)) {
            if let Some((track_id, event_id)) = self.selection.event.take() {
                if let Some(track) = session.timeline.get_track_mut(track_id) {
                    track.remove_event(event_id);
                }
            }
        }
    }
}

impl Default for TimelineEditorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Ruler tick times with a major flag every fifth tick.
///
/// Tick times are multiplied out from an integer index rather than
/// accumulated, so every major tick lands on an exact interval multiple.
fn ruler_ticks(duration: f64) -> impl Iterator<Item = (f64, bool)> {
    let interval = CoordinateEngine::tick_interval(duration);
    let count = (duration / interval).floor() as u64;
    (0..=count).map(move |i| (i as f64 * interval, i % 5 == 0))
}

/// Parse a `#rrggbb` hex string, falling back to gray.
fn hex_color(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color32::GRAY;
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color32::from_rgb(r, g, b),
        _ => Color32::GRAY,
    }
}
