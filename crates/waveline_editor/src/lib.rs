// SPDX-License-Identifier: MIT OR Apache-2.0
//! Waveline editor surface.
//!
//! An egui panel for authoring wave timelines: a time ruler, track lanes
//! with colored event markers, snap guides, and the drag/zoom/pan gestures
//! that feed the `waveline_core` coordinate engine. The panel mutates the
//! model only through core operations; confirmation dialogs and file
//! plumbing stay with the hosting application.

pub mod panel;
pub mod session;

pub use panel::{DragOperation, PendingExport, Selection, TimelineEditorState};
pub use session::EditorSession;
