//! An in-memory backend.

use perch_core::backend::Backend;
use perch_core::{NativeView, Rect};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("view {0} was already removed")]
    Stale(usize),
}

/// A native view as recorded by the headless backend.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    pub view: NativeView,
    pub frame: Option<Rect>,
    pub subviews: Vec<usize>,
}

/// A backend that keeps the native scene in memory instead of drawing it.
///
/// Views are addressed by slot; slots are not reused.
#[derive(Debug, Default)]
pub struct Headless {
    views: Vec<Option<HeadlessView>>,
    window: Vec<usize>,
}

impl Headless {
    pub fn new() -> Headless {
        Headless::default()
    }

    pub fn view(&self, view: usize) -> Option<&HeadlessView> {
        self.views.get(view).and_then(Option::as_ref)
    }

    /// Top-level views: window content followed by overlays.
    pub fn window(&self) -> &[usize] {
        &self.window
    }

    /// Number of views that have not been removed.
    pub fn live_views(&self) -> usize {
        self.views.iter().filter(|view| view.is_some()).count()
    }

    fn get_mut(&mut self, view: usize) -> Result<&mut HeadlessView, HeadlessError> {
        self.views
            .get_mut(view)
            .and_then(Option::as_mut)
            .ok_or(HeadlessError::Stale(view))
    }

    /// Describes the scene as an indented outline.
    pub fn outline(&self) -> String {
        fn describe(scene: &Headless, id: usize, depth: usize, out: &mut String) {
            let view = match scene.view(id) {
                Some(view) => view,
                None => return,
            };
            let _ = write!(out, "{:width$}", "", width = depth * 2);
            match &view.view {
                NativeView::Overlay => out.push_str("overlay"),
                NativeView::Layer(props) => {
                    let _ = write!(out, "layer z={} opacity={}", props.z_index, props.opacity);
                }
            }
            if let Some(frame) = view.frame {
                let _ = write!(
                    out,
                    " [{}, {}, {}, {}]",
                    frame.left(),
                    frame.top(),
                    frame.right(),
                    frame.bottom()
                );
            }
            out.push('\n');
            for subview in &view.subviews {
                describe(scene, *subview, depth + 1, out);
            }
        }

        let mut out = String::new();
        for id in &self.window {
            describe(self, *id, 0, &mut out);
        }
        out
    }
}

impl Backend for Headless {
    type ViewRef = usize;
    type Error = HeadlessError;

    fn new_view(&mut self, view: &NativeView) -> Result<usize, HeadlessError> {
        self.views.push(Some(HeadlessView {
            view: view.clone(),
            frame: None,
            subviews: Vec::new(),
        }));
        Ok(self.views.len() - 1)
    }

    fn update_view(&mut self, view: &mut usize, update: &NativeView) -> Result<(), HeadlessError> {
        self.get_mut(*view)?.view = update.clone();
        Ok(())
    }

    fn remove_view(&mut self, view: usize) -> Result<(), HeadlessError> {
        self.views
            .get_mut(view)
            .and_then(Option::take)
            .map(drop)
            .ok_or(HeadlessError::Stale(view))
    }

    fn set_subviews(
        &mut self,
        superview: Option<&usize>,
        subviews: Vec<&usize>,
    ) -> Result<(), HeadlessError> {
        let subviews = subviews.into_iter().copied().collect();
        match superview {
            Some(view) => self.get_mut(*view)?.subviews = subviews,
            None => self.window = subviews,
        }
        Ok(())
    }

    fn set_frame(&mut self, view: &usize, frame: Rect) -> Result<(), HeadlessError> {
        self.get_mut(*view)?.frame = Some(frame);
        Ok(())
    }
}
