//! Partial style maps.

use cgmath::{Matrix3, Vector2};
use perch_core::{Color, Layer, Placement, Shadow, Sizing, Transition};
use serde::{Deserialize, Serialize};

/// A box shadow setting; `None` removes a default shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoxShadow {
    None,
    Drop(Shadow),
}

/// A layer border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: Color,
}

/// A set of optional layer style properties.
///
/// Unset properties leave the layer as it is, so a style can be layered over another with
/// [`Style::merge`]. Styles deserialize from maps with camelCase keys where every key is optional:
///
/// ```
/// # use perch::Style;
/// let style: Style = serde_json::from_str(r#"{ "padding": 20, "zIndex": 5 }"#).unwrap();
/// assert_eq!(style.padding, Some(20.));
/// assert_eq!(style.corner_radius, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Vertical translation; positive moves down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<BoxShadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Outer width, including padding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Outer height, including padding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Distance from the top edge of the superview’s content box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Distance from the right edge of the superview’s content box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

impl Style {
    pub fn new() -> Style {
        Style::default()
    }

    /// Returns this style with every property set in `overrides` replaced.
    pub fn merge(&self, overrides: &Style) -> Style {
        Style {
            background: overrides.background.or(self.background),
            corner_radius: overrides.corner_radius.or(self.corner_radius),
            padding: overrides.padding.or(self.padding),
            opacity: overrides.opacity.or(self.opacity),
            translate_y: overrides.translate_y.or(self.translate_y),
            box_shadow: overrides.box_shadow.or(self.box_shadow),
            transition: overrides.transition.or(self.transition),
            z_index: overrides.z_index.or(self.z_index),
            width: overrides.width.or(self.width),
            height: overrides.height.or(self.height),
            border: overrides.border.or(self.border),
            top: overrides.top.or(self.top),
            right: overrides.right.or(self.right),
        }
    }

    /// Writes the set properties onto a layer.
    pub fn apply<Ctx>(&self, layer: &mut Layer<Ctx>) {
        if let Some(background) = self.background {
            layer.background = background;
        }
        if let Some(corner_radius) = self.corner_radius {
            layer.corner_radius = corner_radius;
        }
        if let Some(padding) = self.padding {
            layer.padding = padding;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity;
        }
        if let Some(y) = self.translate_y {
            let x = layer.translation().x;
            layer.transform = Matrix3::from_translation(Vector2::new(x, y));
        }
        match self.box_shadow {
            Some(BoxShadow::None) => layer.shadow = None,
            Some(BoxShadow::Drop(shadow)) => layer.shadow = Some(shadow),
            None => (),
        }
        if let Some(transition) = self.transition {
            layer.transition = Some(transition);
        }
        if let Some(z_index) = self.z_index {
            layer.z_index = z_index;
        }
        if let Some(border) = self.border {
            layer.border = Some((border.width, border.color));
        }

        match (self.width, self.height, layer.size) {
            (None, None, _) => (),
            (Some(width), Some(height), _) => {
                layer.size = Sizing::Fixed(Vector2::new(width, height));
            }
            (width, height, Sizing::Fixed(size)) => {
                let width = width.unwrap_or(size.x);
                let height = height.unwrap_or(size.y);
                layer.size = Sizing::Fixed(Vector2::new(width, height));
            }
            (_, _, Sizing::FitContent) => {
                log::warn!("ignoring a lone width or height on a layer without a fixed size");
            }
        }

        if self.top.is_none() && self.right.is_none() {
            return;
        }
        match &mut layer.placement {
            Placement::TopRight { top, right } => {
                *top = self.top.unwrap_or(*top);
                *right = self.right.unwrap_or(*right);
            }
            Placement::Offset(offset) => {
                offset.y = self.top.unwrap_or(offset.y);
                if self.right.is_some() {
                    log::warn!("ignoring right on a layer placed from its top left corner");
                }
            }
            Placement::Fill => {
                log::warn!("ignoring top and right on a layer filling its superview");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn defaults() -> Style {
        Style {
            background: Some(Color::WHITE),
            corner_radius: Some(10.),
            padding: Some(10.),
            ..Style::default()
        }
    }

    #[test]
    fn overrides_win_and_unset_keys_keep_defaults() {
        let merged = defaults().merge(&Style {
            padding: Some(20.),
            ..Style::default()
        });
        assert_eq!(merged.padding, Some(20.));
        assert_eq!(merged.corner_radius, Some(10.));
        assert_eq!(merged.background, Some(Color::WHITE));
    }

    #[test]
    fn empty_overrides_change_nothing() {
        assert_eq!(defaults().merge(&Style::new()), defaults());
    }

    #[test]
    fn deserializes_partial_maps() {
        let style: Style = serde_json::from_str(
            r#"{
                "background": { "r": 0, "g": 0, "b": 1, "a": 0.5 },
                "boxShadow": "none",
                "translateY": 4
            }"#,
        )
        .unwrap();
        assert_eq!(style.background, Some(Color::rgba(0., 0., 1., 0.5)));
        assert_eq!(style.box_shadow, Some(BoxShadow::None));
        assert_eq!(style.translate_y, Some(4.));
        assert_eq!(style.padding, None);

        let json = serde_json::to_value(&Style {
            z_index: Some(3),
            ..Style::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "zIndex": 3 }));
    }

    #[test]
    fn apply_writes_only_set_properties() {
        let mut layer = Layer::<()> {
            opacity: 0.5,
            ..Layer::at(0., 0., 30., 40.)
        };
        Style {
            background: Some(Color::BLACK),
            translate_y: Some(-10.),
            box_shadow: Some(BoxShadow::None),
            width: Some(100.),
            transition: Some(Transition::new(
                Duration::from_millis(300),
                perch_core::Easing::Ease,
            )),
            ..Style::default()
        }
        .apply(&mut layer);

        assert_eq!(layer.background, Color::BLACK);
        assert_eq!(layer.opacity, 0.5);
        assert_eq!(layer.translation(), Vector2::new(0., -10.));
        assert_eq!(layer.shadow, None);
        assert_eq!(layer.size, Sizing::Fixed(Vector2::new(100., 40.)));
        assert!(layer.transition.is_some());
    }

    #[test]
    fn apply_overrides_placement_edges() {
        let mut layer = Layer::<()> {
            placement: Placement::TopRight {
                top: 90.,
                right: 700.,
            },
            ..Layer::default()
        };
        Style {
            top: Some(5.),
            ..Style::default()
        }
        .apply(&mut layer);
        assert_eq!(
            layer.placement,
            Placement::TopRight {
                top: 5.,
                right: 700.
            }
        );

        let mut layer = Layer::<()>::at(10., 20., 30., 40.);
        Style {
            top: Some(0.),
            ..Style::default()
        }
        .apply(&mut layer);
        assert_eq!(layer.placement, Placement::Offset(Vector2::new(10., 0.)));
    }
}
