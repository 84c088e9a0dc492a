use glam::Vec3;

use crate::controls::{Binding, ControlPanel, Widget};
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::{ParamError, ParamSpec, ParameterStore};
use crate::scene::{Material, Node, NodeId, SceneGraph};

/// Declares a parameter and binds its widget in one step
pub(super) struct Controls<'a> {
    store: &'a mut ParameterStore,
    panel: &'a mut ControlPanel,
}

impl<'a> Controls<'a> {
    pub fn new(store: &'a mut ParameterStore, panel: &'a mut ControlPanel) -> Self {
        Self { store, panel }
    }

    pub fn folder(&mut self, title: &str) -> &mut Self {
        self.panel.folder(title);
        self
    }

    pub fn top_level(&mut self) -> &mut Self {
        self.panel.top_level();
        self
    }

    pub fn slider(
        &mut self,
        name: &str,
        (min, max, step): (f32, f32, f32),
        default: f32,
    ) -> Result<&mut Binding, ParamError> {
        self.store.declare(name, ParamSpec::number(min, max, step), default)?;
        self.panel.bind(self.store, name, Widget::Slider)
    }

    pub fn toggle(&mut self, name: &str, default: bool) -> Result<&mut Binding, ParamError> {
        self.store.declare(name, ParamSpec::Toggle, default)?;
        self.panel.bind(self.store, name, Widget::Checkbox)
    }

    pub fn color(&mut self, name: &str, hex: u32) -> Result<&mut Binding, ParamError> {
        self.store.declare(name, ParamSpec::Color, Color::from_hex(hex))?;
        self.panel.bind(self.store, name, Widget::ColorPicker)
    }

    pub fn choice(
        &mut self,
        name: &str,
        options: &[(&str, &str)],
        default: &str,
    ) -> Result<&mut Binding, ParamError> {
        self.store.declare(name, ParamSpec::choice(options), default)?;
        self.panel.bind(self.store, name, Widget::Dropdown)
    }

    pub fn action(&mut self, name: &str) -> Result<&mut Binding, ParamError> {
        self.store.declare_action(name)?;
        self.panel.bind(self.store, name, Widget::Button)
    }

    /// posX / posY / posZ sliders sharing one range
    pub fn position(&mut self, range: (f32, f32, f32), default: Vec3) -> Result<(), ParamError> {
        self.slider("posX", range, default.x)?;
        self.slider("posY", range, default.y)?;
        self.slider("posZ", range, default.z)?;
        Ok(())
    }
}

pub(super) const ROTATION_RANGE: (f32, f32, f32) = (-std::f32::consts::PI, std::f32::consts::PI, 0.01);

/// Horizontal ground plane at height `y`
pub(super) fn floor(size: f32, color: u32, y: f32) -> Node {
    Node::mesh(
        "floor",
        Geometry::plane(size, size, 1, 1),
        Material::standard(Color::from_hex(color)),
    )
    .at(0.0, y, 0.0)
    .rotated(-std::f32::consts::FRAC_PI_2, 0.0, 0.0)
}

/// Map a trailing axis letter (`posX`, `rotateY`, `positionLight-z`) to an index
pub(super) fn axis_of(name: &str) -> Option<usize> {
    match name.chars().last()? {
        'x' | 'X' => Some(0),
        'y' | 'Y' => Some(1),
        'z' | 'Z' => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_declare_and_bind_together() {
        let mut store = ParameterStore::new();
        let mut panel = ControlPanel::new("test");
        let mut controls = Controls::new(&mut store, &mut panel);
        controls.folder("Position");
        controls.position((-5.0, 5.0, 0.01), Vec3::new(1.0, 2.0, 3.0)).unwrap();
        controls.slider("size", (0.1, 1.5, 0.1), 1.0).unwrap().label("Size");

        assert_eq!(store.number("posY").unwrap(), 2.0);
        assert_eq!(panel.binding("size").unwrap().display_label(), "Size");
        assert_eq!(panel.len(), 4);
    }

    #[test]
    fn axis_suffixes() {
        assert_eq!(axis_of("posX"), Some(0));
        assert_eq!(axis_of("positionLight-y"), Some(1));
        assert_eq!(axis_of("rotateZ"), Some(2));
        assert_eq!(axis_of("scale"), None);
    }
}

/// Put a freshly attached model where the `model.*` sliders say. Edits made
/// while it was loading only reached the store, so they land here.
pub(super) fn place_model(graph: &mut SceneGraph, id: NodeId, store: &ParameterStore) -> anyhow::Result<()> {
    let position = Vec3::new(
        store.number("model.posX")?,
        store.number("model.posY")?,
        store.number("model.posZ")?,
    );
    let scale = store.number("model.scale")?;
    let transform = graph.transform_mut(id)?;
    transform.position = position;
    transform.set_uniform_scale(scale);
    Ok(())
}
