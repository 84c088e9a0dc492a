use std::collections::HashMap;
use std::fmt;

use super::queue::{ChangeQueue, ParamChange};
use crate::params::{ParamError, ParamKind, ParamValue, ParameterStore, SetOutcome};

/// Kind of UI widget a parameter is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Slider,
    Checkbox,
    ColorPicker,
    Dropdown,
    Button,
}

impl Widget {
    /// The only parameter type this widget can edit
    pub fn edits(&self) -> ParamKind {
        match self {
            Widget::Slider => ParamKind::Number,
            Widget::Checkbox => ParamKind::Toggle,
            Widget::ColorPicker => ParamKind::Color,
            Widget::Dropdown => ParamKind::Choice,
            Widget::Button => ParamKind::Action,
        }
    }

    pub fn for_kind(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Number => Widget::Slider,
            ParamKind::Toggle => Widget::Checkbox,
            ParamKind::Color => Widget::ColorPicker,
            ParamKind::Choice => Widget::Dropdown,
            ParamKind::Action => Widget::Button,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Widget::Slider => "slider",
            Widget::Checkbox => "checkbox",
            Widget::ColorPicker => "color picker",
            Widget::Dropdown => "dropdown",
            Widget::Button => "button",
        }
    }
}

pub type ChangeCallback = Box<dyn FnMut(&ParamValue)>;

/// One parameter bound to one widget
pub struct Binding {
    param: String,
    widget: Widget,
    label: Option<String>,
    on_change: Option<ChangeCallback>,
}

impl Binding {
    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn widget(&self) -> Widget {
        self.widget
    }

    /// Display name; falls back to the parameter name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.param)
    }

    pub fn label(&mut self, label: &str) -> &mut Self {
        self.label = Some(label.to_string());
        self
    }

    /// Attach the change callback, replacing any previous one
    pub fn on_change(&mut self, callback: impl FnMut(&ParamValue) + 'static) -> &mut Self {
        self.on_change = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("param", &self.param)
            .field("widget", &self.widget)
            .field("label", &self.label)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct Folder {
    title: String,
    bindings: Vec<usize>,
}

/// A titled group of bindings, in declaration order
#[derive(Debug)]
pub struct Section<'a> {
    pub title: Option<&'a str>,
    pub bindings: Vec<&'a Binding>,
}

/// The set of controls registered by a scene.
///
/// User edits go through `interact`, which writes the parameter store,
/// fires the binding's callback, and queues a `ParamChange` for the scene
/// reducer to apply on the next tick.
#[derive(Debug)]
pub struct ControlPanel {
    title: String,
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
    root: Vec<usize>,
    folders: Vec<Folder>,
    current: Option<usize>,
    queue: ChangeQueue,
}

impl ControlPanel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            bindings: Vec::new(),
            index: HashMap::new(),
            root: Vec::new(),
            folders: Vec::new(),
            current: None,
            queue: ChangeQueue::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Open (or reopen) a folder; following binds land in it
    pub fn folder(&mut self, title: &str) -> &mut Self {
        let idx = match self.folders.iter().position(|f| f.title == title) {
            Some(idx) => idx,
            None => {
                self.folders.push(Folder {
                    title: title.to_string(),
                    bindings: Vec::new(),
                });
                self.folders.len() - 1
            }
        };
        self.current = Some(idx);
        self
    }

    /// Following binds land at the top level
    pub fn top_level(&mut self) -> &mut Self {
        self.current = None;
        self
    }

    /// Register a widget for a declared parameter. Binding an undeclared
    /// parameter, binding twice, or using the wrong widget kind is a
    /// programmer error and fails immediately.
    pub fn bind(
        &mut self,
        store: &ParameterStore,
        name: &str,
        widget: Widget,
    ) -> Result<&mut Binding, ParamError> {
        let spec = store
            .spec(name)
            .map_err(|_| ParamError::UnboundParameter(name.to_string()))?;
        if self.index.contains_key(name) {
            return Err(ParamError::AlreadyBound(name.to_string()));
        }
        if widget.edits() != spec.kind() {
            return Err(ParamError::WidgetMismatch {
                name: name.to_string(),
                widget: widget.name(),
                kind: spec.kind(),
            });
        }

        let idx = self.bindings.len();
        self.bindings.push(Binding {
            param: name.to_string(),
            widget,
            label: None,
            on_change: None,
        });
        self.index.insert(name.to_string(), idx);
        match self.current {
            Some(folder) => self.folders[folder].bindings.push(idx),
            None => self.root.push(idx),
        }

        Ok(&mut self.bindings[idx])
    }

    /// Bind with the widget matching the parameter's type
    pub fn bind_auto(&mut self, store: &ParameterStore, name: &str) -> Result<&mut Binding, ParamError> {
        let kind = store
            .spec(name)
            .map_err(|_| ParamError::UnboundParameter(name.to_string()))?
            .kind();
        self.bind(store, name, Widget::for_kind(kind))
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.index.get(name).map(|&i| &self.bindings[i])
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Top-level bindings first, then each folder
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections = Vec::with_capacity(self.folders.len() + 1);
        if !self.root.is_empty() {
            sections.push(Section {
                title: None,
                bindings: self.root.iter().map(|&i| &self.bindings[i]).collect(),
            });
        }
        sections.extend(self.folders.iter().map(|folder| Section {
            title: Some(folder.title.as_str()),
            bindings: folder.bindings.iter().map(|&i| &self.bindings[i]).collect(),
        }));
        sections
    }

    /// Apply a user edit to a bound parameter.
    ///
    /// The callback runs and a change is queued only when the stored value
    /// actually changed (actions always count as a change).
    pub fn interact(
        &mut self,
        store: &mut ParameterStore,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<SetOutcome, ParamError> {
        let &idx = self
            .index
            .get(name)
            .ok_or_else(|| ParamError::UnboundParameter(name.to_string()))?;

        let outcome = store.set(name, value)?;
        if let Some(requested) = outcome.clamped_from {
            log::warn!("'{}' = {} clamped by its bounds", name, requested);
        }
        if !outcome.changed {
            return Ok(outcome);
        }

        let stored = store.get(name)?.clone();
        if let Some(callback) = self.bindings[idx].on_change.as_mut() {
            callback(&stored);
        }
        self.queue.push(ParamChange {
            name: name.to_string(),
            value: stored,
        });

        Ok(outcome)
    }

    /// Queue every bound parameter's current value, so a reducer can
    /// bring freshly built scene objects in line with the store.
    pub fn queue_current_values(&mut self, store: &ParameterStore) {
        for binding in &self.bindings {
            if binding.widget == Widget::Button {
                continue;
            }
            if let Ok(value) = store.get(&binding.param) {
                self.queue.push(ParamChange {
                    name: binding.param.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    pub fn pending_changes(&self) -> usize {
        self.queue.len()
    }

    /// Take every queued change in the order it happened
    pub fn drain_changes(&mut self) -> Vec<ParamChange> {
        self.queue.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSpec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store.declare("size", ParamSpec::number(0.1, 1.5, 0.1), 1.0).unwrap();
        store.declare("wireframe", ParamSpec::Toggle, true).unwrap();
        store.declare_action("visibleToggle").unwrap();
        store
    }

    #[test]
    fn binding_undeclared_parameter_fails_fast() {
        let store = store();
        let mut panel = ControlPanel::new("test");
        let err = panel.bind(&store, "posX", Widget::Slider).unwrap_err();
        assert_eq!(err, ParamError::UnboundParameter("posX".into()));
    }

    #[test]
    fn binding_twice_fails() {
        let store = store();
        let mut panel = ControlPanel::new("test");
        panel.bind(&store, "size", Widget::Slider).unwrap();
        assert!(matches!(
            panel.bind(&store, "size", Widget::Slider),
            Err(ParamError::AlreadyBound(_))
        ));
    }

    #[test]
    fn widget_must_match_type() {
        let store = store();
        let mut panel = ControlPanel::new("test");
        assert!(matches!(
            panel.bind(&store, "size", Widget::Checkbox),
            Err(ParamError::WidgetMismatch { .. })
        ));
    }

    #[test]
    fn callback_fires_once_per_change() {
        let mut store = store();
        let mut panel = ControlPanel::new("test");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        panel
            .bind(&store, "size", Widget::Slider)
            .unwrap()
            .on_change(move |v| sink.borrow_mut().push(v.clone()));

        panel.interact(&mut store, "size", 0.5).unwrap();
        panel.interact(&mut store, "size", 0.5).unwrap();

        assert_eq!(*seen.borrow(), vec![ParamValue::Number(0.5)]);
        assert_eq!(panel.pending_changes(), 1);
    }

    #[test]
    fn action_press_always_queues() {
        let mut store = store();
        let mut panel = ControlPanel::new("test");
        panel.bind_auto(&store, "visibleToggle").unwrap();

        panel.interact(&mut store, "visibleToggle", ParamValue::Trigger).unwrap();
        panel.interact(&mut store, "visibleToggle", ParamValue::Trigger).unwrap();

        assert_eq!(panel.drain_changes().len(), 2);
        assert_eq!(panel.pending_changes(), 0);
    }

    #[test]
    fn sections_follow_folders() {
        let store = store();
        let mut panel = ControlPanel::new("test");
        panel.bind_auto(&store, "visibleToggle").unwrap();
        panel.folder("Size Controls");
        panel.bind_auto(&store, "size").unwrap().label("Size");
        panel.folder("Visibility");
        panel.bind_auto(&store, "wireframe").unwrap();

        let sections = panel.sections();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[1].title, Some("Size Controls"));
        assert_eq!(sections[1].bindings[0].display_label(), "Size");
        assert_eq!(sections[2].bindings[0].param(), "wireframe");
    }

    #[test]
    fn interact_on_unbound_parameter_fails() {
        let mut store = store();
        let mut panel = ControlPanel::new("test");
        assert!(matches!(
            panel.interact(&mut store, "size", 0.3),
            Err(ParamError::UnboundParameter(_))
        ));
        assert_eq!(store.number("size").unwrap(), 1.0);
    }
}
