//! Draws a `ControlPanel` with egui and collects the edits made this frame.
//!
//! Nothing here writes the parameter store. Edits come back as
//! `(name, value)` pairs for the runner to apply through `interact`, the
//! same path a programmatic edit takes.

use crate::controls::{Binding, ControlPanel, Widget};
use crate::math::Color;
use crate::params::{ParamSpec, ParamValue, ParameterStore};

pub type Edit = (String, ParamValue);

pub fn show(ctx: &egui::Context, panel: &ControlPanel, store: &ParameterStore) -> Vec<Edit> {
    let mut edits = Vec::new();
    egui::Window::new(panel.title())
        .default_pos(egui::pos2(12.0, 12.0))
        .resizable(false)
        .show(ctx, |ui| {
            for section in panel.sections() {
                match section.title {
                    Some(title) => {
                        egui::CollapsingHeader::new(title)
                            .default_open(true)
                            .show(ui, |ui| {
                                for binding in &section.bindings {
                                    widget(ui, binding, store, &mut edits);
                                }
                            });
                    }
                    None => {
                        for binding in &section.bindings {
                            widget(ui, binding, store, &mut edits);
                        }
                    }
                }
            }
        });
    edits
}

/// Frame counter in the corner
pub fn show_fps(ctx: &egui::Context, fps: f32) {
    egui::Area::new(egui::Id::new("fps"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("{fps:.0} FPS"))
                    .size(14.0)
                    .color(egui::Color32::from_rgb(74, 158, 255)),
            );
        });
}

fn widget(ui: &mut egui::Ui, binding: &Binding, store: &ParameterStore, edits: &mut Vec<Edit>) {
    let name = binding.param();
    let label = binding.display_label();
    let (Ok(spec), Ok(value)) = (store.spec(name), store.get(name)) else {
        return;
    };

    match (binding.widget(), spec, value) {
        (Widget::Slider, ParamSpec::Number { min, max, step }, ParamValue::Number(current)) => {
            let mut v = *current;
            let mut slider = egui::Slider::new(&mut v, *min..=*max).text(label);
            if *step > 0.0 {
                slider = slider.step_by(f64::from(*step));
            }
            if ui.add(slider).changed() {
                edits.push((name.to_string(), ParamValue::Number(v)));
            }
        }
        (Widget::Checkbox, _, ParamValue::Bool(current)) => {
            let mut on = *current;
            if ui.checkbox(&mut on, label).changed() {
                edits.push((name.to_string(), ParamValue::Bool(on)));
            }
        }
        (Widget::ColorPicker, _, ParamValue::Color(current)) => {
            let mut rgb = current.to_array();
            ui.horizontal(|ui| {
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    edits.push((name.to_string(), ParamValue::Color(Color::from(rgb))));
                }
                ui.label(label);
            });
        }
        (Widget::Dropdown, ParamSpec::Choice { options }, ParamValue::Choice(current)) => {
            let mut selected = current.clone();
            let shown = options
                .iter()
                .find(|o| &o.value == current)
                .map_or(current.as_str(), |o| o.label.as_str());
            egui::ComboBox::from_label(label)
                .selected_text(shown)
                .show_ui(ui, |ui| {
                    for option in options {
                        ui.selectable_value(&mut selected, option.value.clone(), &option.label);
                    }
                });
            if &selected != current {
                edits.push((name.to_string(), ParamValue::Choice(selected)));
            }
        }
        (Widget::Button, _, _) => {
            if ui.button(label).clicked() {
                edits.push((name.to_string(), ParamValue::Trigger));
            }
        }
        (widget, _, value) => {
            log::warn!("{:?} cannot show '{}' holding {}", widget, name, value);
        }
    }
}
