// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use eframe::egui;

/// User actions coming out of the layer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerListEvent {
    /// Show a catalog layer, or the default layer for `None`
    Select(Option<String>),
    /// Add a name to the saved layer list
    Remember(String),
    /// Drop a name from the saved layer list
    Forget(String),
}

/// Layer picker: saved layer names, a free-text layer name and the default layer
#[derive(Debug, Default)]
pub struct LayerListView {
    name_input: String,
}

impl LayerListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        known: &[String],
        current: Option<&str>,
    ) -> Option<LayerListEvent> {
        let mut event = None;

        ui.label(egui::RichText::new("◈ LAYERS")
            .color(egui::Color32::from_rgb(100, 200, 100))
            .size(12.0)
            .strong());
        ui.separator();

        if ui.selectable_label(current.is_none(), "Default layer").clicked() {
            event = Some(LayerListEvent::Select(None));
        }

        for name in known {
            ui.horizontal(|ui| {
                let selected = current == Some(name.as_str());
                if ui.selectable_label(selected, name).clicked() {
                    event = Some(LayerListEvent::Select(Some(name.clone())));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").on_hover_text("Remove from list").clicked() {
                        event = Some(LayerListEvent::Forget(name.clone()));
                    }
                });
            });
        }

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let response = ui.add(egui::TextEdit::singleline(&mut self.name_input)
                .hint_text("Layer name")
                .desired_width(150.0));
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button("Show").clicked() || submitted {
                let name = self.name_input.trim();
                if !name.is_empty() {
                    event = Some(LayerListEvent::Select(Some(name.to_string())));
                }
            }

            if ui.button("Save").on_hover_text("Keep in the layer list").clicked() {
                let name = self.name_input.trim();
                if !name.is_empty() {
                    event = Some(LayerListEvent::Remember(name.to_string()));
                    self.name_input.clear();
                }
            }
        });

        event
    }
}
