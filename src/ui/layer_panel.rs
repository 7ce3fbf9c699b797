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
use wms_context::panel::LayerPanel;
use wms_context::{ControlId, DimensionChange, PanelBuilder, PanelState};

/// User actions coming out of the details panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    DimensionChanged(DimensionChange),
    Download,
}

/// Draws the layer details: title, abstract and one selector per dimension
#[derive(Debug, Default)]
pub struct LayerPanelView;

impl LayerPanelView {
    pub fn new() -> Self {
        Self
    }

    /// Render the panel and apply selector changes to `panels`
    pub fn render(&mut self, ui: &mut egui::Ui, panels: &mut PanelBuilder) -> Vec<PanelEvent> {
        ui.label(egui::RichText::new("◈ LAYER DETAILS")
            .color(egui::Color32::from_rgb(100, 180, 220))
            .size(12.0)
            .strong());
        ui.separator();

        let mut picked: Vec<(ControlId, usize)> = Vec::new();
        let mut events = Vec::new();

        match panels.state() {
            PanelState::Empty => {
                ui.label(egui::RichText::new("Select a layer to see its details")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .italics());
            }
            PanelState::Loading { layer } => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading details for {layer}…"));
                });
            }
            PanelState::Failed { layer, message } => {
                ui.label(egui::RichText::new(format!("Could not load details for {layer}"))
                    .color(egui::Color32::from_rgb(220, 80, 80))
                    .strong());
                ui.label(egui::RichText::new(message)
                    .color(egui::Color32::from_rgb(180, 180, 180))
                    .size(10.0));
            }
            PanelState::Ready(panel) => {
                Self::render_ready(ui, panel, &mut picked, &mut events);
            }
        }

        // Selections are applied after drawing, the panel is borrowed above
        for (control, index) in picked {
            if let Some(change) = panels.select(&control, index) {
                events.push(PanelEvent::DimensionChanged(change));
            }
        }

        events
    }

    fn render_ready(
        ui: &mut egui::Ui,
        panel: &LayerPanel,
        picked: &mut Vec<(ControlId, usize)>,
        events: &mut Vec<PanelEvent>,
    ) {
        ui.label(egui::RichText::new(&panel.title_line).strong());
        ui.label(&panel.abstract_line);
        ui.add_space(6.0);

        for row in &panel.rows {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&row.label).strong());

                egui::ComboBox::from_id_salt(row.control.as_str())
                    .selected_text(row.selected_value().unwrap_or_default())
                    .show_ui(ui, |ui| {
                        for (index, option) in row.options.iter().enumerate() {
                            if ui.selectable_label(index == row.selected, option).clicked() {
                                picked.push((row.control.clone(), index));
                            }
                        }
                    });

                ui.label(&row.units_text);
            });
        }

        if let Some(download) = panel.download {
            ui.add_space(6.0);
            if ui.button(download.label)
                .on_hover_text("Logs the coverage request that would be made")
                .clicked()
            {
                events.push(PanelEvent::Download);
            }
        }
    }
}
