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

//! The WMS Explorer window.
//!
//! Wires the map view, the layer manager and the details panel together.
//! Layer metadata is fetched on a tokio runtime in the background; results
//! come back over a channel that is drained at the start of every frame.

use std::sync::mpsc;

use eframe::egui;
use log::{debug, error, info};
use tokio_util::sync::CancellationToken;
use wms_context::{
    ContextError, ContextFetcher, DownloadContext, DownloadHandler, LayerManager, LayerMetadata,
    LogOnlyDownload, MapSurface, PanelBuilder, PanelRequest, WmsLayer,
};

use crate::config::AppConfig;
use crate::map::MapView;
use crate::ui::{LayerListEvent, LayerListView, LayerPanelView, PanelEvent};

type FetchResult = (PanelRequest, Result<LayerMetadata, ContextError>);

pub struct WmsExplorerApp {
    config: AppConfig,
    map: MapView,
    layers: LayerManager,
    panels: PanelBuilder,
    fetcher: ContextFetcher,
    runtime: tokio::runtime::Runtime,
    results_tx: mpsc::Sender<FetchResult>,
    results_rx: mpsc::Receiver<FetchResult>,
    /// Cancels the metadata request still in flight, if any
    pending_fetch: Option<CancellationToken>,
    download: Box<dyn DownloadHandler>,
    layer_list: LayerListView,
    panel_view: LayerPanelView,
}

impl WmsExplorerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        initial_layer: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Initializing WMS Explorer (catalog: {})", config.catalog_url);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("wms-fetch")
            .enable_all()
            .build()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("wms-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache_dir = config.tile_disk_cache.then(MapView::default_cache_dir);
        let mut map = MapView::new(&config.srs, cache_dir);
        map.set_overlay_opacity(config.data_layer_opacity);

        let (results_tx, results_rx) = mpsc::channel();

        let mut app = Self {
            fetcher: ContextFetcher::with_client(client, config.catalog_url.clone()),
            layers: LayerManager::new(config.layer_sources()),
            panels: PanelBuilder::new(),
            map,
            config,
            runtime,
            results_tx,
            results_rx,
            pending_fetch: None,
            download: Box::new(LogOnlyDownload),
            layer_list: LayerListView::new(),
            panel_view: LayerPanelView::new(),
        };

        app.initialize(initial_layer.as_deref(), &cc.egui_ctx);
        Ok(app)
    }

    /// Set up the map: background layer, data layer, whole-world view.
    /// Runs once per app.
    fn initialize(&mut self, initial_layer: Option<&str>, ctx: &egui::Context) {
        self.map.add_layer(WmsLayer::background(
            &self.config.background_url,
            &self.config.background_layers,
        ));
        self.select_layer(initial_layer, ctx);
        self.map.zoom_to_max_extent(self.config.max_extent_zoom);
    }

    fn select_layer(&mut self, name: Option<&str>, ctx: &egui::Context) {
        if let Some(previous) = self.pending_fetch.take() {
            previous.cancel();
        }

        if let Some(request) = self.layers.set_layer(name, &mut self.map, &mut self.panels) {
            self.spawn_fetch(request, ctx);
        }
    }

    fn spawn_fetch(&mut self, request: PanelRequest, ctx: &egui::Context) {
        let cancel_token = CancellationToken::new();
        self.pending_fetch = Some(cancel_token.clone());

        let fetcher = self.fetcher.clone();
        let results_tx = self.results_tx.clone();
        let ctx = ctx.clone();
        let layer = request.layer.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                () = cancel_token.cancelled() => {
                    debug!("Metadata request for '{}' superseded", layer);
                }
                result = fetcher.fetch(&layer) => {
                    // The receiver only goes away when the app is closing
                    if results_tx.send((request, result)).is_ok() {
                        ctx.request_repaint();
                    }
                }
            }
        });
    }

    fn poll_fetches(&mut self) {
        while let Ok((request, result)) = self.results_rx.try_recv() {
            if self.panels.is_current(&request) {
                self.pending_fetch = None;
            }
            self.panels.complete(&request, result);
        }
    }

    fn handle_panel_event(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::DimensionChanged(change) => {
                self.layers
                    .set_layer_dim(&change.dimension, &change.value, &mut self.map);
            }
            PanelEvent::Download => {
                let context = DownloadContext {
                    layer_name: self
                        .layers
                        .current_layer(&self.map)
                        .map(|l| l.title.clone()),
                    extent: self.map.extent(),
                    dimensions: self.panels.selected_dimensions(),
                };
                self.download.trigger(&context);
            }
        }
    }

    fn handle_layer_list_event(&mut self, event: LayerListEvent, ctx: &egui::Context) {
        match event {
            LayerListEvent::Select(name) => self.select_layer(name.as_deref(), ctx),
            LayerListEvent::Remember(name) => {
                if self.config.add_layer(&name) {
                    self.save_config();
                }
            }
            LayerListEvent::Forget(name) => {
                if self.config.remove_layer(&name) {
                    self.save_config();
                }
            }
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            error!("Failed to save configuration: {}", e);
        }
    }

    fn draw_side_panel(&mut self, ctx: &egui::Context) {
        let mut list_event = None;
        let mut panel_events = Vec::new();
        let mut opacity_settled = false;

        egui::SidePanel::left("layer_side_panel")
            .default_width(self.config.panel_width)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    list_event = self.layer_list.render(
                        ui,
                        &self.config.layers,
                        self.layers.current_name(),
                    );

                    ui.add_space(6.0);
                    let mut opacity = self.map.overlay_opacity();
                    let response = ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0)
                        .text("Data layer opacity"));
                    if response.changed() {
                        self.map.set_overlay_opacity(opacity);
                        self.config.data_layer_opacity = self.map.overlay_opacity();
                    }
                    opacity_settled = response.drag_stopped();

                    ui.add_space(10.0);
                    panel_events = self.panel_view.render(ui, &mut self.panels);
                });
            });

        if opacity_settled {
            self.save_config();
        }
        if let Some(event) = list_event {
            self.handle_layer_list_event(event, ctx);
        }
        for event in panel_events {
            self.handle_panel_event(event);
        }
    }

    fn draw_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let layer = self
                    .layers
                    .current_layer(&self.map)
                    .map_or("none", |l| l.title.as_str());
                ui.label(egui::RichText::new(format!("LAYER {layer}"))
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(10.0)
                    .monospace());

                if let Some(extent) = self.map.extent() {
                    ui.label(egui::RichText::new(format!(
                        "EXTENT {:.3},{:.3},{:.3},{:.3}",
                        extent.min_x, extent.min_y, extent.max_x, extent.max_y
                    ))
                    .color(egui::Color32::from_rgb(120, 120, 120))
                    .size(10.0)
                    .monospace());
                }

                for (layer, source_error) in self.map.layers() {
                    if let Some(message) = source_error {
                        ui.label(egui::RichText::new(format!("{}: {}", layer.title, message))
                            .color(egui::Color32::from_rgb(220, 50, 50))
                            .size(10.0));
                    }
                }
            });
        });
    }
}

impl eframe::App for WmsExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetches();

        self.draw_side_panel(ctx);
        self.draw_status_bar(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.map.show(ui);
            });
    }
}
