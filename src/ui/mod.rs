//! UI components for WMS Explorer.
//!
//! This module contains the side panel components: the layer list and the
//! layer details panel.

pub mod layer_list;
pub mod layer_panel;

pub use layer_list::{LayerListEvent, LayerListView};
pub use layer_panel::{LayerPanelView, PanelEvent};
