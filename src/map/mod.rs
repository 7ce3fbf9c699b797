//! Map rendering and WMS tile sources.
//!
//! This module provides the walkers map view holding the layer stack and
//! the tile source that turns slippy-map tiles into WMS GetMap requests.

pub mod view;
pub mod wms_source;

pub use view::MapView;
pub use wms_source::WmsTileSource;
