use bevy::prelude::*;
use constants::render_settings::SURFACE_ID_PREFIX;

use crate::engine::error::EngineError;

#[cfg(target_arch = "wasm32")]
use web_sys::window;

/// Whether the app found an accelerated render device. Recorded by
/// `BackdropPlugin::finish`; scene creation refuses to run without it.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub enum RenderSupport {
    Available,
    Unavailable(String),
}

impl RenderSupport {
    pub fn check(support: Option<&RenderSupport>) -> Result<(), EngineError> {
        match support {
            Some(RenderSupport::Available) => Ok(()),
            Some(RenderSupport::Unavailable(reason)) => {
                Err(EngineError::RenderingUnavailable(reason.clone()))
            }
            None => Err(EngineError::RenderingUnavailable(
                "render support was never probed".to_string(),
            )),
        }
    }
}

/// Logical viewport size plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scale_factor: if scale_factor.is_finite() && scale_factor > 0.0 {
                scale_factor
            } else {
                1.0
            },
        }
    }

    pub fn physical_size(&self) -> UVec2 {
        UVec2::new(
            (self.width as f32 * self.scale_factor).round() as u32,
            (self.height as f32 * self.scale_factor).round() as u32,
        )
    }

    /// Current browser viewport on wasm, a fixed desktop size elsewhere.
    pub fn current() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = window() {
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(1280.0);
                let height = window
                    .inner_height()
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(720.0);
                return Self::new(
                    width as u32,
                    height as u32,
                    window.device_pixel_ratio() as f32,
                );
            }
        }

        Self::default()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

/// The native element backing one rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceElement {
    pub id: String,
    pub window: Entity,
    pub viewport: Viewport,
}

impl SurfaceElement {
    pub fn new(window: Entity, viewport: Viewport) -> Self {
        Self {
            id: format!("{}-{}", SURFACE_ID_PREFIX, window.to_bits()),
            window,
            viewport,
        }
    }

    /// CSS selector Bevy uses to bind the window to the canvas.
    pub fn selector(&self) -> String {
        format!("#{}", self.id)
    }
}

/// Container that rendering surfaces are mounted into.
pub trait SurfaceHost: Send + Sync {
    fn attach(&mut self, surface: &SurfaceElement) -> Result<(), EngineError>;

    /// Returns false if the element was not attached to this host.
    fn detach(&mut self, surface: &SurfaceElement) -> bool;

    fn attached_surfaces(&self) -> usize;
}

/// Host for native builds: each surface is its own OS window, so attaching
/// only records it.
#[derive(Debug, Default)]
pub struct NativeHost {
    attached: Vec<String>,
}

impl NativeHost {
    pub fn is_attached(&self, surface: &SurfaceElement) -> bool {
        self.attached.contains(&surface.id)
    }
}

impl SurfaceHost for NativeHost {
    fn attach(&mut self, surface: &SurfaceElement) -> Result<(), EngineError> {
        if self.is_attached(surface) {
            return Err(EngineError::Surface(format!(
                "surface {} is already attached",
                surface.id
            )));
        }
        self.attached.push(surface.id.clone());
        Ok(())
    }

    fn detach(&mut self, surface: &SurfaceElement) -> bool {
        let Some(index) = self.attached.iter().position(|id| *id == surface.id) else {
            warn!("Surface {} is not attached to this host", surface.id);
            return false;
        };
        self.attached.remove(index);
        true
    }

    fn attached_surfaces(&self) -> usize {
        self.attached.len()
    }
}

/// Host for the web build: creates a `<canvas>` inside the DOM element
/// `container_id` and removes it again on detach.
#[derive(Debug)]
pub struct CanvasHost {
    container_id: String,
    attached: Vec<String>,
}

impl CanvasHost {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            attached: Vec::new(),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }
}

impl CanvasHost {
    #[cfg(target_arch = "wasm32")]
    fn mount_canvas(&self, surface: &SurfaceElement) -> Result<(), EngineError> {
        let js_err = |e: wasm_bindgen::JsValue| EngineError::Surface(format!("{e:?}"));

        let document = window()
            .and_then(|w| w.document())
            .ok_or_else(|| EngineError::Surface("document unavailable".to_string()))?;
        let container = document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| {
                EngineError::Surface(format!("container #{} not found", self.container_id))
            })?;

        let size = surface.viewport.physical_size();
        let canvas = document.create_element("canvas").map_err(js_err)?;
        canvas.set_id(&surface.id);
        canvas
            .set_attribute("width", &size.x.to_string())
            .map_err(js_err)?;
        canvas
            .set_attribute("height", &size.y.to_string())
            .map_err(js_err)?;
        canvas
            .set_attribute(
                "style",
                "position:absolute;inset:0;width:100%;height:100%;pointer-events:none;",
            )
            .map_err(js_err)?;
        container.append_child(&canvas).map_err(js_err)?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn mount_canvas(&self, _surface: &SurfaceElement) -> Result<(), EngineError> {
        Err(EngineError::Surface(format!(
            "canvas host #{} requires a wasm32 build",
            self.container_id
        )))
    }
}

impl SurfaceHost for CanvasHost {
    fn attach(&mut self, surface: &SurfaceElement) -> Result<(), EngineError> {
        if self.attached.contains(&surface.id) {
            return Err(EngineError::Surface(format!(
                "surface {} is already attached",
                surface.id
            )));
        }

        self.mount_canvas(surface)?;
        self.attached.push(surface.id.clone());
        Ok(())
    }

    fn detach(&mut self, surface: &SurfaceElement) -> bool {
        let Some(index) = self.attached.iter().position(|id| *id == surface.id) else {
            warn!(
                "Canvas {} is not attached to #{}",
                surface.id, self.container_id
            );
            return false;
        };
        self.attached.remove(index);

        #[cfg(target_arch = "wasm32")]
        {
            if let Some(element) = window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&surface.id))
            {
                element.remove();
            }
        }

        true
    }

    fn attached_surfaces(&self) -> usize {
        self.attached.len()
    }
}
