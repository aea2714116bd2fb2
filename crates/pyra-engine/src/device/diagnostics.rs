//! Typed capability snapshots taken during negotiation.
//!
//! Purely observational: nothing in the session reads these values to make decisions.

use super::surface::SurfaceCaps;

/// Selected limits, widened to `u64`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LimitsSnapshot {
    pub max_texture_dimension_2d: u64,
    pub max_bind_groups: u64,
    pub max_bindings_per_bind_group: u64,
    pub max_uniform_buffers_per_shader_stage: u64,
    pub max_uniform_buffer_binding_size: u64,
    pub max_vertex_buffers: u64,
    pub max_vertex_attributes: u64,
    pub max_vertex_buffer_array_stride: u64,
    pub max_buffer_size: u64,
    pub min_uniform_buffer_offset_alignment: u64,
    pub max_color_attachments: u64,
}

impl LimitsSnapshot {
    pub fn capture(limits: &wgpu::Limits) -> Self {
        Self {
            max_texture_dimension_2d: u64::from(limits.max_texture_dimension_2d),
            max_bind_groups: u64::from(limits.max_bind_groups),
            max_bindings_per_bind_group: u64::from(limits.max_bindings_per_bind_group),
            max_uniform_buffers_per_shader_stage: u64::from(
                limits.max_uniform_buffers_per_shader_stage,
            ),
            max_uniform_buffer_binding_size: u64::from(limits.max_uniform_buffer_binding_size),
            max_vertex_buffers: u64::from(limits.max_vertex_buffers),
            max_vertex_attributes: u64::from(limits.max_vertex_attributes),
            max_vertex_buffer_array_stride: u64::from(limits.max_vertex_buffer_array_stride),
            max_buffer_size: u64::from(limits.max_buffer_size),
            min_uniform_buffer_offset_alignment: u64::from(
                limits.min_uniform_buffer_offset_alignment,
            ),
            max_color_attachments: u64::from(limits.max_color_attachments),
        }
    }

    fn rows(&self) -> [(&'static str, u64); 11] {
        [
            ("max_texture_dimension_2d", self.max_texture_dimension_2d),
            ("max_bind_groups", self.max_bind_groups),
            ("max_bindings_per_bind_group", self.max_bindings_per_bind_group),
            (
                "max_uniform_buffers_per_shader_stage",
                self.max_uniform_buffers_per_shader_stage,
            ),
            ("max_uniform_buffer_binding_size", self.max_uniform_buffer_binding_size),
            ("max_vertex_buffers", self.max_vertex_buffers),
            ("max_vertex_attributes", self.max_vertex_attributes),
            ("max_vertex_buffer_array_stride", self.max_vertex_buffer_array_stride),
            ("max_buffer_size", self.max_buffer_size),
            (
                "min_uniform_buffer_offset_alignment",
                self.min_uniform_buffer_offset_alignment,
            ),
            ("max_color_attachments", self.max_color_attachments),
        ]
    }
}

/// Adapter properties relevant for bug reports.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AdapterProperties {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    pub device_type: String,
    pub driver: String,
    pub driver_info: String,
    pub backend: String,
}

impl AdapterProperties {
    pub fn capture(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            vendor: info.vendor,
            device: info.device,
            device_type: format!("{:?}", info.device_type),
            driver: info.driver.clone(),
            driver_info: info.driver_info.clone(),
            backend: format!("{:?}", info.backend),
        }
    }
}

/// Everything logged about the negotiated adapter, device and surface.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub adapter: AdapterProperties,
    pub adapter_limits: LimitsSnapshot,
    pub adapter_features: wgpu::Features,
    pub device_limits: LimitsSnapshot,
    pub device_features: wgpu::Features,
    pub surface: SurfaceCaps,
}

impl Diagnostics {
    pub fn capture(
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        surface: SurfaceCaps,
    ) -> Self {
        Self {
            adapter: AdapterProperties::capture(&adapter.get_info()),
            adapter_limits: LimitsSnapshot::capture(&adapter.limits()),
            adapter_features: adapter.features(),
            device_limits: LimitsSnapshot::capture(&device.limits()),
            device_features: device.features(),
            surface,
        }
    }

    /// Writes the snapshot to the log: a one-line summary at `info`, details at `debug`.
    pub fn log(&self) {
        let a = &self.adapter;
        log::info!(
            "adapter: {} ({}, {}, vendor {:#06x} device {:#06x}, driver {} {})",
            a.name,
            a.backend,
            a.device_type,
            a.vendor,
            a.device,
            a.driver,
            a.driver_info
        );

        if !log::log_enabled!(log::Level::Debug) {
            return;
        }

        log::debug!("adapter limits:");
        for (name, value) in self.adapter_limits.rows() {
            log::debug!("\t{name}: {value}");
        }
        log::debug!("adapter features: {:?}", self.adapter_features);

        log::debug!("device limits:");
        for (name, value) in self.device_limits.rows() {
            log::debug!("\t{name}: {value}");
        }
        log::debug!("device features: {:?}", self.device_features);

        log::debug!("surface formats: {:?}", self.surface.formats);
        log::debug!("surface present modes: {:?}", self.surface.present_modes);
        log::debug!("surface alpha modes: {:?}", self.surface.alpha_modes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_snapshot_copies_defaults() {
        let limits = wgpu::Limits::default();
        let snap = LimitsSnapshot::capture(&limits);
        assert_eq!(snap.max_bind_groups, u64::from(limits.max_bind_groups));
        assert_eq!(snap.max_buffer_size, u64::from(limits.max_buffer_size));
        assert_eq!(snap.rows().len(), 11);
    }

    #[test]
    fn downlevel_limits_are_not_larger() {
        let full = LimitsSnapshot::capture(&wgpu::Limits::default());
        let low = LimitsSnapshot::capture(&wgpu::Limits::downlevel_webgl2_defaults());
        assert!(low.max_texture_dimension_2d <= full.max_texture_dimension_2d);
        assert!(low.max_vertex_buffers <= full.max_vertex_buffers);
    }
}
