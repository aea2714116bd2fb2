use std::sync::Arc;

use super::diagnostics::Diagnostics;
use super::error::{NegotiationStage, SessionError, SessionResult};
use super::health::DeviceHealth;
use super::surface::SurfaceCaps;
use super::GpuConfig;

/// Result of the adapter/device handshake.
pub struct Negotiated {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub health: Arc<DeviceHealth>,
    pub diagnostics: Diagnostics,
}

/// Requests an adapter compatible with `surface`, then a device and queue from it.
///
/// Both requests are asynchronous under wgpu; this blocks until each has resolved, so no other
/// setup step can run while selection is pending.
pub fn negotiate(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    config: &GpuConfig,
) -> SessionResult<Negotiated> {
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: config.power_preference,
        compatible_surface: Some(surface),
        force_fallback_adapter: config.force_fallback_adapter,
    }))
    .map_err(|e| SessionError::Negotiation {
        stage: NegotiationStage::Adapter,
        message: e.to_string(),
    })?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("pyra device"),
        required_features: config.required_features,
        required_limits: config.required_limits.clone(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .map_err(|e| SessionError::Negotiation {
        stage: NegotiationStage::Device,
        message: e.to_string(),
    })?;

    let health = Arc::new(DeviceHealth::new());
    install_device_callbacks(&device, &health);

    let diagnostics = Diagnostics::capture(
        &adapter,
        &device,
        SurfaceCaps::from(&surface.get_capabilities(&adapter)),
    );
    diagnostics.log();

    Ok(Negotiated {
        adapter,
        device,
        queue,
        health,
        diagnostics,
    })
}

fn install_device_callbacks(device: &wgpu::Device, health: &Arc<DeviceHealth>) {
    let errors = Arc::clone(health);
    let handler: Box<dyn wgpu::UncapturedErrorHandler> = Box::new(move |err: wgpu::Error| {
        let n = errors.record_uncaptured();
        log::error!("uncaptured backend error #{n}: {err}");
    });
    device.on_uncaptured_error(handler.into());

    let lost = Arc::clone(health);
    device.set_device_lost_callback(move |reason, message| {
        let destroyed = matches!(reason, wgpu::DeviceLostReason::Destroyed);
        if lost.mark_lost(format!("{reason:?}"), message.clone()) {
            if destroyed {
                log::debug!("device destroyed: {message}");
            } else {
                log::error!("device lost ({reason:?}): {message}");
            }
        }
    });
}
