/// Runs `create` inside validation and out-of-memory error scopes on the calling thread.
///
/// Device-side rejections that would otherwise reach the uncaptured-error handler come back
/// here as `Err`, so setup can fail at the step that caused them.
pub fn capture_errors<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    // Scopes pop innermost first.
    let validation_error = pollster::block_on(validation.pop());
    let oom_error = pollster::block_on(oom.pop());

    match validation_error.or(oom_error) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// Device with no real backend, for tests that need wgpu-core validation but no GPU.
#[cfg(test)]
pub(crate) fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_creation_passes_through() {
        let (device, _queue) = noop_device();
        let buffer = capture_errors(&device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ok"),
                size: 64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })
        .unwrap();
        assert_eq!(buffer.size(), 64);
    }

    #[test]
    fn rejected_descriptor_is_returned_as_error() {
        let (device, _queue) = noop_device();
        let result = capture_errors(&device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("bad usage"),
                size: 64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::UNIFORM,
                mapped_at_creation: false,
            })
        });
        assert!(matches!(result, Err(wgpu::Error::Validation { .. })));
    }

    #[test]
    fn scopes_do_not_leak_into_later_calls() {
        let (device, _queue) = noop_device();
        let bad = capture_errors(&device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("bad usage"),
                size: 4,
                usage: wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        });
        assert!(bad.is_err());

        let good = capture_errors(&device, || 7);
        assert_eq!(good.ok(), Some(7));
    }
}
