use winit::window::Window;

/// What the session needs from the window that owns its surface.
pub trait FramebufferSource {
    /// Drawable size in physical pixels. May be zero while minimized.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Called right before a frame is presented.
    fn pre_present(&self) {}
}

impl FramebufferSource for Window {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }

    fn pre_present(&self) {
        self.pre_present_notify();
    }
}
