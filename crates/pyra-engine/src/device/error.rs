use thiserror::Error;

/// Which request of the negotiation handshake failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NegotiationStage {
    Adapter,
    Device,
}

impl std::fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationStage::Adapter => f.write_str("adapter"),
            NegotiationStage::Device => f.write_str("device"),
        }
    }
}

/// Status reported when the next drawable could not be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AcquireFailure {
    Lost,
    Outdated,
    Timeout,
    OutOfMemory,
    /// The backend reported a status this session does not recognize.
    Unknown,
}

impl AcquireFailure {
    /// Lost, Outdated and Timeout are recovered by reconfiguring the surface.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            AcquireFailure::Lost | AcquireFailure::Outdated | AcquireFailure::Timeout
        )
    }
}

impl From<wgpu::SurfaceError> for AcquireFailure {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => AcquireFailure::Lost,
            wgpu::SurfaceError::Outdated => AcquireFailure::Outdated,
            wgpu::SurfaceError::Timeout => AcquireFailure::Timeout,
            wgpu::SurfaceError::OutOfMemory => AcquireFailure::OutOfMemory,
            wgpu::SurfaceError::Other => AcquireFailure::Unknown,
        }
    }
}

impl std::fmt::Display for AcquireFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AcquireFailure::Lost => "lost",
            AcquireFailure::Outdated => "outdated",
            AcquireFailure::Timeout => "timeout",
            AcquireFailure::OutOfMemory => "out of memory",
            AcquireFailure::Unknown => "unrecognized status",
        };
        f.write_str(s)
    }
}

/// Fatal session failures.
///
/// Every variant ends the session. Transient surface statuses and uncaptured backend
/// diagnostics never show up here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to create the presentation surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("{stage} request failed: {message}")]
    Negotiation {
        stage: NegotiationStage,
        message: String,
    },

    #[error("resource creation rejected: {0}")]
    ResourceCreation(String),

    #[error("pipeline build failed: {0}")]
    PipelineBuild(String),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("could not acquire the next surface texture: {0}")]
    SurfaceFatal(AcquireFailure),

    #[error("device lost ({reason}): {message}")]
    DeviceLost { reason: String, message: String },
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
