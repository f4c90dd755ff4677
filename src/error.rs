//! Errors raised by the windowing, GPU and configuration shell.
//!
//! The simulation core has no error paths; everything fallible lives at the
//! edges and is reported through [`LabError`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request GPU device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("surface error")]
    Surface(#[from] wgpu::SurfaceError),
}

pub type LabResult<T> = Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn surface_errors_convert_into_the_surface_variant() {
        let err = LabError::from(wgpu::SurfaceError::OutOfMemory);
        assert!(matches!(err, LabError::Surface(wgpu::SurfaceError::OutOfMemory)));
        assert_eq!(err.to_string(), "surface error");
    }

    #[test]
    fn config_errors_keep_their_source() {
        let err = LabError::ConfigRead {
            path: PathBuf::from("lab.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read config file lab.toml");
        assert!(err.source().is_some());
    }
}
