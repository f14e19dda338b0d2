// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the luminance meter

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame capture errors
    Capture(CaptureError),
    /// Frame analysis errors
    Analysis(AnalysisError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Capture-specific errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No capture devices found
    NoDeviceFound,
    /// Device path does not exist or cannot be opened
    DeviceNotFound(String),
    /// Device opened but format negotiation failed
    FormatNotSupported(String),
    /// Capture stream failed
    StreamFailed(String),
    /// Source stopped delivering frames
    Disconnected,
}

/// Analysis-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// An accepted frame carried zero samples; the mean is undefined
    EmptyFrame,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Analysis(e) => write!(f, "Analysis error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoDeviceFound => write!(f, "No capture devices found"),
            CaptureError::DeviceNotFound(path) => write!(f, "Device not found: {}", path),
            CaptureError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            CaptureError::StreamFailed(msg) => write!(f, "Capture stream failed: {}", msg),
            CaptureError::Disconnected => write!(f, "Capture source disconnected"),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyFrame => write!(f, "Frame contains no samples"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for AnalysisError {}

// Conversions from sub-errors to AppError
impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
