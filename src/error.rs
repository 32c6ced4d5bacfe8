//! Unified error types for the MoldWatch firmware.
//!
//! Each collaborator boundary has its own small `Copy` error enum; all of
//! them convert into the top-level [`Error`] so call sites that only need
//! to log can treat them uniformly. None of these are fatal: every fault
//! is handled at the layer that detects it.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Sensor connectivity probe failed.
    Probe(ProbeError),
    /// Sensor sample fetch failed.
    Fetch(FetchError),
    /// A channel value could not be decoded.
    Read(ReadError),
    /// The mesh transport rejected or could not send a payload.
    Transport(TransportError),
    /// The node registry has no free slot.
    Registry(RegistryError),
    /// The ingest queue is full.
    QueueFull(QueueFull),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Fetch(e) => write!(f, "fetch: {e}"),
            Self::Read(e) => write!(f, "read: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::QueueFull(e) => write!(f, "queue: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ProbeError {}
impl std::error::Error for FetchError {}
impl std::error::Error for ReadError {}
impl std::error::Error for TransportError {}
impl std::error::Error for RegistryError {}
impl std::error::Error for QueueFull {}
impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sensor port errors
// ---------------------------------------------------------------------------

/// Outcome of a failed connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// SDA/SCL wiring fault: the bus itself is not working.
    Bus,
    /// The bus answers but the device is not ready yet.
    NotReady,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus/wiring fault"),
            Self::NotReady => write!(f, "device not ready"),
        }
    }
}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

/// Failed sample fetch, carrying the driver's negative errno-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchError {
    pub code: i32,
}

impl FetchError {
    /// I/O error: the device stopped answering mid-transfer (VCC/GND lost).
    pub const EIO: i32 = -5;
    /// Device still busy converting.
    pub const EBUSY: i32 = -16;
    /// Frame failed its checksum.
    pub const EBADMSG: i32 = -74;
    /// Bus transfer failed for a reason other than a missing device.
    pub const EREMOTEIO: i32 = -121;

    pub const fn new(code: i32) -> Self {
        Self { code }
    }

    /// The one fetch code that points at a power fault rather than a
    /// generic fetch failure.
    pub const fn is_power_loss(self) -> bool {
        self.code == Self::EIO
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_power_loss() {
            write!(f, "power loss (code {})", self.code)
        } else {
            write!(f, "fetch failed (code {})", self.code)
        }
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// No fetched sample is available for this sensor.
    NoSample,
    /// The channel is not supported or failed to decode.
    Decode,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSample => write!(f, "no sample fetched"),
            Self::Decode => write!(f, "channel decode failed"),
        }
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No message buffer could be allocated.
    NoBuffer,
    /// The peer is unreachable.
    Unreachable,
    /// The transport rejected the request with a stack-specific code.
    Rejected(i32),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBuffer => write!(f, "no message buffer"),
            Self::Unreachable => write!(f, "peer unreachable"),
            Self::Rejected(code) => write!(f, "rejected (code {code})"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Collector resource exhaustion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every slot holds a different address.
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "registry full"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

/// The ingest queue rejected a push; the message was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue full, message dropped")
    }
}

impl From<QueueFull> for Error {
    fn from(e: QueueFull) -> Self {
        Self::QueueFull(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
