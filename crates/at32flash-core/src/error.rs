//! Error types for at32flash-core
//!
//! This module provides a no_std compatible error type that is used by every
//! layer of the driver, from register accesses up to the bank handlers.

use core::fmt;

use crate::efc::Status;

/// Failure reported by the debug target access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    /// Memory or register read failed
    Read {
        /// Address of the failed access
        address: u32,
    },
    /// Memory or register write failed
    Write {
        /// Address of the failed access
        address: u32,
    },
    /// The on-target routine could not be started or did not finish
    Algorithm,
    /// Generic failure from the probe backend
    Other(&'static str),
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Fatal, non-retriable conditions
    /// The target must be halted before flash can be modified
    TargetNotHalted,
    /// Write offset is not 2-byte aligned
    UnalignedOffset {
        /// The rejected offset
        offset: u32,
    },
    /// Product ID is not in the chip catalog
    UnknownProductId(u32),
    /// Bank base address does not match any flash window
    InvalidBankAddress(u32),
    /// Region size is not a whole number of sectors
    InvalidGeometry {
        /// Size of the offending region in bytes
        size: u32,
        /// Sector size in bytes
        sector_size: u32,
    },
    /// Requested sector range is empty or beyond the bank
    InvalidSectorRange {
        /// First requested sector
        first: u32,
        /// Last requested sector
        last: u32,
    },
    /// Requested protection block range is empty or beyond the bank
    InvalidBlockRange {
        /// First requested block
        first: u32,
        /// Last requested block
        last: u32,
    },
    /// Access runs past the end of the bank
    OutOfBounds {
        /// Offset from the bank base
        offset: u32,
        /// Length of the access in bytes
        len: u32,
    },
    /// Operation needs geometry but the bank was never probed
    NotProbed,
    /// Malformed command or bank arguments
    Syntax(&'static str),
    /// Operation does not apply to this kind of bank
    Unsupported(&'static str),

    // Recoverable
    /// No working area could be allocated on the target
    ResourceUnavailable,

    // Hardware
    /// The controller reported programming or protection errors
    Hardware(Status),
    /// The on-target write routine stopped on a flash error
    FlashOperationFailed {
        /// Flash address the routine was writing
        address: u32,
        /// Status word returned by the routine
        status: u32,
    },
    /// Busy flag did not clear in time
    Timeout,

    /// Debug target access failed
    Target(TargetError),
}

impl From<TargetError> for Error {
    fn from(e: TargetError) -> Self {
        Error::Target(e)
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { address } => write!(f, "target read failed at 0x{:08X}", address),
            Self::Write { address } => write!(f, "target write failed at 0x{:08X}", address),
            Self::Algorithm => write!(f, "target algorithm failed to run"),
            Self::Other(msg) => write!(f, "target error: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotHalted => write!(f, "target not halted"),
            Self::UnalignedOffset { offset } => {
                write!(f, "offset 0x{:08X} breaks required 2-byte alignment", offset)
            }
            Self::UnknownProductId(pid) => write!(f, "unknown product ID 0x{:08X}", pid),
            Self::InvalidBankAddress(addr) => write!(f, "invalid flash bank address 0x{:08X}", addr),
            Self::InvalidGeometry { size, sector_size } => write!(
                f,
                "region size 0x{:X} is not a multiple of sector size 0x{:X}",
                size, sector_size
            ),
            Self::InvalidSectorRange { first, last } => {
                write!(f, "invalid sector range {}..={}", first, last)
            }
            Self::InvalidBlockRange { first, last } => {
                write!(f, "invalid protection block range {}..={}", first, last)
            }
            Self::OutOfBounds { offset, len } => write!(
                f,
                "access of {} bytes at offset 0x{:08X} is outside the bank",
                len, offset
            ),
            Self::NotProbed => write!(f, "flash bank not probed"),
            Self::Syntax(msg) => write!(f, "syntax error: {}", msg),
            Self::Unsupported(msg) => write!(f, "not supported: {}", msg),
            Self::ResourceUnavailable => write!(f, "no working area available"),
            Self::Hardware(status) => {
                let mut sep = "";
                write!(f, "flash controller error:")?;
                if status.contains(Status::PRGMERR) {
                    write!(f, " programming error (flash not erased)")?;
                    sep = ",";
                }
                if status.contains(Status::EPPERR) {
                    write!(f, "{} write protection violation", sep)?;
                }
                Ok(())
            }
            Self::FlashOperationFailed { address, status } => write!(
                f,
                "flash write failed at address 0x{:08X} (status 0x{:08X})",
                address, status
            ),
            Self::Timeout => write!(f, "timed out waiting for flash"),
            Self::Target(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TargetError {}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Target(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
