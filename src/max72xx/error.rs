//! Error type for the MAX72xx driver
//!
//! The chips never acknowledge a write, so a missing or broken chip cannot be
//! detected. What can fail is addressing (reported without touching the
//! buffer or the wire) and the transport pins or bus underneath.

use core::fmt;

pub use display_interface::DisplayError;

/// Outcome of a driver operation that did not complete.
///
/// Ignoring this value is always safe: an `OutOfRange` call changed nothing
/// and sent nothing.
#[derive(Debug, Clone)]
pub enum Error {
    /// Device, row or column index outside the chain geometry
    OutOfRange,
    /// `show_device` was asked to flush a device without buffered changes
    NotDirty,
    /// Pin or bus failure while shifting data to the chain
    Interface(DisplayError),
}

/// `DisplayError` has no `PartialEq`, interface errors compare by variant.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Interface(a), Self::Interface(b)) => {
                core::mem::discriminant(a) == core::mem::discriminant(b)
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Interface(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "device, row or column index out of range"),
            Self::NotDirty => write!(f, "device has no buffered changes to show"),
            Self::Interface(err) => write!(f, "transport error: {:?}", err),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias using the driver Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_errors_compare_by_variant() {
        assert_eq!(
            Error::Interface(DisplayError::BusWriteError),
            Error::from(DisplayError::BusWriteError)
        );
        assert_ne!(
            Error::Interface(DisplayError::BusWriteError),
            Error::Interface(DisplayError::CSError)
        );
        assert_ne!(Error::OutOfRange, Error::NotDirty);
        assert_ne!(Error::NotDirty, Error::Interface(DisplayError::CSError));
    }
}
