//! This module contains some error and result definitions used in this crate.

use std::fmt::{self, Display, Formatter};
use std::io;

/// An enumeration of the errors that can occur when building boards and cages
/// or running a solver. Errors raised while reading puzzle bundles are
/// covered by [BundleError] instead.
#[derive(Debug, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that a cell value is outside the valid range, that is, less
    /// than 1 or greater than 9.
    InvalidValue,

    /// Indicates that a position or a row/column/box index lies outside the
    /// grid. This is the case if any coordinate is greater than 8.
    OutOfRange,

    /// Indicates that a cage list handed to a board contains two cages which
    /// share a cell. The board is left unchanged in that case.
    OverlappingCages,

    /// Indicates that a cage was created without any cells.
    EmptyCage,

    /// Indicates that a cage was created where a cell was contained twice.
    DuplicateCells,

    /// Indicates that a strategy exceeded its configured step limit. This is
    /// a recoverable condition; the board is left in an unspecified
    /// partially-assigned state and should be discarded.
    TooHard
}

impl Display for SudokuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SudokuError::InvalidValue => write!(f, "invalid cell value"),
            SudokuError::OutOfRange => write!(f, "position out of range"),
            SudokuError::OverlappingCages => write!(f, "overlapping cages"),
            SudokuError::EmptyCage => write!(f, "empty cage"),
            SudokuError::DuplicateCells => write!(f, "duplicate cells in cage"),
            SudokuError::TooHard => write!(f, "step limit exceeded")
        }
    }
}

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

/// An enumeration of the errors that may occur when reading a puzzle bundle.
/// All variants indicate a malformed or unreadable bundle; none of them are
/// recoverable for the bundle in question.
#[derive(Debug)]
pub enum BundleError {

    /// Indicates that the file does not start with the `KSF1` magic bytes.
    /// The actually encountered little-endian word is wrapped.
    BadMagic(u32),

    /// Indicates that the header declares a format version this reader does
    /// not understand. The encountered version is wrapped.
    UnsupportedVersion(u8),

    /// Indicates that the bundle ended in the middle of the header, the
    /// index, or a puzzle payload.
    Truncated,

    /// Indicates that a puzzle payload declares a length too short to hold
    /// the 81-byte solution and the cage count. The declared length is
    /// wrapped.
    PayloadTooShort(u32),

    /// Indicates that a puzzle index beyond the bundle's puzzle count was
    /// requested. The requested index is wrapped.
    IndexOutOfRange(usize),

    /// Indicates that a cage in the payload could not be constructed, for
    /// example because it is empty, repeats a cell, or addresses a cell
    /// outside the grid.
    MalformedCage,

    /// Wraps an I/O error that occurred while reading the bundle and that
    /// does not indicate mere truncation.
    Io(io::Error)
}

impl Display for BundleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BundleError::BadMagic(magic) =>
                write!(f, "invalid bundle magic {:#010x}", magic),
            BundleError::UnsupportedVersion(version) =>
                write!(f, "unsupported bundle version {}", version),
            BundleError::Truncated =>
                write!(f, "truncated bundle"),
            BundleError::PayloadTooShort(len) =>
                write!(f, "puzzle payload of {} bytes is too short", len),
            BundleError::IndexOutOfRange(index) =>
                write!(f, "puzzle index {} out of range", index),
            BundleError::MalformedCage =>
                write!(f, "malformed cage in payload"),
            BundleError::Io(error) =>
                write!(f, "bundle I/O error: {}", error)
        }
    }
}

impl From<io::Error> for BundleError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            BundleError::Truncated
        }
        else {
            BundleError::Io(error)
        }
    }
}

impl From<SudokuError> for BundleError {
    fn from(_: SudokuError) -> Self {
        BundleError::MalformedCage
    }
}

/// Syntactic sugar for `Result<V, BundleError>`.
pub type BundleResult<V> = Result<V, BundleError>;
