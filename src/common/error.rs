use std::fmt::{Debug, Display, Error, Formatter};

// Error kind
//------------------------------------------------------------------------------

/// Coarse classification of [`HexError`].
///
/// `NotFound`, `GeometryMismatch` and `FormatError` all mean that an image did not decode and
/// the caller may retry with another frame. `InvalidArgument` is a caller bug.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    GeometryMismatch,
    FormatError,
}

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum HexError {
    // Construction
    EmptyData,
    DataTooLong,
    InvalidErrorCorrectionFactor,
    InvalidRingGeometry,
    IndexOutOfRange,
    BufferSizeMismatch,
    InvalidBitWidth,
    ValueOutOfRange,
    PositionOutOfRange,
    BitsNotAssigned,

    // Detection
    BoundingRectNotFound,
    ConvexHullNotFound,
    LongestSidesNotFound,
    OrientationNotFound,
    FinderPatternNotFound,
    ParallelLines,
    IrregularHexagon,
    SingularMatrix,
    PointAtInfinity,

    // Format
    UnsupportedVersion,
    LengthMismatch,
    TooManyErrors,
    ChecksumMismatch,
}

impl HexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyData
            | Self::DataTooLong
            | Self::InvalidErrorCorrectionFactor
            | Self::InvalidRingGeometry
            | Self::IndexOutOfRange
            | Self::BufferSizeMismatch
            | Self::InvalidBitWidth
            | Self::ValueOutOfRange
            | Self::PositionOutOfRange
            | Self::BitsNotAssigned => ErrorKind::InvalidArgument,

            Self::BoundingRectNotFound
            | Self::ConvexHullNotFound
            | Self::LongestSidesNotFound
            | Self::OrientationNotFound
            | Self::FinderPatternNotFound => ErrorKind::NotFound,

            Self::ParallelLines
            | Self::IrregularHexagon
            | Self::SingularMatrix
            | Self::PointAtInfinity => ErrorKind::GeometryMismatch,

            Self::UnsupportedVersion
            | Self::LengthMismatch
            | Self::TooManyErrors
            | Self::ChecksumMismatch => ErrorKind::FormatError,
        }
    }

    /// True for every failure that only means "this image did not decode".
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::InvalidArgument
    }
}

impl Display for HexError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            // Construction
            Self::EmptyData => "Empty data",
            Self::DataTooLong => "Data too long",
            Self::InvalidErrorCorrectionFactor => "Error correction factor out of range",
            Self::InvalidRingGeometry => "Invalid hexagon ring geometry",
            Self::IndexOutOfRange => "Index out of range",
            Self::BufferSizeMismatch => "Buffer too small for requested bit range",
            Self::InvalidBitWidth => "Bit width must be between 1 and 32",
            Self::ValueOutOfRange => "Value does not fit into the requested bit width",
            Self::PositionOutOfRange => "Position exceeds segment length",
            Self::BitsNotAssigned => "Ring has no bits assigned",

            // Detection
            Self::BoundingRectNotFound => "Bounding rect not found",
            Self::ConvexHullNotFound => "Convex hull not found",
            Self::LongestSidesNotFound => "Six longest hexagon sides not found",
            Self::OrientationNotFound => "Orientation finder not found",
            Self::FinderPatternNotFound => "Finder pattern not found",
            Self::ParallelLines => "Hexagon sides do not intersect",
            Self::IrregularHexagon => "Hexagon side lengths deviate too much",
            Self::SingularMatrix => "Cannot compute perspective transform",
            Self::PointAtInfinity => "Projected point is at infinity",

            // Format
            Self::UnsupportedVersion => "Unsupported format version",
            Self::LengthMismatch => "Declared length does not match ring capacity",
            Self::TooManyErrors => "Too many errors to correct successfully",
            Self::ChecksumMismatch => "Payload checksum mismatch",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for HexError {}

pub type HexResult<T> = Result<T, HexError>;
