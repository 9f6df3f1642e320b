use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MappingError {
    /// the four channel arrays do not share a common length
    LengthMismatch,
    /// the status/ccu/position arrays are not all of length 4
    ControlTableSizeInvalid,
    TowerIdOutOfRange,
    StripIdOutOfRange,
    ChannelIdOutOfRange,
    DuplicateCrystalIndex,
    CrystalNotFound,
    TowerNotFound,
    TomlDecodingError,
    JsonDecodingError
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<MappingError : {:?}>", self)
    }
}

impl std::error::Error for MappingError {
}
