//! Global constants for the test-beam readout geometry
//!
//! ISSUES:
//! * the tower/CCU association is duplicated in the
//!   mapping tables. There is an active issue #4
//!

/// Number of trigger towers read out in the test-beam patch
pub const N_TOWERS              : usize = 4;

/// Number of VFE cards (strips) per trigger tower
pub const N_STRIPS_PER_TOWER    : usize = 5;

/// Number of channels per VFE card
pub const N_CHANNELS_PER_STRIP  : usize = 5;

/// Number of crystals per trigger tower
pub const N_CRYSTALS_PER_TOWER  : usize = 25;

/// Number of crystal/channel rows in the mapping table
pub const N_MAPPED_CHANNELS     : usize = 100;

/// Number of CCUs on the readout bus (one per tower)
pub const N_CCUS                : usize = 4;

/// Tower ids of the read-out towers (DQM numbering scheme)
pub const TOWER_IDS             : [i32; N_TOWERS] = [1, 2, 5, 6];

/// Number of crystals per supermodule
pub const N_CRYSTALS_SM         : usize = 1700;

/// Number of crystals in phi per supermodule
pub const N_CRYSTALS_IN_PHI     : usize = 20;

/// Number of crystals in eta per supermodule
pub const N_CRYSTALS_IN_ETA     : usize = 85;

/// Number of trigger towers per supermodule
pub const N_TOWERS_SM           : usize = 68;
