//! Channel mapping of the test-beam supermodule patch
//!
//! The H2 beam line reads out a 10x10 crystal patch
//! covering 4 trigger towers. Each crystal is addressed
//! through its tower, the VFE card (strip) on that tower
//! and the channel on that card. A small auxiliary table
//! carries the status codes and the CCU/DQM position ids
//! of the read-out towers.
//!
//! The arrays are consumed by the configuration framework
//! under fixed names (ics, towerIDs, stripIDs, channelIDs,
//! statusIDs, ccuIDs, positionIDs), so the serialized
//! representation has to keep these names.

use std::fmt;
use std::fs::File;
use std::io::{
  Write,
  Read,
};
use std::collections::{
  HashMap,
  HashSet,
};

use crate::constants::{
  N_CCUS,
  N_STRIPS_PER_TOWER,
  N_CHANNELS_PER_STRIP,
  TOWER_IDS,
};
use crate::errors::MappingError;

/// Crystal indices of the mapped patch, row by row in
/// the supermodule numbering (20 crystals per phi row,
/// only the first 10 are cabled)
pub const H2_CRYSTAL_INDICES : [i32; 100] = [
    1,   2,   3,   4,   5,   6,   7,   8,   9,  10,
   21,  22,  23,  24,  25,  26,  27,  28,  29,  30,
   41,  42,  43,  44,  45,  46,  47,  48,  49,  50,
   61,  62,  63,  64,  65,  66,  67,  68,  69,  70,
   81,  82,  83,  84,  85,  86,  87,  88,  89,  90,
  101, 102, 103, 104, 105, 106, 107, 108, 109, 110,
  121, 122, 123, 124, 125, 126, 127, 128, 129, 130,
  141, 142, 143, 144, 145, 146, 147, 148, 149, 150,
  161, 162, 163, 164, 165, 166, 167, 168, 169, 170,
  181, 182, 183, 184, 185, 186, 187, 188, 189, 190,
];

/// Tower id for each crystal (DQM numbering scheme)
pub const H2_TOWER_IDS : [i32; 100] = [
    1,   1,   1,   1,   1,   2,   2,   2,   2,   2,
    1,   1,   1,   1,   1,   2,   2,   2,   2,   2,
    1,   1,   1,   1,   1,   2,   2,   2,   2,   2,
    1,   1,   1,   1,   1,   2,   2,   2,   2,   2,
    1,   1,   1,   1,   1,   2,   2,   2,   2,   2,
    5,   5,   5,   5,   5,   6,   6,   6,   6,   6,
    5,   5,   5,   5,   5,   6,   6,   6,   6,   6,
    5,   5,   5,   5,   5,   6,   6,   6,   6,   6,
    5,   5,   5,   5,   5,   6,   6,   6,   6,   6,
    5,   5,   5,   5,   5,   6,   6,   6,   6,   6,
];

/// Strip (VFE card) number for each crystal. The strip
/// order is reversed on the right-hand towers.
pub const H2_STRIP_IDS : [i32; 100] = [
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
    1,   2,   3,   4,   5,   5,   4,   3,   2,   1,
];

/// Channel id on the VFE card for each crystal
pub const H2_CHANNEL_IDS : [i32; 100] = [
    1,   1,   1,   1,   1,   1,   1,   1,   1,   1,
    2,   2,   2,   2,   2,   2,   2,   2,   2,   2,
    3,   3,   3,   3,   3,   3,   3,   3,   3,   3,
    4,   4,   4,   4,   4,   4,   4,   4,   4,   4,
    5,   5,   5,   5,   5,   5,   5,   5,   5,   5,
    1,   1,   1,   1,   1,   1,   1,   1,   1,   1,
    2,   2,   2,   2,   2,   2,   2,   2,   2,   2,
    3,   3,   3,   3,   3,   3,   3,   3,   3,   3,
    4,   4,   4,   4,   4,   4,   4,   4,   4,   4,
    5,   5,   5,   5,   5,   5,   5,   5,   5,   5,
];

/// Status codes of the read-out towers
pub const H2_STATUS_IDS   : [i32; N_CCUS] = [1, 2, 3, 4];

/// CCU id for each read-out tower, in tower id order
pub const H2_CCU_IDS      : [i32; N_CCUS] = [1, 71, 80, 45];

/// DQM position id for each read-out tower, paired with
/// the CCU ids by index
pub const H2_POSITION_IDS : [i32; N_CCUS] = [6, 2, 5, 1];

/// Nested lookup tower id -> strip -> channel -> crystal index
pub type TowerStripChMapping = HashMap<u8, HashMap<u8, HashMap<u8, i32>>>;

/// Towers cabled with the VFE cards in ascending strip order
pub fn is_left_tower(tower_id : i32) -> bool {
  tower_id == 1 || tower_id == 5
}

/// Towers cabled with the VFE cards in descending strip order
pub fn is_right_tower(tower_id : i32) -> bool {
  tower_id == 2 || tower_id == 6
}

/// A single crystal/channel row of the mapping table
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChannelMappingRow {
  pub crystal_index : i32,
  pub tower_id      : i32,
  pub strip_id      : i32,
  pub channel_id    : i32
}

impl ChannelMappingRow {
  pub fn new() -> Self {
    Self {
      crystal_index : 0,
      tower_id      : 0,
      strip_id      : 0,
      channel_id    : 0
    }
  }
}

impl Default for ChannelMappingRow {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for ChannelMappingRow {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f,
"<ChannelMappingRow:
   crystal : {}
   tower   : {}
   strip   : {}
   channel : {}>",
           self.crystal_index,
           self.tower_id,
           self.strip_id,
           self.channel_id)
  }
}

/// Control/monitoring information of one read-out tower
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TowerControlEntry {
  pub tower_id    : i32,
  pub ccu_id      : i32,
  pub position_id : i32
}

impl fmt::Display for TowerControlEntry {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "<TowerControlEntry: tower {} CCU {} position {}>",
           self.tower_id, self.ccu_id, self.position_id)
  }
}

/// The full channel mapping as the configuration
/// framework sees it
///
/// The first four arrays run in parallel, one entry per
/// cabled crystal. The last three form the per-tower
/// auxiliary table of fixed length 4, where ccuIDs and
/// positionIDs correspond 1:1 by index.
///
/// The table is authored once and loaded once per
/// process, there is no update path.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TBChannelMapping {
  /// crystal indices
  #[serde(rename = "ics")]
  pub crystal_indices : Vec<i32>,
  /// tower ids (DQM numbering scheme)
  #[serde(rename = "towerIDs")]
  pub tower_ids       : Vec<i32>,
  /// strip (VFE) numbers
  #[serde(rename = "stripIDs")]
  pub strip_ids       : Vec<i32>,
  /// channel ids
  #[serde(rename = "channelIDs")]
  pub channel_ids     : Vec<i32>,
  /// status codes
  #[serde(rename = "statusIDs")]
  pub status_ids      : Vec<i32>,
  /// tower CCU ids
  #[serde(rename = "ccuIDs")]
  pub ccu_ids         : Vec<i32>,
  /// tower DQM position ids
  #[serde(rename = "positionIDs")]
  pub position_ids    : Vec<i32>
}

impl TBChannelMapping {

  pub fn new() -> Self {
    Self {
      crystal_indices : Vec::<i32>::new(),
      tower_ids       : Vec::<i32>::new(),
      strip_ids       : Vec::<i32>::new(),
      channel_ids     : Vec::<i32>::new(),
      status_ids      : Vec::<i32>::new(),
      ccu_ids         : Vec::<i32>::new(),
      position_ids    : Vec::<i32>::new()
    }
  }

  /// The built-in mapping of the H2 test-beam patch
  pub fn h2() -> Self {
    Self {
      crystal_indices : H2_CRYSTAL_INDICES.to_vec(),
      tower_ids       : H2_TOWER_IDS.to_vec(),
      strip_ids       : H2_STRIP_IDS.to_vec(),
      channel_ids     : H2_CHANNEL_IDS.to_vec(),
      status_ids      : H2_STATUS_IDS.to_vec(),
      ccu_ids         : H2_CCU_IDS.to_vec(),
      position_ids    : H2_POSITION_IDS.to_vec()
    }
  }

  /// Number of crystal/channel rows
  pub fn len(&self) -> usize {
    self.crystal_indices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.crystal_indices.is_empty()
  }

  /// Check the table against the mapping schema
  ///
  /// This is the only failure mode the table has. A
  /// mapping which does not validate must not be handed
  /// to the readout.
  pub fn validate(&self) -> Result<(), MappingError> {
    let nrows = self.crystal_indices.len();
    if self.tower_ids.len()   != nrows ||
       self.strip_ids.len()   != nrows ||
       self.channel_ids.len() != nrows {
      error!("Channel arrays have mismatched lengths! ics {}, towerIDs {}, stripIDs {}, channelIDs {}",
             nrows, self.tower_ids.len(), self.strip_ids.len(), self.channel_ids.len());
      return Err(MappingError::LengthMismatch);
    }
    if self.status_ids.len()   != N_CCUS ||
       self.ccu_ids.len()      != N_CCUS ||
       self.position_ids.len() != N_CCUS {
      error!("Control table arrays must have length {}! statusIDs {}, ccuIDs {}, positionIDs {}",
             N_CCUS, self.status_ids.len(), self.ccu_ids.len(), self.position_ids.len());
      return Err(MappingError::ControlTableSizeInvalid);
    }
    for tower in &self.tower_ids {
      if !TOWER_IDS.contains(tower) {
        error!("Tower id {} is not in the DQM numbering scheme {:?}!", tower, TOWER_IDS);
        return Err(MappingError::TowerIdOutOfRange);
      }
    }
    for strip in &self.strip_ids {
      if *strip < 1 || *strip > N_STRIPS_PER_TOWER as i32 {
        error!("Strip id {} is out of range!", strip);
        return Err(MappingError::StripIdOutOfRange);
      }
    }
    for ch in &self.channel_ids {
      if *ch < 1 || *ch > N_CHANNELS_PER_STRIP as i32 {
        error!("Channel id {} is out of range!", ch);
        return Err(MappingError::ChannelIdOutOfRange);
      }
    }
    let mut seen = HashSet::<i32>::new();
    for ic in &self.crystal_indices {
      if !seen.insert(*ic) {
        error!("Crystal index {} appears more than once!", ic);
        return Err(MappingError::DuplicateCrystalIndex);
      }
    }
    debug!("Mapping with {} rows validated", nrows);
    Ok(())
  }

  pub fn row(&self, idx : usize) -> Option<ChannelMappingRow> {
    if idx >= self.len() {
      return None;
    }
    Some(ChannelMappingRow {
      crystal_index : self.crystal_indices[idx],
      tower_id      : self.tower_ids[idx],
      strip_id      : self.strip_ids[idx],
      channel_id    : self.channel_ids[idx]
    })
  }

  /// All crystal/channel rows of the table
  pub fn rows(&self) -> Vec<ChannelMappingRow> {
    let mut rows = Vec::<ChannelMappingRow>::with_capacity(self.len());
    for idx in 0..self.len() {
      // row indices stay in bounds here
      if let Some(row) = self.row(idx) {
        rows.push(row);
      }
    }
    rows
  }

  /// The electronics address of a single crystal
  pub fn row_for_crystal(&self, crystal_index : i32) -> Result<ChannelMappingRow, MappingError> {
    for idx in 0..self.len() {
      if self.crystal_indices[idx] == crystal_index {
        // unwrap is safe, idx < len
        return Ok(self.row(idx).unwrap());
      }
    }
    warn!("Crystal {} is not cabled in this mapping!", crystal_index);
    Err(MappingError::CrystalNotFound)
  }

  /// The crystal sitting on a given electronics address
  pub fn crystal_index_for(&self, tower_id : i32, strip_id : i32, channel_id : i32)
    -> Result<i32, MappingError> {
    for idx in 0..self.len() {
      if self.tower_ids[idx]   == tower_id &&
         self.strip_ids[idx]   == strip_id &&
         self.channel_ids[idx] == channel_id {
        return Ok(self.crystal_indices[idx]);
      }
    }
    warn!("No crystal on tower {} strip {} channel {}!", tower_id, strip_id, channel_id);
    Err(MappingError::CrystalNotFound)
  }

  /// The per-tower control table, towers in ascending id
  /// order as in the DQM numbering scheme
  pub fn control_entries(&self) -> Vec<TowerControlEntry> {
    let mut towers = Vec::<i32>::new();
    for tower in &self.tower_ids {
      if !towers.contains(tower) {
        towers.push(*tower);
      }
    }
    towers.sort();
    if towers.len() != self.ccu_ids.len() {
      warn!("{} distinct towers, but {} CCU entries!", towers.len(), self.ccu_ids.len());
    }
    let mut entries = Vec::<TowerControlEntry>::new();
    for (idx, tower) in towers.iter().enumerate() {
      if idx >= self.ccu_ids.len() || idx >= self.position_ids.len() {
        break;
      }
      entries.push(TowerControlEntry {
        tower_id    : *tower,
        ccu_id      : self.ccu_ids[idx],
        position_id : self.position_ids[idx]
      });
    }
    entries
  }

  pub fn ccu_for_tower(&self, tower_id : i32) -> Result<i32, MappingError> {
    for entry in self.control_entries() {
      if entry.tower_id == tower_id {
        return Ok(entry.ccu_id);
      }
    }
    warn!("Tower {} has no CCU entry!", tower_id);
    Err(MappingError::TowerNotFound)
  }

  pub fn position_for_tower(&self, tower_id : i32) -> Result<i32, MappingError> {
    for entry in self.control_entries() {
      if entry.tower_id == tower_id {
        return Ok(entry.position_id);
      }
    }
    warn!("Tower {} has no position entry!", tower_id);
    Err(MappingError::TowerNotFound)
  }

  /// Write the mapping to a toml file
  pub fn to_toml(&self, mut filename : String) {
    if !filename.ends_with(".toml") {
      filename += ".toml";
    }
    info!("Will write to file {}!", filename);
    match File::create(&filename) {
      Err(err) => {
        error!("Unable to open file {}! {}", filename, err);
      }
      Ok(mut file) => {
        match toml::to_string_pretty(&self) {
          Err(err) => {
            error!("Unable to serialize toml! {err}");
          }
          Ok(toml_string) => {
            match file.write_all(toml_string.as_bytes()) {
              Err(err) => error!("Unable to write to file {}! {}", filename, err),
              Ok(_)    => debug!("Wrote mapping to {}!", filename)
            }
          }
        }
      }
    }
  }

  /// Write the mapping to a json file
  pub fn to_json(&self, mut filename : String) {
    if !filename.ends_with(".json") {
      filename += ".json";
    }
    info!("Will write to file {}!", filename);
    match File::create(&filename) {
      Err(err) => {
        error!("Unable to open file {}! {}", filename, err);
      }
      Ok(file) => {
        match serde_json::to_writer_pretty(file, &self) {
          Err(err) => {
            error!("Unable to serialize json! {err}");
          }
          Ok(_) => debug!("Wrote mapping to {}!", filename)
        }
      }
    }
  }

  pub fn from_toml(filename : String) -> Result<TBChannelMapping, MappingError> {
    match File::open(&filename) {
      Err(err) => {
        error!("Unable to open {}! {}", filename, err);
        return Err(MappingError::TomlDecodingError);
      }
      Ok(mut file) => {
        let mut toml_string = String::from("");
        match file.read_to_string(&mut toml_string) {
          Err(err) => {
            error!("Unable to read {}! {}", filename, err);
            return Err(MappingError::TomlDecodingError);
          }
          Ok(_) => {
            match toml::from_str(&toml_string) {
              Err(err) => {
                error!("Can't interpret toml! {}", err);
                return Err(MappingError::TomlDecodingError);
              }
              Ok(mapping) => {
                return Ok(mapping);
              }
            }
          }
        }
      }
    }
  }

  pub fn from_json(filename : String) -> Result<TBChannelMapping, MappingError> {
    match File::open(&filename) {
      Err(err) => {
        error!("Unable to open {}! {}", filename, err);
        return Err(MappingError::JsonDecodingError);
      }
      Ok(mut file) => {
        let mut json_string = String::from("");
        match file.read_to_string(&mut json_string) {
          Err(err) => {
            error!("Unable to read {}! {}", filename, err);
            return Err(MappingError::JsonDecodingError);
          }
          Ok(_) => {
            match serde_json::from_str(&json_string) {
              Err(err) => {
                error!("Can't interpret json! {}", err);
                return Err(MappingError::JsonDecodingError);
              }
              Ok(mapping) => {
                return Ok(mapping);
              }
            }
          }
        }
      }
    }
  }
}

impl Default for TBChannelMapping {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for TBChannelMapping {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let disp = toml::to_string(self).unwrap_or(
      String::from("-- DESERIALIZATION ERROR! --"));
    write!(f, "<TBChannelMapping :\n{}>", disp)
  }
}

/// Create a mapping of crystal index to tower id
pub fn get_crystal_tower_map(mapping : &TBChannelMapping) -> HashMap<i32, i32> {
  let mut crystal_tower = HashMap::<i32, i32>::new();
  for row in mapping.rows() {
    crystal_tower.insert(row.crystal_index, row.tower_id);
  }
  crystal_tower
}

/// Create a mapping of tower id to CCU id
pub fn get_tower_ccu_map(mapping : &TBChannelMapping) -> HashMap<i32, i32> {
  let mut tower_ccu = HashMap::<i32, i32>::new();
  for entry in mapping.control_entries() {
    tower_ccu.insert(entry.tower_id, entry.ccu_id);
  }
  tower_ccu
}

/// Create a mapping of CCU id to DQM position id
pub fn get_ccu_position_map(mapping : &TBChannelMapping) -> HashMap<i32, i32> {
  let mut ccu_position = HashMap::<i32, i32>::new();
  for entry in mapping.control_entries() {
    ccu_position.insert(entry.ccu_id, entry.position_id);
  }
  ccu_position
}

pub fn get_tower_strip_ch_map(mapping : &TBChannelMapping) -> TowerStripChMapping {
  let mut tower_map = TowerStripChMapping::new();
  for tower in TOWER_IDS {
    let mut strip_map = HashMap::<u8, HashMap<u8, i32>>::new();
    for strip in 1..N_STRIPS_PER_TOWER as u8 + 1 {
      let mut ch_map = HashMap::<u8, i32>::new();
      for ch in 1..N_CHANNELS_PER_STRIP as u8 + 1 {
        // 0 marks a channel without a cabled crystal
        ch_map.insert(ch, 0);
      }
      strip_map.insert(strip, ch_map);
    }
    tower_map.insert(tower as u8, strip_map);
  }
  for row in mapping.rows() {
    let tower = row.tower_id   as u8;
    let strip = row.strip_id   as u8;
    let ch    = row.channel_id as u8;
    match tower_map.get_mut(&tower) {
      None => {
        warn!("Tower {} is not part of the readout!", tower);
        continue;
      }
      Some(strip_map) => {
        match strip_map.get_mut(&strip) {
          None => {
            warn!("Strip {} on tower {} is not part of the readout!", strip, tower);
            continue;
          }
          Some(ch_map) => {
            ch_map.insert(ch, row.crystal_index);
          }
        }
      }
    }
  }
  tower_map
}

#[test]
fn validate_h2_mapping() {
  let mapping = TBChannelMapping::h2();
  assert!(mapping.validate().is_ok());
  assert_eq!(mapping.len(), 100);
}

#[test]
fn toml_circle_h2_mapping() {
  let mapping = TBChannelMapping::h2();
  let repr    = toml::to_string(&mapping).unwrap();
  let test    = toml::from_str::<TBChannelMapping>(&repr).unwrap();
  assert_eq!(mapping, test);
}

#[test]
fn serialized_names_are_fixed() {
  let mapping = TBChannelMapping::h2();
  let repr    = serde_json::to_string(&mapping).unwrap();
  for name in ["ics", "towerIDs", "stripIDs", "channelIDs",
               "statusIDs", "ccuIDs", "positionIDs"] {
    assert!(repr.contains(name));
  }
}
