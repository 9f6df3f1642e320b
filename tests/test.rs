#[cfg(test)]
pub mod tests {

  use ecal_tb_mapping::constants::{
    N_MAPPED_CHANNELS,
    N_CCUS,
    TOWER_IDS,
  };
  use ecal_tb_mapping::mapping::{
    TBChannelMapping,
    get_crystal_tower_map,
    get_tower_ccu_map,
    get_ccu_position_map,
    get_tower_strip_ch_map,
    is_left_tower,
    is_right_tower,
  };
  use ecal_tb_mapping::MappingError;

  #[test]
  fn h2_mapping_has_expected_shape() {
    let mapping = TBChannelMapping::h2();
    assert_eq!(mapping.crystal_indices.len(), N_MAPPED_CHANNELS);
    assert_eq!(mapping.tower_ids.len(),       N_MAPPED_CHANNELS);
    assert_eq!(mapping.strip_ids.len(),       N_MAPPED_CHANNELS);
    assert_eq!(mapping.channel_ids.len(),     N_MAPPED_CHANNELS);
    assert_eq!(mapping.status_ids.len(),      N_CCUS);
    assert_eq!(mapping.ccu_ids.len(),         N_CCUS);
    assert_eq!(mapping.position_ids.len(),    N_CCUS);
    assert!(mapping.validate().is_ok());
  }

  #[test]
  fn h2_mapping_first_row() {
    let mapping = TBChannelMapping::h2();
    let row = mapping.row(0).unwrap();
    assert_eq!(row.crystal_index, 1);
    assert_eq!(row.tower_id,      1);
    assert_eq!(row.strip_id,      1);
    assert_eq!(row.channel_id,    1);
  }

  #[test]
  fn h2_mapping_id_ranges() {
    let mapping = TBChannelMapping::h2();
    for row in mapping.rows() {
      assert!(TOWER_IDS.contains(&row.tower_id));
      assert!(row.strip_id   >= 1 && row.strip_id   <= 5);
      assert!(row.channel_id >= 1 && row.channel_id <= 5);
    }
  }

  #[test]
  fn crystal_lookup_circle() {
    let mapping = TBChannelMapping::h2();
    for row in mapping.rows() {
      let ic = mapping.crystal_index_for(row.tower_id,
                                         row.strip_id,
                                         row.channel_id).unwrap();
      assert_eq!(ic, row.crystal_index);
      let back = mapping.row_for_crystal(ic).unwrap();
      assert_eq!(back, row);
    }
  }

  #[test]
  fn uncabled_crystal_is_an_error() {
    let mapping = TBChannelMapping::h2();
    // crystals 11..20 sit outside the cabled patch
    assert_eq!(mapping.row_for_crystal(11).unwrap_err(),
               MappingError::CrystalNotFound);
    // tower 3 is not read out
    assert_eq!(mapping.crystal_index_for(3, 1, 1).unwrap_err(),
               MappingError::CrystalNotFound);
  }

  #[test]
  fn control_table_binds_towers() {
    let mapping = TBChannelMapping::h2();
    assert_eq!(mapping.ccu_for_tower(1).unwrap(),      1);
    assert_eq!(mapping.ccu_for_tower(2).unwrap(),      71);
    assert_eq!(mapping.ccu_for_tower(5).unwrap(),      80);
    assert_eq!(mapping.ccu_for_tower(6).unwrap(),      45);
    assert_eq!(mapping.position_for_tower(1).unwrap(), 6);
    assert_eq!(mapping.position_for_tower(2).unwrap(), 2);
    assert_eq!(mapping.position_for_tower(5).unwrap(), 5);
    assert_eq!(mapping.position_for_tower(6).unwrap(), 1);
    assert_eq!(mapping.ccu_for_tower(3).unwrap_err(),
               MappingError::TowerNotFound);
  }

  #[test]
  fn binder_maps() {
    let mapping       = TBChannelMapping::h2();
    let crystal_tower = get_crystal_tower_map(&mapping);
    assert_eq!(crystal_tower.len(), N_MAPPED_CHANNELS);
    assert_eq!(crystal_tower[&1],   1);
    assert_eq!(crystal_tower[&190], 6);
    let tower_ccu     = get_tower_ccu_map(&mapping);
    assert_eq!(tower_ccu.len(), N_CCUS);
    assert_eq!(tower_ccu[&5],   80);
    let ccu_position  = get_ccu_position_map(&mapping);
    assert_eq!(ccu_position.len(), N_CCUS);
    assert_eq!(ccu_position[&71],  2);
  }

  #[test]
  fn tower_strip_ch_map_resolves_crystals() {
    let mapping   = TBChannelMapping::h2();
    let tower_map = get_tower_strip_ch_map(&mapping);
    // every tower carries the full 5x5 grid
    for tower in TOWER_IDS {
      let strip_map = &tower_map[&(tower as u8)];
      assert_eq!(strip_map.len(), 5);
      for strips in strip_map.values() {
        assert_eq!(strips.len(), 5);
      }
    }
    assert_eq!(tower_map[&1][&1][&1], 1);
    assert_eq!(tower_map[&2][&5][&1], 6);
    assert_eq!(tower_map[&6][&1][&5], 190);
  }

  #[test]
  fn left_right_tower_split() {
    assert!(is_left_tower(1));
    assert!(is_left_tower(5));
    assert!(is_right_tower(2));
    assert!(is_right_tower(6));
    assert!(!is_left_tower(2));
    assert!(!is_right_tower(5));
  }

  #[test]
  fn validate_rejects_malformed_tables() {
    let mut mapping = TBChannelMapping::h2();
    mapping.tower_ids.pop();
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::LengthMismatch);

    let mut mapping = TBChannelMapping::h2();
    mapping.ccu_ids.push(99);
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::ControlTableSizeInvalid);

    let mut mapping = TBChannelMapping::h2();
    mapping.tower_ids[0] = 3;
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::TowerIdOutOfRange);

    let mut mapping = TBChannelMapping::h2();
    mapping.strip_ids[10] = 6;
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::StripIdOutOfRange);

    let mut mapping = TBChannelMapping::h2();
    mapping.channel_ids[10] = 0;
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::ChannelIdOutOfRange);

    let mut mapping = TBChannelMapping::h2();
    mapping.crystal_indices[99] = 1;
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::DuplicateCrystalIndex);
  }

  #[test]
  fn empty_mapping_validates() {
    let mut mapping = TBChannelMapping::new();
    // the control table is mandatory even without rows
    assert_eq!(mapping.validate().unwrap_err(),
               MappingError::ControlTableSizeInvalid);
    mapping.status_ids   = vec![1, 2, 3, 4];
    mapping.ccu_ids      = vec![1, 71, 80, 45];
    mapping.position_ids = vec![6, 2, 5, 1];
    assert!(mapping.validate().is_ok());
    assert!(mapping.is_empty());
  }

  #[test]
  fn toml_file_circle() {
    let dir     = tempfile::tempdir().unwrap();
    let path    = dir.path().join("h2_mapping.toml");
    let fname   = path.to_str().unwrap().to_owned();
    let mapping = TBChannelMapping::h2();
    mapping.to_toml(fname.clone());
    let test    = TBChannelMapping::from_toml(fname).unwrap();
    assert_eq!(mapping, test);
    assert!(test.validate().is_ok());
  }

  #[test]
  fn json_file_circle() {
    let dir     = tempfile::tempdir().unwrap();
    let path    = dir.path().join("h2_mapping.json");
    let fname   = path.to_str().unwrap().to_owned();
    let mapping = TBChannelMapping::h2();
    mapping.to_json(fname.clone());
    let test    = TBChannelMapping::from_json(fname).unwrap();
    assert_eq!(mapping, test);
  }

  #[test]
  fn missing_file_is_a_decoding_error() {
    let result = TBChannelMapping::from_toml(
      String::from("/no/such/h2_mapping.toml"));
    assert_eq!(result.unwrap_err(), MappingError::TomlDecodingError);
    let result = TBChannelMapping::from_json(
      String::from("/no/such/h2_mapping.json"));
    assert_eq!(result.unwrap_err(), MappingError::JsonDecodingError);
  }
}
