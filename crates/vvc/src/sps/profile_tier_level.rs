use super::GeneralConstraintsInfo;
use crate::error::Result;
use crate::reader::RbspReader;

/// `profile_tier_level()`.
///
/// ISO/IEC 23090-3 - 7.3.3.1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileTierLevel {
    /// Only present when the profile is signalled.
    pub general_profile_idc: Option<u8>,
    pub general_tier_flag: bool,
    pub general_level_idc: u8,
    pub ptl_frame_only_constraint_flag: bool,
    pub ptl_multilayer_enabled_flag: bool,
    pub general_constraints_info: Option<GeneralConstraintsInfo>,
    /// `sublayer_level_idc[i]` for `i` in `0..=max_num_sub_layers_minus1`.
    ///
    /// Levels that are not signalled are inferred from the next higher sub-layer, and the highest
    /// sub-layer uses `general_level_idc`.
    pub sublayer_level_idc: Vec<u8>,
    pub general_sub_profile_idc: Vec<u32>,
}

impl ProfileTierLevel {
    pub fn parse(reader: &mut RbspReader, profile_tier_present_flag: bool, max_num_sub_layers_minus1: u8) -> Result<Self> {
        let mut ptl = Self::default();

        if profile_tier_present_flag {
            ptl.general_profile_idc = Some(reader.read_bits("general_profile_idc", 7)? as u8);
            ptl.general_tier_flag = reader.read_flag("general_tier_flag")?;
        }

        ptl.general_level_idc = reader.read_bits("general_level_idc", 8)? as u8;
        ptl.ptl_frame_only_constraint_flag = reader.read_flag("ptl_frame_only_constraint_flag")?;
        ptl.ptl_multilayer_enabled_flag = reader.read_flag("ptl_multilayer_enabled_flag")?;

        if profile_tier_present_flag {
            ptl.general_constraints_info = Some(GeneralConstraintsInfo::parse(reader)?);
        }

        let max = max_num_sub_layers_minus1 as usize;
        let mut sublayer_level_present_flag = vec![false; max];
        for i in (0..max).rev() {
            sublayer_level_present_flag[i] = reader.read_flag("ptl_sublayer_level_present_flag")?;
        }

        reader.read_zero_bits_until_aligned("ptl_reserved_zero_bit")?;

        ptl.sublayer_level_idc = vec![ptl.general_level_idc; max + 1];
        for i in (0..max).rev() {
            ptl.sublayer_level_idc[i] = if sublayer_level_present_flag[i] {
                reader.read_bits("sublayer_level_idc", 8)? as u8
            } else {
                ptl.sublayer_level_idc[i + 1]
            };
        }

        if profile_tier_present_flag {
            let ptl_num_sub_profiles = reader.read_bits("ptl_num_sub_profiles", 8)?;
            ptl.general_sub_profile_idc = (0..ptl_num_sub_profiles)
                .map(|_| reader.read_bits("general_sub_profile_idc", 32).map(|v| v as u32))
                .collect::<Result<_>>()?;
        }

        Ok(ptl)
    }

    /// The level as `(major, minor)`. `general_level_idc` is `major * 16 + minor * 3`.
    pub const fn level(&self) -> (u8, u8) {
        (self.general_level_idc / 16, self.general_level_idc % 16 / 3)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::ProfileTierLevel;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn main10_level_5_1() {
        let data = RbspBuilder::new()
            .bits(1, 7)
            .flag(false)
            .bits(83, 8)
            .flag(true)
            .flag(false)
            .flag(false) // gci_present_flag
            .zero_align()
            .bits(1, 8)
            .bits(0xDEAD_BEEF, 32)
            .into_bytes();

        let mut reader = RbspReader::new(&data);
        let ptl = ProfileTierLevel::parse(&mut reader, true, 0).unwrap();
        assert_eq!(ptl.general_profile_idc, Some(1));
        assert_eq!(ptl.level(), (5, 1));
        assert_eq!(ptl.sublayer_level_idc, [83]);
        assert_eq!(ptl.general_sub_profile_idc, [0xDEAD_BEEF]);
        assert_eq!(reader.bits_remaining(), 0);
    }

    #[test]
    fn sublayer_levels_are_inferred_downwards() {
        // three sub-layers, only sub-layer 0 has its own level
        let data = RbspBuilder::new()
            .bits(64, 8)
            .flag(false)
            .flag(false)
            .flag(false) // present[1]
            .flag(true) // present[0]
            .zero_align()
            .bits(32, 8)
            .into_bytes();

        let ptl = ProfileTierLevel::parse(&mut RbspReader::new(&data), false, 2).unwrap();
        assert_eq!(ptl.general_profile_idc, None);
        assert!(ptl.general_constraints_info.is_none());
        assert_eq!(ptl.sublayer_level_idc, [32, 64, 64]);
    }
}
