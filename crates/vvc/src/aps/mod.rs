//! Adaptation parameter set.

use crate::enums::ApsParamsType;
use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::RbspReader;

mod alf_data;
mod lmcs_data;
mod scaling_list_data;

pub use alf_data::{AlfChromaFilters, AlfData, AlfLumaFilters, CcAlfFilters, NUM_ALF_FILTERS};
pub use lmcs_data::LmcsData;
pub use scaling_list_data::{NUM_SCALING_MATRICES, ScalingListData, ScalingMatrix, diag_scan_order, matrix_size};

/// The payload of an APS, selected by `aps_params_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApsPayload {
    Alf(AlfData),
    Lmcs(LmcsData),
    ScalingList(ScalingListData),
}

/// The Adaptation Parameter Set.
///
/// ISO/IEC 23090-3 - 7.3.2.6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aps {
    pub aps_params_type: ApsParamsType,
    /// The value ranges from \[0, 7\], or \[0, 3\] for LMCS.
    pub aps_adaptation_parameter_set_id: u8,
    pub aps_chroma_present_flag: bool,
    pub payload: ApsPayload,
}

impl Aps {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        let aps_params_type = reader.read_bits("aps_params_type", 3)?;
        range_check!(aps_params_type, 0, 2)?;
        let aps_params_type = ApsParamsType(aps_params_type as u8);

        let aps_adaptation_parameter_set_id = reader.read_bits("aps_adaptation_parameter_set_id", 5)?;
        range_check!(aps_adaptation_parameter_set_id, 0, aps_params_type.max_id())?;
        let aps_chroma_present_flag = reader.read_flag("aps_chroma_present_flag")?;

        let payload = match aps_params_type {
            ApsParamsType::AlfAps => ApsPayload::Alf(AlfData::parse(reader, aps_chroma_present_flag)?),
            ApsParamsType::LmcsAps => ApsPayload::Lmcs(LmcsData::parse(reader, aps_chroma_present_flag)?),
            _ => ApsPayload::ScalingList(ScalingListData::parse(reader, aps_chroma_present_flag)?),
        };

        if reader.read_flag("aps_extension_flag")? {
            reader.skip_extension_data("aps_extension_data_flag")?;
        }
        reader.read_rbsp_trailing_bits()?;

        Ok(Self {
            aps_params_type,
            aps_adaptation_parameter_set_id: aps_adaptation_parameter_set_id as u8,
            aps_chroma_present_flag,
            payload,
        })
    }

    pub fn alf(&self) -> Option<&AlfData> {
        match &self.payload {
            ApsPayload::Alf(alf) => Some(alf),
            _ => None,
        }
    }

    pub fn lmcs(&self) -> Option<&LmcsData> {
        match &self.payload {
            ApsPayload::Lmcs(lmcs) => Some(lmcs),
            _ => None,
        }
    }

    pub fn scaling_list(&self) -> Option<&ScalingListData> {
        match &self.payload {
            ApsPayload::ScalingList(scaling) => Some(scaling),
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::Aps;
    use crate::enums::ApsParamsType;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn lmcs_aps() {
        let mut b = RbspBuilder::new()
            .bits(1, 3) // aps_params_type
            .bits(3, 5)
            .flag(false) // aps_chroma_present_flag
            .ue(0)
            .ue(0)
            .ue(0); // one bit codeword deltas
        for _ in 0..16 {
            b = b.bits(0, 1);
        }
        let data = b.flag(false).trailing();

        let aps = Aps::parse(&mut RbspReader::new(&data)).unwrap();
        assert_eq!(aps.aps_params_type, ApsParamsType::LmcsAps);
        assert_eq!(aps.aps_adaptation_parameter_set_id, 3);
        assert_eq!(aps.lmcs().unwrap().lmcs_cw(10), [64; 16]);
        assert!(aps.alf().is_none());
    }

    #[test]
    fn lmcs_id_range() {
        let data = RbspBuilder::new().bits(1, 3).bits(4, 5).flag(false).trailing();
        assert_eq!(
            Aps::parse(&mut RbspReader::new(&data)).unwrap_err().to_string(),
            "aps_adaptation_parameter_set_id is out of range [0, 3]: 4"
        );
    }

    #[test]
    fn unknown_params_type() {
        let data = RbspBuilder::new().bits(5, 3).bits(0, 5).trailing();
        assert_eq!(
            Aps::parse(&mut RbspReader::new(&data)).unwrap_err().to_string(),
            "aps_params_type is out of range [0, 2]: 5"
        );
    }

    #[test]
    fn scaling_aps_without_chroma() {
        let mut b = RbspBuilder::new().bits(2, 3).bits(0, 5).flag(false);
        for id in (2..27).step_by(3) {
            b = b.flag(true);
            if id != 2 && id != 8 {
                b = b.ue(0);
            }
        }
        b = b.flag(true).ue(0); // id 27
        let data = b.flag(false).trailing();

        let aps = Aps::parse(&mut RbspReader::new(&data)).unwrap();
        let scaling = aps.scaling_list().unwrap();
        assert!(scaling.matrices[1].scaling_list_copy_mode_flag);
        assert_eq!(scaling.matrix_rec(1, 0, 0), 16);
    }
}
