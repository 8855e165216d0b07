use crate::enums::ApsParamsType;
use crate::error::Result;
use crate::pps::{DeblockingOffsets, Pps};
use crate::reader::RbspReader;
use crate::registry::ParameterSets;

/// ALF syntax element names, in bitstream order.
pub(crate) type AlfNames = [&'static str; 10];

pub(crate) const PH_ALF_NAMES: AlfNames = [
    "ph_alf_enabled_flag",
    "ph_num_alf_aps_ids_luma",
    "ph_alf_aps_id_luma",
    "ph_alf_cb_enabled_flag",
    "ph_alf_cr_enabled_flag",
    "ph_alf_aps_id_chroma",
    "ph_alf_cc_cb_enabled_flag",
    "ph_alf_cc_cb_aps_id",
    "ph_alf_cc_cr_enabled_flag",
    "ph_alf_cc_cr_aps_id",
];

pub(crate) const SH_ALF_NAMES: AlfNames = [
    "sh_alf_enabled_flag",
    "sh_num_alf_aps_ids_luma",
    "sh_alf_aps_id_luma",
    "sh_alf_cb_enabled_flag",
    "sh_alf_cr_enabled_flag",
    "sh_alf_aps_id_chroma",
    "sh_alf_cc_cb_enabled_flag",
    "sh_alf_cc_cb_aps_id",
    "sh_alf_cc_cr_enabled_flag",
    "sh_alf_cc_cr_aps_id",
];

/// The ALF APS selection of a picture or slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlfSelection {
    pub alf_enabled_flag: bool,
    pub alf_aps_id_luma: Vec<u8>,
    pub alf_cb_enabled_flag: bool,
    pub alf_cr_enabled_flag: bool,
    pub alf_aps_id_chroma: u8,
    pub alf_cc_cb_enabled_flag: bool,
    pub alf_cc_cb_aps_id: u8,
    pub alf_cc_cr_enabled_flag: bool,
    pub alf_cc_cr_aps_id: u8,
}

impl AlfSelection {
    pub(crate) fn parse(reader: &mut RbspReader, names: AlfNames, chroma: bool, ccalf: bool) -> Result<Self> {
        let mut alf = Self {
            alf_enabled_flag: reader.read_flag(names[0])?,
            ..Default::default()
        };
        if !alf.alf_enabled_flag {
            return Ok(alf);
        }

        let num_alf_aps_ids_luma = reader.read_bits(names[1], 3)?;
        for _ in 0..num_alf_aps_ids_luma {
            alf.alf_aps_id_luma.push(reader.read_bits(names[2], 3)? as u8);
        }
        if chroma {
            alf.alf_cb_enabled_flag = reader.read_flag(names[3])?;
            alf.alf_cr_enabled_flag = reader.read_flag(names[4])?;
        }
        if alf.alf_cb_enabled_flag || alf.alf_cr_enabled_flag {
            alf.alf_aps_id_chroma = reader.read_bits(names[5], 3)? as u8;
        }
        if ccalf {
            alf.alf_cc_cb_enabled_flag = reader.read_flag(names[6])?;
            if alf.alf_cc_cb_enabled_flag {
                alf.alf_cc_cb_aps_id = reader.read_bits(names[7], 3)? as u8;
            }
            alf.alf_cc_cr_enabled_flag = reader.read_flag(names[8])?;
            if alf.alf_cc_cr_enabled_flag {
                alf.alf_cc_cr_aps_id = reader.read_bits(names[9], 3)? as u8;
            }
        }

        Ok(alf)
    }

    /// Fails if a referenced ALF APS has not been received.
    pub fn check_references(&self, parameter_sets: &ParameterSets) -> Result<()> {
        if !self.alf_enabled_flag {
            return Ok(());
        }

        let chroma = (self.alf_cb_enabled_flag || self.alf_cr_enabled_flag).then_some(self.alf_aps_id_chroma);
        let cc_cb = self.alf_cc_cb_enabled_flag.then_some(self.alf_cc_cb_aps_id);
        let cc_cr = self.alf_cc_cr_enabled_flag.then_some(self.alf_cc_cr_aps_id);

        for id in self.alf_aps_id_luma.iter().copied().chain(chroma).chain(cc_cb).chain(cc_cr) {
            parameter_sets.aps(ApsParamsType::AlfAps, id)?;
        }
        Ok(())
    }
}

/// Deblocking syntax element names, in bitstream order.
pub(crate) type DeblockingNames = [&'static str; 8];

pub(crate) const PH_DEBLOCKING_NAMES: DeblockingNames = [
    "ph_deblocking_params_present_flag",
    "ph_deblocking_filter_disabled_flag",
    "ph_luma_beta_offset_div2",
    "ph_luma_tc_offset_div2",
    "ph_cb_beta_offset_div2",
    "ph_cb_tc_offset_div2",
    "ph_cr_beta_offset_div2",
    "ph_cr_tc_offset_div2",
];

pub(crate) const SH_DEBLOCKING_NAMES: DeblockingNames = [
    "sh_deblocking_params_present_flag",
    "sh_deblocking_filter_disabled_flag",
    "sh_luma_beta_offset_div2",
    "sh_luma_tc_offset_div2",
    "sh_cb_beta_offset_div2",
    "sh_cb_tc_offset_div2",
    "sh_cr_beta_offset_div2",
    "sh_cr_tc_offset_div2",
];

/// Deblocking control of a picture or slice, with absent values inherited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeblockingParams {
    pub deblocking_params_present_flag: bool,
    pub deblocking_filter_disabled_flag: bool,
    pub offsets: DeblockingOffsets,
}

impl DeblockingParams {
    /// The PPS values, used when the picture header does not signal its own.
    pub fn from_pps(pps: &Pps) -> Self {
        let deblocking = pps.deblocking_or_default();
        Self {
            deblocking_params_present_flag: false,
            deblocking_filter_disabled_flag: deblocking.pps_deblocking_filter_disabled_flag,
            offsets: deblocking.offsets,
        }
    }

    /// Reads the parameters when `present` is set, otherwise returns `inherited`.
    ///
    /// `inherited` holds the PPS values for a picture header and the picture header values for a
    /// slice header.
    pub(crate) fn parse(
        reader: &mut RbspReader,
        names: DeblockingNames,
        present: bool,
        pps: &Pps,
        inherited: Self,
    ) -> Result<Self> {
        let mut params = Self {
            deblocking_params_present_flag: false,
            ..inherited
        };
        if !present {
            return Ok(params);
        }

        params.deblocking_params_present_flag = reader.read_flag(names[0])?;
        if !params.deblocking_params_present_flag {
            return Ok(params);
        }

        let pps_disabled = pps.deblocking_or_default().pps_deblocking_filter_disabled_flag;
        params.deblocking_filter_disabled_flag = if !pps_disabled {
            reader.read_flag(names[1])?
        } else {
            // inferred to 0 when the PPS disables deblocking
            false
        };

        if !params.deblocking_filter_disabled_flag {
            let chroma_tool_offsets = pps.chroma_qp_offsets.is_some();
            let mut offset_names = [""; 6];
            offset_names.copy_from_slice(&names[2..]);
            params.offsets = DeblockingOffsets::parse(reader, offset_names, chroma_tool_offsets)?;
        }

        Ok(params)
    }
}
