//! Picture header structure.
//!
//! A picture header is either carried in its own `PH_NUT` NAL unit or embedded in the first slice
//! header of a picture. Many tools can be controlled from either the picture header or each slice
//! header; the PPS `*_info_in_ph_flag`s select which one carries them.

use std::sync::Arc;

use crate::NALUnitType;
use crate::enums::ApsParamsType;
use crate::error::Result;
use crate::pps::Pps;
use crate::pred_weight_table::PredWeightTable;
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::ref_pic_lists::RefPicLists;
use crate::registry::ParameterSets;
use crate::sps::{
    PH_INTER, PH_INTRA_CHROMA, PH_INTRA_LUMA, PH_VIRTUAL_BOUNDARY_NAMES, PartitionConstraints, Sps, TreeConstraints,
    VirtualBoundaries,
};
use crate::vps::Vps;

mod poc;
mod tool_params;

pub(crate) use tool_params::{PH_ALF_NAMES, PH_DEBLOCKING_NAMES, SH_ALF_NAMES, SH_DEBLOCKING_NAMES};
pub use tool_params::{AlfSelection, DeblockingParams};

/// `picture_header_structure()`.
///
/// ISO/IEC 23090-3 - 7.3.2.8
#[derive(Debug, Clone, PartialEq)]
pub struct PictureHeader {
    pub ph_gdr_or_irap_pic_flag: bool,
    pub ph_non_ref_pic_flag: bool,
    pub ph_gdr_pic_flag: bool,
    pub ph_inter_slice_allowed_flag: bool,
    /// Inferred to 1 when not present.
    pub ph_intra_slice_allowed_flag: bool,
    /// The value ranges from \[0, 63\].
    pub ph_pic_parameter_set_id: u8,
    pub ph_pic_order_cnt_lsb: u32,
    pub ph_recovery_poc_cnt: u32,
    pub ph_extra_bit: Vec<bool>,
    pub ph_poc_msb_cycle_present_flag: bool,
    pub ph_poc_msb_cycle_val: u32,
    /// Only signalled here when `pps_alf_info_in_ph_flag` is set.
    pub alf: AlfSelection,
    pub ph_lmcs_enabled_flag: bool,
    pub ph_lmcs_aps_id: u8,
    pub ph_chroma_residual_scale_flag: bool,
    pub ph_explicit_scaling_list_enabled_flag: bool,
    pub ph_scaling_list_aps_id: u8,
    pub ph_virtual_boundaries_present_flag: bool,
    /// The boundaries of the picture, taken from the SPS when it carries them.
    pub virtual_boundaries: VirtualBoundaries,
    /// Inferred to 1 when not present.
    pub ph_pic_output_flag: bool,
    pub ref_pic_lists: Option<RefPicLists>,
    pub ph_partition_constraints_override_flag: bool,
    /// The SPS constraints unless overridden.
    pub partition_constraints: PartitionConstraints,
    pub ph_cu_qp_delta_subdiv_intra_slice: u8,
    pub ph_cu_chroma_qp_offset_subdiv_intra_slice: u8,
    pub ph_cu_qp_delta_subdiv_inter_slice: u8,
    pub ph_cu_chroma_qp_offset_subdiv_inter_slice: u8,
    pub ph_temporal_mvp_enabled_flag: bool,
    /// Inferred to 1 when not present.
    pub ph_collocated_from_l0_flag: bool,
    pub ph_collocated_ref_idx: u8,
    pub ph_mmvd_fullpel_only_flag: bool,
    /// Inferred to 1 when not present.
    pub ph_mvd_l1_zero_flag: bool,
    pub ph_bdof_disabled_flag: bool,
    pub ph_dmvr_disabled_flag: bool,
    pub ph_prof_disabled_flag: bool,
    pub pred_weight_table: Option<PredWeightTable>,
    pub ph_qp_delta: i8,
    pub ph_joint_cbcr_sign_flag: bool,
    pub ph_sao_luma_enabled_flag: bool,
    pub ph_sao_chroma_enabled_flag: bool,
    /// The PPS values unless signalled here.
    pub deblocking: DeblockingParams,
    pub ph_extension_data_byte: Vec<u8>,

    /// The PPS this picture header refers to. Its SPS is `pps.sps`.
    pub pps: Arc<Pps>,
    /// `None` when `sps_video_parameter_set_id` is 0.
    pub vps: Option<Arc<Vps>>,

    // Calculated values
    pic_order_cnt_msb: i32,
    pic_order_cnt_val: i32,
}

impl PictureHeader {
    /// Parses the picture header structure and derives its picture order count.
    ///
    /// `previous` is the previous picture with `TemporalId` 0 that is not a RASL, RADL or
    /// non-reference picture.
    pub fn parse(
        reader: &mut RbspReader,
        parameter_sets: &ParameterSets,
        nal_unit_type: NALUnitType,
        previous: Option<&PictureHeader>,
    ) -> Result<Self> {
        // begin ISO/IEC 23090-3 - 7.3.2.8
        let ph_gdr_or_irap_pic_flag = reader.read_flag("ph_gdr_or_irap_pic_flag")?;
        let ph_non_ref_pic_flag = reader.read_flag("ph_non_ref_pic_flag")?;
        let ph_gdr_pic_flag = ph_gdr_or_irap_pic_flag && reader.read_flag("ph_gdr_pic_flag")?;
        let ph_inter_slice_allowed_flag = reader.read_flag("ph_inter_slice_allowed_flag")?;
        let ph_intra_slice_allowed_flag = !ph_inter_slice_allowed_flag || reader.read_flag("ph_intra_slice_allowed_flag")?;

        let ph_pic_parameter_set_id = reader.read_uev("ph_pic_parameter_set_id")?;
        range_check!(ph_pic_parameter_set_id, 0, 63)?;
        let ph_pic_parameter_set_id = ph_pic_parameter_set_id as u8;

        let pps = parameter_sets.pps(ph_pic_parameter_set_id)?;
        let sps = pps.sps.clone();
        let vps = match sps.sps_video_parameter_set_id {
            0 => None,
            id => Some(parameter_sets.vps(id)?),
        };

        if ph_gdr_pic_flag {
            range_check!(ph_gdr_pic_flag, 0, sps.sps_gdr_enabled_flag)?;
        }

        let ph_pic_order_cnt_lsb =
            reader.read_bits("ph_pic_order_cnt_lsb", sps.log2_max_pic_order_cnt_lsb() as u32)? as u32;

        let mut ph_recovery_poc_cnt = 0;
        if ph_gdr_pic_flag {
            let recovery = reader.read_uev("ph_recovery_poc_cnt")?;
            range_check!("ph_recovery_poc_cnt", recovery, 0, sps.max_pic_order_cnt_lsb() - 1)?;
            ph_recovery_poc_cnt = recovery as u32;
        }

        let ph_extra_bit = (0..sps.num_extra_ph_bits())
            .map(|_| reader.read_flag("ph_extra_bit"))
            .collect::<Result<Vec<_>>>()?;

        let mut ph_poc_msb_cycle_present_flag = false;
        let mut ph_poc_msb_cycle_val = 0;
        if sps.sps_poc_msb_cycle_flag {
            ph_poc_msb_cycle_present_flag = reader.read_flag("ph_poc_msb_cycle_present_flag")?;
            if ph_poc_msb_cycle_present_flag {
                ph_poc_msb_cycle_val =
                    reader.read_bits("ph_poc_msb_cycle_val", sps.sps_poc_msb_cycle_len_minus1 as u32 + 1)? as u32;
            }
        }

        let chroma = sps.chroma_array_type() != 0;
        let alf = if sps.sps_alf_enabled_flag && pps.pps_alf_info_in_ph_flag {
            AlfSelection::parse(reader, PH_ALF_NAMES, chroma, sps.sps_ccalf_enabled_flag)?
        } else {
            AlfSelection::default()
        };

        let mut ph_lmcs_enabled_flag = false;
        let mut ph_lmcs_aps_id = 0;
        let mut ph_chroma_residual_scale_flag = false;
        if sps.sps_lmcs_enabled_flag {
            ph_lmcs_enabled_flag = reader.read_flag("ph_lmcs_enabled_flag")?;
            if ph_lmcs_enabled_flag {
                ph_lmcs_aps_id = reader.read_bits("ph_lmcs_aps_id", 2)? as u8;
                if chroma {
                    ph_chroma_residual_scale_flag = reader.read_flag("ph_chroma_residual_scale_flag")?;
                }
            }
        }

        let mut ph_explicit_scaling_list_enabled_flag = false;
        let mut ph_scaling_list_aps_id = 0;
        if sps.sps_explicit_scaling_list_enabled_flag {
            ph_explicit_scaling_list_enabled_flag = reader.read_flag("ph_explicit_scaling_list_enabled_flag")?;
            if ph_explicit_scaling_list_enabled_flag {
                ph_scaling_list_aps_id = reader.read_bits("ph_scaling_list_aps_id", 3)? as u8;
            }
        }

        let mut ph_virtual_boundaries_present_flag = false;
        let mut virtual_boundaries = VirtualBoundaries::default();
        if sps.sps_virtual_boundaries_enabled_flag && !sps.sps_virtual_boundaries_present_flag {
            ph_virtual_boundaries_present_flag = reader.read_flag("ph_virtual_boundaries_present_flag")?;
            if ph_virtual_boundaries_present_flag {
                virtual_boundaries = VirtualBoundaries::parse(
                    reader,
                    PH_VIRTUAL_BOUNDARY_NAMES,
                    pps.pps_pic_width_in_luma_samples,
                    pps.pps_pic_height_in_luma_samples,
                )?;
            }
        } else if sps.sps_virtual_boundaries_present_flag {
            virtual_boundaries = sps.virtual_boundaries.clone();
        }

        let ph_pic_output_flag =
            !pps.pps_output_flag_present_flag || ph_non_ref_pic_flag || reader.read_flag("ph_pic_output_flag")?;

        let ref_pic_lists = pps
            .pps_rpl_info_in_ph_flag
            .then(|| RefPicLists::parse(reader, &sps, pps.pps_rpl1_idx_present_flag))
            .transpose()?;

        let ph_partition_constraints_override_flag = sps.sps_partition_constraints_override_enabled_flag
            && reader.read_flag("ph_partition_constraints_override_flag")?;

        let ctb_log2_size_y = sps.ctb_log2_size_y();
        let min_cb_log2_size_y = sps.min_cb_log2_size_y();
        let mut partition_constraints = sps.partition_constraints;
        let pps_cu_chroma_qp_offset_list_enabled_flag = pps
            .chroma_qp_offsets
            .as_ref()
            .is_some_and(|c| c.pps_cu_chroma_qp_offset_list_enabled_flag);

        let mut ph_cu_qp_delta_subdiv_intra_slice = 0;
        let mut ph_cu_chroma_qp_offset_subdiv_intra_slice = 0;
        if ph_intra_slice_allowed_flag {
            if ph_partition_constraints_override_flag {
                partition_constraints.intra_luma =
                    TreeConstraints::parse(reader, PH_INTRA_LUMA, ctb_log2_size_y, min_cb_log2_size_y)?;
                if sps.sps_qtbtt_dual_tree_intra_flag {
                    partition_constraints.intra_chroma =
                        TreeConstraints::parse(reader, PH_INTRA_CHROMA, ctb_log2_size_y, min_cb_log2_size_y)?;
                }
            }

            let max_subdiv = max_cu_subdiv(&sps, &partition_constraints.intra_luma);
            if pps.pps_cu_qp_delta_enabled_flag {
                ph_cu_qp_delta_subdiv_intra_slice =
                    read_subdiv(reader, "ph_cu_qp_delta_subdiv_intra_slice", max_subdiv)?;
            }
            if pps_cu_chroma_qp_offset_list_enabled_flag {
                ph_cu_chroma_qp_offset_subdiv_intra_slice =
                    read_subdiv(reader, "ph_cu_chroma_qp_offset_subdiv_intra_slice", max_subdiv)?;
            }
        }

        let mut ph_cu_qp_delta_subdiv_inter_slice = 0;
        let mut ph_cu_chroma_qp_offset_subdiv_inter_slice = 0;
        let mut ph_temporal_mvp_enabled_flag = false;
        let mut ph_collocated_from_l0_flag = true;
        let mut ph_collocated_ref_idx = 0;
        let mut ph_mmvd_fullpel_only_flag = false;
        let mut ph_mvd_l1_zero_flag = true;
        let mut ph_bdof_disabled_flag =
            sps.sps_bdof_control_present_in_ph_flag || !sps.sps_bdof_enabled_flag;
        let mut ph_dmvr_disabled_flag =
            sps.sps_dmvr_control_present_in_ph_flag || !sps.sps_dmvr_enabled_flag;
        let mut ph_prof_disabled_flag = !sps.sps_affine_prof_enabled_flag;
        let mut pred_weight_table = None;

        if ph_inter_slice_allowed_flag {
            if ph_partition_constraints_override_flag {
                partition_constraints.inter =
                    TreeConstraints::parse(reader, PH_INTER, ctb_log2_size_y, min_cb_log2_size_y)?;
            }

            let max_subdiv = max_cu_subdiv(&sps, &partition_constraints.inter);
            if pps.pps_cu_qp_delta_enabled_flag {
                ph_cu_qp_delta_subdiv_inter_slice =
                    read_subdiv(reader, "ph_cu_qp_delta_subdiv_inter_slice", max_subdiv)?;
            }
            if pps_cu_chroma_qp_offset_list_enabled_flag {
                ph_cu_chroma_qp_offset_subdiv_inter_slice =
                    read_subdiv(reader, "ph_cu_chroma_qp_offset_subdiv_inter_slice", max_subdiv)?;
            }

            let num_entries = |i: usize| ref_pic_lists.as_ref().map_or(0, |r| r.lists[i].num_ref_entries());

            if sps.sps_temporal_mvp_enabled_flag {
                ph_temporal_mvp_enabled_flag = reader.read_flag("ph_temporal_mvp_enabled_flag")?;
                if ph_temporal_mvp_enabled_flag && pps.pps_rpl_info_in_ph_flag {
                    if num_entries(1) > 0 {
                        ph_collocated_from_l0_flag = reader.read_flag("ph_collocated_from_l0_flag")?;
                    }
                    let list = if ph_collocated_from_l0_flag { 0 } else { 1 };
                    if num_entries(list) > 1 {
                        let idx = reader.read_uev("ph_collocated_ref_idx")?;
                        range_check!("ph_collocated_ref_idx", idx, 0, num_entries(list) - 1)?;
                        ph_collocated_ref_idx = idx as u8;
                    }
                }
            }

            if sps.sps_mmvd_fullpel_only_enabled_flag {
                ph_mmvd_fullpel_only_flag = reader.read_flag("ph_mmvd_fullpel_only_flag")?;
            }

            if !pps.pps_rpl_info_in_ph_flag || num_entries(1) > 0 {
                ph_mvd_l1_zero_flag = reader.read_flag("ph_mvd_l1_zero_flag")?;
                if sps.sps_bdof_control_present_in_ph_flag {
                    ph_bdof_disabled_flag = reader.read_flag("ph_bdof_disabled_flag")?;
                }
                if sps.sps_dmvr_control_present_in_ph_flag {
                    ph_dmvr_disabled_flag = reader.read_flag("ph_dmvr_disabled_flag")?;
                }
            }

            if sps.sps_prof_control_present_in_ph_flag {
                ph_prof_disabled_flag = reader.read_flag("ph_prof_disabled_flag")?;
            }

            if (pps.pps_weighted_pred_flag || pps.pps_weighted_bipred_flag) && pps.pps_wp_info_in_ph_flag {
                if let Some(ref_pic_lists) = &ref_pic_lists {
                    pred_weight_table = Some(PredWeightTable::parse(reader, &sps, &pps, ref_pic_lists, [0; 2])?);
                }
            }
        }

        let mut ph_qp_delta = 0;
        if pps.pps_qp_delta_info_in_ph_flag {
            let qp_delta = reader.read_sev("ph_qp_delta")?;
            let slice_qp_y = 26 + pps.pps_init_qp_minus26 as i64 + qp_delta;
            range_check!("SliceQpY", slice_qp_y, -sps.qp_bd_offset(), 63)?;
            ph_qp_delta = qp_delta as i8;
        }

        let ph_joint_cbcr_sign_flag = sps.sps_joint_cbcr_enabled_flag && reader.read_flag("ph_joint_cbcr_sign_flag")?;

        let mut ph_sao_luma_enabled_flag = false;
        let mut ph_sao_chroma_enabled_flag = false;
        if sps.sps_sao_enabled_flag && pps.pps_sao_info_in_ph_flag {
            ph_sao_luma_enabled_flag = reader.read_flag("ph_sao_luma_enabled_flag")?;
            if chroma {
                ph_sao_chroma_enabled_flag = reader.read_flag("ph_sao_chroma_enabled_flag")?;
            }
        }

        let dbf_info_in_ph = pps.deblocking.is_some_and(|d| d.pps_dbf_info_in_ph_flag);
        let deblocking = DeblockingParams::parse(
            reader,
            PH_DEBLOCKING_NAMES,
            dbf_info_in_ph,
            &pps,
            DeblockingParams::from_pps(&pps),
        )?;

        let mut ph_extension_data_byte = Vec::new();
        if pps.pps_picture_header_extension_present_flag {
            let ph_extension_length = reader.read_uev("ph_extension_length")?;
            range_check!(ph_extension_length, 0, 256)?;
            for _ in 0..ph_extension_length {
                ph_extension_data_byte.push(reader.read_bits("ph_extension_data_byte", 8)? as u8);
            }
        }

        let mut ph = Self {
            ph_gdr_or_irap_pic_flag,
            ph_non_ref_pic_flag,
            ph_gdr_pic_flag,
            ph_inter_slice_allowed_flag,
            ph_intra_slice_allowed_flag,
            ph_pic_parameter_set_id,
            ph_pic_order_cnt_lsb,
            ph_recovery_poc_cnt,
            ph_extra_bit,
            ph_poc_msb_cycle_present_flag,
            ph_poc_msb_cycle_val,
            alf,
            ph_lmcs_enabled_flag,
            ph_lmcs_aps_id,
            ph_chroma_residual_scale_flag,
            ph_explicit_scaling_list_enabled_flag,
            ph_scaling_list_aps_id,
            ph_virtual_boundaries_present_flag,
            virtual_boundaries,
            ph_pic_output_flag,
            ref_pic_lists,
            ph_partition_constraints_override_flag,
            partition_constraints,
            ph_cu_qp_delta_subdiv_intra_slice,
            ph_cu_chroma_qp_offset_subdiv_intra_slice,
            ph_cu_qp_delta_subdiv_inter_slice,
            ph_cu_chroma_qp_offset_subdiv_inter_slice,
            ph_temporal_mvp_enabled_flag,
            ph_collocated_from_l0_flag,
            ph_collocated_ref_idx,
            ph_mmvd_fullpel_only_flag,
            ph_mvd_l1_zero_flag,
            ph_bdof_disabled_flag,
            ph_dmvr_disabled_flag,
            ph_prof_disabled_flag,
            pred_weight_table,
            ph_qp_delta,
            ph_joint_cbcr_sign_flag,
            ph_sao_luma_enabled_flag,
            ph_sao_chroma_enabled_flag,
            deblocking,
            ph_extension_data_byte,
            pps,
            vps,
            pic_order_cnt_msb: 0,
            pic_order_cnt_val: 0,
        };
        ph.calculate_picture_order_count(nal_unit_type, previous)?;

        Ok(ph)
    }

    #[inline]
    pub fn sps(&self) -> &Arc<Sps> {
        &self.pps.sps
    }

    /// Fails if an APS referenced by the picture header has not been received.
    pub fn check_aps_references(&self, parameter_sets: &ParameterSets) -> Result<()> {
        self.alf.check_references(parameter_sets)?;
        if self.ph_lmcs_enabled_flag {
            parameter_sets.aps(ApsParamsType::LmcsAps, self.ph_lmcs_aps_id)?;
        }
        if self.ph_explicit_scaling_list_enabled_flag {
            parameter_sets.aps(ApsParamsType::ScalingAps, self.ph_scaling_list_aps_id)?;
        }
        Ok(())
    }
}

/// The largest `cu_qp_delta_subdiv` and `cu_chroma_qp_offset_subdiv` for a tree.
fn max_cu_subdiv(sps: &Sps, tree: &TreeConstraints) -> i64 {
    let min_qt_log2_size = tree.min_qt_log2_size(sps.min_cb_log2_size_y()) as i64;
    2 * (sps.ctb_log2_size_y() as i64 - min_qt_log2_size + tree.max_mtt_hierarchy_depth as i64)
}

fn read_subdiv(reader: &mut RbspReader, name: &'static str, max: i64) -> Result<u8> {
    let value = reader.read_uev(name)?;
    crate::range_check::check(name, value as i64, 0, max)?;
    Ok(value as u8)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::PictureHeader;
    use crate::NALUnitType;
    use crate::reader::RbspReader;
    use crate::registry::ParameterSets;
    use crate::test_util::{RbspBuilder, TestPps, TestSps, TestTiles, parameter_sets};

    fn default_sets() -> ParameterSets {
        parameter_sets(
            TestSps::default(),
            TestPps {
                width: 1920,
                height: 1088,
                ..Default::default()
            },
        )
    }

    /// An intra-only picture header for the default test parameter sets.
    fn intra_ph(poc_lsb: u64) -> Vec<u8> {
        RbspBuilder::new()
            .flag(true) // ph_gdr_or_irap_pic_flag
            .flag(false) // ph_non_ref_pic_flag
            .flag(false) // ph_gdr_pic_flag
            .flag(false) // ph_inter_slice_allowed_flag
            .ue(0) // ph_pic_parameter_set_id
            .bits(poc_lsb, 4)
            .trailing()
    }

    #[test]
    fn intra_picture_inferences() {
        let sets = default_sets();
        let data = intra_ph(0);
        let ph = PictureHeader::parse(&mut RbspReader::new(&data), &sets, NALUnitType::IdrWRadl, None).unwrap();

        assert!(ph.ph_intra_slice_allowed_flag);
        assert!(ph.ph_pic_output_flag);
        assert!(ph.ph_mvd_l1_zero_flag);
        assert!(ph.ph_collocated_from_l0_flag);
        assert!(ph.ph_bdof_disabled_flag);
        assert!(ph.ph_prof_disabled_flag);
        assert!(!ph.alf.alf_enabled_flag);
        assert!(ph.ref_pic_lists.is_none());
        assert_eq!(ph.partition_constraints, ph.sps().partition_constraints);
        assert!(!ph.deblocking.deblocking_filter_disabled_flag);
        assert_eq!(ph.pic_order_cnt_val(), 0);
        assert!(ph.vps.is_none());
    }

    #[test]
    fn unknown_pps() {
        let sets = ParameterSets::new();
        let data = intra_ph(0);
        assert_eq!(
            PictureHeader::parse(&mut RbspReader::new(&data), &sets, NALUnitType::PhNut, None)
                .unwrap_err()
                .to_string(),
            "PPS with id 0 not found"
        );
    }

    #[test]
    fn rpl_in_picture_header() {
        let sets = parameter_sets(
            TestSps {
                rpl_templates: vec![vec![-1], vec![-2, -4]],
                temporal_mvp: true,
                ..Default::default()
            },
            TestPps {
                width: 1920,
                height: 1088,
                tiles: Some(TestTiles {
                    column_widths_minus1: vec![7],
                    row_heights_minus1: vec![8],
                    rect_slices: None,
                }),
                rpl_info_in_ph: true,
                ..Default::default()
            },
        );

        let data = RbspBuilder::new()
            .flag(false) // ph_gdr_or_irap_pic_flag
            .flag(false) // ph_non_ref_pic_flag
            .flag(true) // ph_inter_slice_allowed_flag
            .flag(true) // ph_intra_slice_allowed_flag
            .ue(0)
            .bits(6, 4) // ph_pic_order_cnt_lsb
            .flag(true) // rpl_sps_flag[0]
            .bits(1, 1) // rpl_idx[0]
            .flag(true) // ph_temporal_mvp_enabled_flag
            .flag(false) // ph_collocated_from_l0_flag
            .ue(1) // ph_collocated_ref_idx
            .flag(false) // ph_mvd_l1_zero_flag
            .trailing();

        let previous_data = intra_ph(0);
        let previous =
            PictureHeader::parse(&mut RbspReader::new(&previous_data), &sets, NALUnitType::IdrNLp, None).unwrap();
        let ph =
            PictureHeader::parse(&mut RbspReader::new(&data), &sets, NALUnitType::TrailNut, Some(&previous)).unwrap();

        let lists = ph.ref_pic_lists.as_ref().unwrap();
        assert_eq!(lists.lists[0].rpl_idx, 1);
        assert_eq!(lists.lists[1].rpl_idx, 1);
        assert_eq!(lists.lists[1].ref_pic_list_struct.short_term_poc_offsets(), [-2, -4]);
        assert!(ph.ph_temporal_mvp_enabled_flag);
        assert!(!ph.ph_collocated_from_l0_flag);
        assert_eq!(ph.ph_collocated_ref_idx, 1);
        assert!(!ph.ph_mvd_l1_zero_flag);
        assert_eq!(ph.pic_order_cnt_val(), 6);
    }
}
