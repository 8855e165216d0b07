//! Sequence parameter set.

use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::ref_pic_lists::{RefPicListStruct, RplContext};

mod chroma_qp_table;
mod conformance_window;
mod dpb_parameters;
mod general_constraints_info;
mod partition_constraints;
mod profile_tier_level;
mod subpic_info;
mod timing_hrd;
mod virtual_boundaries;
mod vui_parameters;

pub use chroma_qp_table::ChromaQpMapping;
pub use conformance_window::{ConformanceWindow, ScalingWindow};
pub use dpb_parameters::DpbParameters;
pub use general_constraints_info::{GciFlags, GeneralConstraintsInfo};
pub(crate) use partition_constraints::{PH_INTER, PH_INTRA_CHROMA, PH_INTRA_LUMA};
use partition_constraints::{SPS_INTER, SPS_INTRA_CHROMA, SPS_INTRA_LUMA};
pub use partition_constraints::{PartitionConstraints, TreeConstraints};
pub use profile_tier_level::ProfileTierLevel;
pub use subpic_info::{SubpicInfo, SubpicLayout};
pub use timing_hrd::{
    CpbSpec, GeneralTimingHrdParameters, OlsTimingHrdParameters, SublayerHrdParameters, SublayerTiming,
};
pub(crate) use virtual_boundaries::PH_NAMES as PH_VIRTUAL_BOUNDARY_NAMES;
pub use virtual_boundaries::VirtualBoundaries;
pub use vui_parameters::{AspectRatioInfo, ChromaLocInfo, ColourDescription, VuiParameters};

/// Timing and HRD info of the SPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpsTimingHrd {
    pub general: GeneralTimingHrdParameters,
    pub sps_sublayer_cpb_params_present_flag: bool,
    pub ols: OlsTimingHrdParameters,
}

/// Luma-adaptive deblocking filter intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadfParameters {
    pub sps_ladf_lowest_interval_qp_offset: i32,
    pub sps_ladf_qp_offset: Vec<i32>,
    pub sps_ladf_delta_threshold_minus1: Vec<u32>,
}

/// `sps_range_extension()`.
///
/// ISO/IEC 23090-3 - 7.3.2.22
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpsRangeExtension {
    pub sps_extended_precision_flag: bool,
    pub sps_ts_residual_coding_rice_present_in_sh_flag: bool,
    pub sps_rrc_rice_extension_flag: bool,
    pub sps_persistent_rice_adaptation_enabled_flag: bool,
    pub sps_reverse_last_sig_coeff_enabled_flag: bool,
}

/// The Sequence Parameter Set.
///
/// ISO/IEC 23090-3 - 7.3.2.4
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    pub sps_seq_parameter_set_id: u8,
    /// `0` when the SPS does not refer to a VPS.
    pub sps_video_parameter_set_id: u8,
    /// The value ranges from \[0, 6\].
    pub sps_max_sublayers_minus1: u8,
    /// `0` is monochrome, `1` is 4:2:0, `2` is 4:2:2 and `3` is 4:4:4.
    pub sps_chroma_format_idc: u8,
    /// The value ranges from \[0, 2\], giving CTUs of 32, 64 or 128 luma samples.
    pub sps_log2_ctu_size_minus5: u8,
    pub sps_ptl_dpb_hrd_params_present_flag: bool,
    pub profile_tier_level: Option<ProfileTierLevel>,
    pub sps_gdr_enabled_flag: bool,
    pub sps_ref_pic_resampling_enabled_flag: bool,
    pub sps_res_change_in_clvs_allowed_flag: bool,
    pub sps_pic_width_max_in_luma_samples: u32,
    pub sps_pic_height_max_in_luma_samples: u32,
    pub conformance_window: ConformanceWindow,
    pub subpic_info: SubpicInfo,
    /// The value ranges from \[0, 8\].
    pub sps_bitdepth_minus8: u8,
    pub sps_entropy_coding_sync_enabled_flag: bool,
    pub sps_entry_point_offsets_present_flag: bool,
    pub sps_log2_max_pic_order_cnt_lsb_minus4: u8,
    pub sps_poc_msb_cycle_flag: bool,
    pub sps_poc_msb_cycle_len_minus1: u8,
    pub sps_extra_ph_bit_present_flag: Vec<bool>,
    pub sps_extra_sh_bit_present_flag: Vec<bool>,
    pub sps_sublayer_dpb_params_flag: bool,
    pub dpb_parameters: Option<DpbParameters>,
    pub sps_log2_min_luma_coding_block_size_minus2: u8,
    pub sps_partition_constraints_override_enabled_flag: bool,
    pub sps_qtbtt_dual_tree_intra_flag: bool,
    pub partition_constraints: PartitionConstraints,
    pub sps_max_luma_transform_size_64_flag: bool,
    pub sps_transform_skip_enabled_flag: bool,
    pub sps_log2_transform_skip_max_size_minus2: u8,
    pub sps_bdpcm_enabled_flag: bool,
    pub sps_mts_enabled_flag: bool,
    pub sps_explicit_mts_intra_enabled_flag: bool,
    pub sps_explicit_mts_inter_enabled_flag: bool,
    pub sps_lfnst_enabled_flag: bool,
    pub sps_joint_cbcr_enabled_flag: bool,
    pub sps_same_qp_table_for_chroma_flag: bool,
    /// One table when `sps_same_qp_table_for_chroma_flag` is set, otherwise Cb, Cr and (with joint
    /// CbCr) the joint table.
    pub chroma_qp_tables: Vec<ChromaQpMapping>,
    pub sps_sao_enabled_flag: bool,
    pub sps_alf_enabled_flag: bool,
    pub sps_ccalf_enabled_flag: bool,
    pub sps_lmcs_enabled_flag: bool,
    pub sps_weighted_pred_flag: bool,
    pub sps_weighted_bipred_flag: bool,
    pub sps_long_term_ref_pics_flag: bool,
    pub sps_inter_layer_prediction_enabled_flag: bool,
    pub sps_idr_rpl_present_flag: bool,
    pub sps_rpl1_same_as_rpl0_flag: bool,
    /// The `ref_pic_list_struct(i, j)` templates of list 0 and list 1.
    pub ref_pic_list_structs: [Vec<RefPicListStruct>; 2],
    pub sps_ref_wraparound_enabled_flag: bool,
    pub sps_temporal_mvp_enabled_flag: bool,
    pub sps_sbtmvp_enabled_flag: bool,
    pub sps_amvr_enabled_flag: bool,
    pub sps_bdof_enabled_flag: bool,
    pub sps_bdof_control_present_in_ph_flag: bool,
    pub sps_smvd_enabled_flag: bool,
    pub sps_dmvr_enabled_flag: bool,
    pub sps_dmvr_control_present_in_ph_flag: bool,
    pub sps_mmvd_enabled_flag: bool,
    pub sps_mmvd_fullpel_only_enabled_flag: bool,
    pub sps_six_minus_max_num_merge_cand: u8,
    pub sps_sbt_enabled_flag: bool,
    pub sps_affine_enabled_flag: bool,
    pub sps_five_minus_max_num_subblock_merge_cand: u8,
    pub sps_6param_affine_enabled_flag: bool,
    pub sps_affine_amvr_enabled_flag: bool,
    pub sps_affine_prof_enabled_flag: bool,
    pub sps_prof_control_present_in_ph_flag: bool,
    pub sps_bcw_enabled_flag: bool,
    pub sps_ciip_enabled_flag: bool,
    pub sps_gpm_enabled_flag: bool,
    pub sps_max_num_merge_cand_minus_max_num_gpm_cand: u8,
    pub sps_log2_parallel_merge_level_minus2: u8,
    pub sps_isp_enabled_flag: bool,
    pub sps_mrl_enabled_flag: bool,
    pub sps_mip_enabled_flag: bool,
    pub sps_cclm_enabled_flag: bool,
    pub sps_chroma_horizontal_collocated_flag: bool,
    pub sps_chroma_vertical_collocated_flag: bool,
    pub sps_palette_enabled_flag: bool,
    pub sps_act_enabled_flag: bool,
    pub sps_min_qp_prime_ts: u8,
    pub sps_ibc_enabled_flag: bool,
    pub sps_six_minus_max_num_ibc_merge_cand: u8,
    pub ladf: Option<LadfParameters>,
    pub sps_explicit_scaling_list_enabled_flag: bool,
    pub sps_scaling_matrix_for_lfnst_disabled_flag: bool,
    pub sps_scaling_matrix_for_alternative_colour_space_disabled_flag: bool,
    pub sps_scaling_matrix_designated_colour_space_flag: bool,
    pub sps_dep_quant_enabled_flag: bool,
    pub sps_sign_data_hiding_enabled_flag: bool,
    pub sps_virtual_boundaries_enabled_flag: bool,
    pub sps_virtual_boundaries_present_flag: bool,
    pub virtual_boundaries: VirtualBoundaries,
    pub timing_hrd: Option<SpsTimingHrd>,
    pub sps_field_seq_flag: bool,
    pub vui_parameters: Option<VuiParameters>,
    pub range_extension: SpsRangeExtension,

    // Calculated values
    ctb_log2_size_y: u8,
    min_cb_log2_size_y: u8,
}

impl Sps {
    /// Parses the SPS RBSP. The reader must be positioned after the NAL unit header.
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        // begin ISO/IEC 23090-3 - 7.3.2.4
        // semantics in ISO/IEC 23090-3 - 7.4.3.4
        let sps_seq_parameter_set_id = reader.read_bits("sps_seq_parameter_set_id", 4)? as u8;
        let sps_video_parameter_set_id = reader.read_bits("sps_video_parameter_set_id", 4)? as u8;

        let sps_max_sublayers_minus1 = reader.read_bits("sps_max_sublayers_minus1", 3)? as u8;
        range_check!(sps_max_sublayers_minus1, 0, 6)?;

        let sps_chroma_format_idc = reader.read_bits("sps_chroma_format_idc", 2)? as u8;

        let sps_log2_ctu_size_minus5 = reader.read_bits("sps_log2_ctu_size_minus5", 2)? as u8;
        range_check!(sps_log2_ctu_size_minus5, 0, 2)?;
        let ctb_log2_size_y = sps_log2_ctu_size_minus5 + 5;
        let ctb_size_y = 1u32 << ctb_log2_size_y;

        let sps_ptl_dpb_hrd_params_present_flag = reader.read_flag("sps_ptl_dpb_hrd_params_present_flag")?;
        let profile_tier_level = sps_ptl_dpb_hrd_params_present_flag
            .then(|| ProfileTierLevel::parse(reader, true, sps_max_sublayers_minus1))
            .transpose()?;

        let sps_gdr_enabled_flag = reader.read_flag("sps_gdr_enabled_flag")?;
        let sps_ref_pic_resampling_enabled_flag = reader.read_flag("sps_ref_pic_resampling_enabled_flag")?;
        let sps_res_change_in_clvs_allowed_flag =
            sps_ref_pic_resampling_enabled_flag && reader.read_flag("sps_res_change_in_clvs_allowed_flag")?;

        let sps_pic_width_max_in_luma_samples = reader.read_uev("sps_pic_width_max_in_luma_samples")?;
        range_check!(sps_pic_width_max_in_luma_samples, 1, u32::MAX)?;
        let sps_pic_width_max_in_luma_samples = sps_pic_width_max_in_luma_samples as u32;
        let sps_pic_height_max_in_luma_samples = reader.read_uev("sps_pic_height_max_in_luma_samples")?;
        range_check!(sps_pic_height_max_in_luma_samples, 1, u32::MAX)?;
        let sps_pic_height_max_in_luma_samples = sps_pic_height_max_in_luma_samples as u32;

        let conformance_window = if reader.read_flag("sps_conformance_window_flag")? {
            ConformanceWindow::parse(
                reader,
                [
                    "sps_conf_win_left_offset",
                    "sps_conf_win_right_offset",
                    "sps_conf_win_top_offset",
                    "sps_conf_win_bottom_offset",
                ],
            )?
        } else {
            ConformanceWindow::default()
        };

        let sps_subpic_info_present_flag = reader.read_flag("sps_subpic_info_present_flag")?;
        let subpic_info = if sps_subpic_info_present_flag {
            SubpicInfo::parse(
                reader,
                sps_pic_width_max_in_luma_samples,
                sps_pic_height_max_in_luma_samples,
                ctb_log2_size_y,
            )?
        } else {
            SubpicInfo::single(
                sps_pic_width_max_in_luma_samples.div_ceil(ctb_size_y),
                sps_pic_height_max_in_luma_samples.div_ceil(ctb_size_y),
            )
        };

        let sps_bitdepth_minus8 = reader.read_uev("sps_bitdepth_minus8")?;
        range_check!(sps_bitdepth_minus8, 0, 8)?;
        let sps_bitdepth_minus8 = sps_bitdepth_minus8 as u8;
        let qp_bd_offset = 6 * sps_bitdepth_minus8 as i32;

        let sps_entropy_coding_sync_enabled_flag = reader.read_flag("sps_entropy_coding_sync_enabled_flag")?;
        let sps_entry_point_offsets_present_flag = reader.read_flag("sps_entry_point_offsets_present_flag")?;

        let sps_log2_max_pic_order_cnt_lsb_minus4 = reader.read_bits("sps_log2_max_pic_order_cnt_lsb_minus4", 4)? as u8;
        range_check!(sps_log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;

        let sps_poc_msb_cycle_flag = reader.read_flag("sps_poc_msb_cycle_flag")?;
        let mut sps_poc_msb_cycle_len_minus1 = 0;
        if sps_poc_msb_cycle_flag {
            let len_minus1 = reader.read_uev("sps_poc_msb_cycle_len_minus1")?;
            range_check!(len_minus1, 0, 32 - sps_log2_max_pic_order_cnt_lsb_minus4 as u64 - 5)?;
            sps_poc_msb_cycle_len_minus1 = len_minus1 as u8;
        }

        let sps_num_extra_ph_bytes = reader.read_bits("sps_num_extra_ph_bytes", 2)?;
        let sps_extra_ph_bit_present_flag = (0..sps_num_extra_ph_bytes * 8)
            .map(|_| reader.read_flag("sps_extra_ph_bit_present_flag"))
            .collect::<Result<Vec<_>>>()?;
        let sps_num_extra_sh_bytes = reader.read_bits("sps_num_extra_sh_bytes", 2)?;
        let sps_extra_sh_bit_present_flag = (0..sps_num_extra_sh_bytes * 8)
            .map(|_| reader.read_flag("sps_extra_sh_bit_present_flag"))
            .collect::<Result<Vec<_>>>()?;

        let mut sps_sublayer_dpb_params_flag = false;
        let mut dpb_parameters = None;
        if sps_ptl_dpb_hrd_params_present_flag {
            if sps_max_sublayers_minus1 > 0 {
                sps_sublayer_dpb_params_flag = reader.read_flag("sps_sublayer_dpb_params_flag")?;
            }
            dpb_parameters = Some(DpbParameters::parse(
                reader,
                sps_max_sublayers_minus1,
                sps_sublayer_dpb_params_flag,
            )?);
        }

        let sps_log2_min_luma_coding_block_size_minus2 = reader.read_uev("sps_log2_min_luma_coding_block_size_minus2")?;
        range_check!(
            sps_log2_min_luma_coding_block_size_minus2,
            0,
            (sps_log2_ctu_size_minus5 + 3).min(4)
        )?;
        let sps_log2_min_luma_coding_block_size_minus2 = sps_log2_min_luma_coding_block_size_minus2 as u8;
        let min_cb_log2_size_y = sps_log2_min_luma_coding_block_size_minus2 + 2;

        let sps_partition_constraints_override_enabled_flag =
            reader.read_flag("sps_partition_constraints_override_enabled_flag")?;
        let mut partition_constraints = PartitionConstraints {
            intra_luma: TreeConstraints::parse(reader, SPS_INTRA_LUMA, ctb_log2_size_y, min_cb_log2_size_y)?,
            ..Default::default()
        };
        let sps_qtbtt_dual_tree_intra_flag =
            sps_chroma_format_idc != 0 && reader.read_flag("sps_qtbtt_dual_tree_intra_flag")?;
        if sps_qtbtt_dual_tree_intra_flag {
            partition_constraints.intra_chroma =
                TreeConstraints::parse(reader, SPS_INTRA_CHROMA, ctb_log2_size_y, min_cb_log2_size_y)?;
        }
        partition_constraints.inter = TreeConstraints::parse(reader, SPS_INTER, ctb_log2_size_y, min_cb_log2_size_y)?;

        let sps_max_luma_transform_size_64_flag =
            ctb_size_y > 32 && reader.read_flag("sps_max_luma_transform_size_64_flag")?;

        let sps_transform_skip_enabled_flag = reader.read_flag("sps_transform_skip_enabled_flag")?;
        let mut sps_log2_transform_skip_max_size_minus2 = 0;
        let mut sps_bdpcm_enabled_flag = false;
        if sps_transform_skip_enabled_flag {
            let max_size_minus2 = reader.read_uev("sps_log2_transform_skip_max_size_minus2")?;
            range_check!(max_size_minus2, 0, 3)?;
            sps_log2_transform_skip_max_size_minus2 = max_size_minus2 as u8;
            sps_bdpcm_enabled_flag = reader.read_flag("sps_bdpcm_enabled_flag")?;
        }

        let sps_mts_enabled_flag = reader.read_flag("sps_mts_enabled_flag")?;
        let mut sps_explicit_mts_intra_enabled_flag = false;
        let mut sps_explicit_mts_inter_enabled_flag = false;
        if sps_mts_enabled_flag {
            sps_explicit_mts_intra_enabled_flag = reader.read_flag("sps_explicit_mts_intra_enabled_flag")?;
            sps_explicit_mts_inter_enabled_flag = reader.read_flag("sps_explicit_mts_inter_enabled_flag")?;
        }

        let sps_lfnst_enabled_flag = reader.read_flag("sps_lfnst_enabled_flag")?;

        let mut sps_joint_cbcr_enabled_flag = false;
        let mut sps_same_qp_table_for_chroma_flag = false;
        let mut chroma_qp_tables = Vec::new();
        if sps_chroma_format_idc != 0 {
            sps_joint_cbcr_enabled_flag = reader.read_flag("sps_joint_cbcr_enabled_flag")?;
            sps_same_qp_table_for_chroma_flag = reader.read_flag("sps_same_qp_table_for_chroma_flag")?;
            let num_qp_tables = if sps_same_qp_table_for_chroma_flag {
                1
            } else if sps_joint_cbcr_enabled_flag {
                3
            } else {
                2
            };
            for _ in 0..num_qp_tables {
                chroma_qp_tables.push(ChromaQpMapping::parse(reader, qp_bd_offset)?);
            }
        }

        let sps_sao_enabled_flag = reader.read_flag("sps_sao_enabled_flag")?;
        let sps_alf_enabled_flag = reader.read_flag("sps_alf_enabled_flag")?;
        let sps_ccalf_enabled_flag =
            sps_alf_enabled_flag && sps_chroma_format_idc != 0 && reader.read_flag("sps_ccalf_enabled_flag")?;
        let sps_lmcs_enabled_flag = reader.read_flag("sps_lmcs_enabled_flag")?;
        let sps_weighted_pred_flag = reader.read_flag("sps_weighted_pred_flag")?;
        let sps_weighted_bipred_flag = reader.read_flag("sps_weighted_bipred_flag")?;
        let sps_long_term_ref_pics_flag = reader.read_flag("sps_long_term_ref_pics_flag")?;
        let sps_inter_layer_prediction_enabled_flag =
            sps_video_parameter_set_id > 0 && reader.read_flag("sps_inter_layer_prediction_enabled_flag")?;
        let sps_idr_rpl_present_flag = reader.read_flag("sps_idr_rpl_present_flag")?;
        let sps_rpl1_same_as_rpl0_flag = reader.read_flag("sps_rpl1_same_as_rpl0_flag")?;

        let mut rpl_context = RplContext {
            long_term_ref_pics: sps_long_term_ref_pics_flag,
            inter_layer_prediction: sps_inter_layer_prediction_enabled_flag,
            weighted_pred_or_bipred: sps_weighted_pred_flag || sps_weighted_bipred_flag,
            log2_max_pic_order_cnt_lsb: sps_log2_max_pic_order_cnt_lsb_minus4 + 4,
            num_ref_pic_lists: [0, 0],
        };
        let mut ref_pic_list_structs: [Vec<RefPicListStruct>; 2] = Default::default();
        for i in 0..2 {
            if i == 1 && sps_rpl1_same_as_rpl0_flag {
                ref_pic_list_structs[1] = ref_pic_list_structs[0].clone();
                break;
            }

            let sps_num_ref_pic_lists = reader.read_uev("sps_num_ref_pic_lists")?;
            range_check!(sps_num_ref_pic_lists, 0, 64)?;
            rpl_context.num_ref_pic_lists[i] = sps_num_ref_pic_lists as usize;
            for j in 0..sps_num_ref_pic_lists as usize {
                ref_pic_list_structs[i].push(RefPicListStruct::parse(reader, i, j, &rpl_context)?);
            }
        }

        let sps_ref_wraparound_enabled_flag = reader.read_flag("sps_ref_wraparound_enabled_flag")?;
        let sps_temporal_mvp_enabled_flag = reader.read_flag("sps_temporal_mvp_enabled_flag")?;
        let sps_sbtmvp_enabled_flag = sps_temporal_mvp_enabled_flag && reader.read_flag("sps_sbtmvp_enabled_flag")?;
        let sps_amvr_enabled_flag = reader.read_flag("sps_amvr_enabled_flag")?;
        let sps_bdof_enabled_flag = reader.read_flag("sps_bdof_enabled_flag")?;
        let sps_bdof_control_present_in_ph_flag =
            sps_bdof_enabled_flag && reader.read_flag("sps_bdof_control_present_in_ph_flag")?;
        let sps_smvd_enabled_flag = reader.read_flag("sps_smvd_enabled_flag")?;
        let sps_dmvr_enabled_flag = reader.read_flag("sps_dmvr_enabled_flag")?;
        let sps_dmvr_control_present_in_ph_flag =
            sps_dmvr_enabled_flag && reader.read_flag("sps_dmvr_control_present_in_ph_flag")?;
        let sps_mmvd_enabled_flag = reader.read_flag("sps_mmvd_enabled_flag")?;
        let sps_mmvd_fullpel_only_enabled_flag =
            sps_mmvd_enabled_flag && reader.read_flag("sps_mmvd_fullpel_only_enabled_flag")?;

        let sps_six_minus_max_num_merge_cand = reader.read_uev("sps_six_minus_max_num_merge_cand")?;
        range_check!(sps_six_minus_max_num_merge_cand, 0, 5)?;
        let sps_six_minus_max_num_merge_cand = sps_six_minus_max_num_merge_cand as u8;
        let max_num_merge_cand = 6 - sps_six_minus_max_num_merge_cand;

        let sps_sbt_enabled_flag = reader.read_flag("sps_sbt_enabled_flag")?;
        let sps_affine_enabled_flag = reader.read_flag("sps_affine_enabled_flag")?;
        let mut sps_five_minus_max_num_subblock_merge_cand = 0;
        let mut sps_6param_affine_enabled_flag = false;
        let mut sps_affine_amvr_enabled_flag = false;
        let mut sps_affine_prof_enabled_flag = false;
        let mut sps_prof_control_present_in_ph_flag = false;
        if sps_affine_enabled_flag {
            let five_minus = reader.read_uev("sps_five_minus_max_num_subblock_merge_cand")?;
            range_check!(five_minus, 0, 5 - sps_sbtmvp_enabled_flag as u64)?;
            sps_five_minus_max_num_subblock_merge_cand = five_minus as u8;
            sps_6param_affine_enabled_flag = reader.read_flag("sps_6param_affine_enabled_flag")?;
            sps_affine_amvr_enabled_flag =
                sps_amvr_enabled_flag && reader.read_flag("sps_affine_amvr_enabled_flag")?;
            sps_affine_prof_enabled_flag = reader.read_flag("sps_affine_prof_enabled_flag")?;
            sps_prof_control_present_in_ph_flag =
                sps_affine_prof_enabled_flag && reader.read_flag("sps_prof_control_present_in_ph_flag")?;
        }

        let sps_bcw_enabled_flag = reader.read_flag("sps_bcw_enabled_flag")?;
        let sps_ciip_enabled_flag = reader.read_flag("sps_ciip_enabled_flag")?;
        let mut sps_gpm_enabled_flag = false;
        let mut sps_max_num_merge_cand_minus_max_num_gpm_cand = 0;
        if max_num_merge_cand >= 2 {
            sps_gpm_enabled_flag = reader.read_flag("sps_gpm_enabled_flag")?;
            if sps_gpm_enabled_flag && max_num_merge_cand >= 3 {
                let minus = reader.read_uev("sps_max_num_merge_cand_minus_max_num_gpm_cand")?;
                range_check!(minus, 0, max_num_merge_cand - 2)?;
                sps_max_num_merge_cand_minus_max_num_gpm_cand = minus as u8;
            }
        }

        let sps_log2_parallel_merge_level_minus2 = reader.read_uev("sps_log2_parallel_merge_level_minus2")?;
        range_check!(sps_log2_parallel_merge_level_minus2, 0, ctb_log2_size_y - 2)?;

        let sps_isp_enabled_flag = reader.read_flag("sps_isp_enabled_flag")?;
        let sps_mrl_enabled_flag = reader.read_flag("sps_mrl_enabled_flag")?;
        let sps_mip_enabled_flag = reader.read_flag("sps_mip_enabled_flag")?;
        let sps_cclm_enabled_flag = sps_chroma_format_idc != 0 && reader.read_flag("sps_cclm_enabled_flag")?;
        let mut sps_chroma_horizontal_collocated_flag = true;
        let mut sps_chroma_vertical_collocated_flag = true;
        if sps_chroma_format_idc == 1 {
            sps_chroma_horizontal_collocated_flag = reader.read_flag("sps_chroma_horizontal_collocated_flag")?;
            sps_chroma_vertical_collocated_flag = reader.read_flag("sps_chroma_vertical_collocated_flag")?;
        }

        let sps_palette_enabled_flag = reader.read_flag("sps_palette_enabled_flag")?;
        let sps_act_enabled_flag = sps_chroma_format_idc == 3
            && !sps_max_luma_transform_size_64_flag
            && reader.read_flag("sps_act_enabled_flag")?;
        let mut sps_min_qp_prime_ts = 0;
        if sps_transform_skip_enabled_flag || sps_palette_enabled_flag {
            let min_qp = reader.read_uev("sps_min_qp_prime_ts")?;
            range_check!(min_qp, 0, 8)?;
            sps_min_qp_prime_ts = min_qp as u8;
        }

        let sps_ibc_enabled_flag = reader.read_flag("sps_ibc_enabled_flag")?;
        let mut sps_six_minus_max_num_ibc_merge_cand = 0;
        if sps_ibc_enabled_flag {
            let six_minus = reader.read_uev("sps_six_minus_max_num_ibc_merge_cand")?;
            range_check!(six_minus, 0, 5)?;
            sps_six_minus_max_num_ibc_merge_cand = six_minus as u8;
        }

        let mut ladf = None;
        if reader.read_flag("sps_ladf_enabled_flag")? {
            let num_ladf_intervals_minus2 = reader.read_bits("sps_num_ladf_intervals_minus2", 2)?;
            let lowest = reader.read_sev("sps_ladf_lowest_interval_qp_offset")?;
            range_check!(lowest, -63, 63)?;
            let mut params = LadfParameters {
                sps_ladf_lowest_interval_qp_offset: lowest as i32,
                ..Default::default()
            };
            for _ in 0..num_ladf_intervals_minus2 + 1 {
                let qp_offset = reader.read_sev("sps_ladf_qp_offset")?;
                range_check!(qp_offset, -63, 63)?;
                let threshold = reader.read_uev("sps_ladf_delta_threshold_minus1")?;
                range_check!(threshold, 0, (1u64 << (sps_bitdepth_minus8 + 8)) - 3)?;
                params.sps_ladf_qp_offset.push(qp_offset as i32);
                params.sps_ladf_delta_threshold_minus1.push(threshold as u32);
            }
            ladf = Some(params);
        }

        let sps_explicit_scaling_list_enabled_flag = reader.read_flag("sps_explicit_scaling_list_enabled_flag")?;
        let sps_scaling_matrix_for_lfnst_disabled_flag = sps_lfnst_enabled_flag
            && sps_explicit_scaling_list_enabled_flag
            && reader.read_flag("sps_scaling_matrix_for_lfnst_disabled_flag")?;
        let sps_scaling_matrix_for_alternative_colour_space_disabled_flag = sps_act_enabled_flag
            && sps_explicit_scaling_list_enabled_flag
            && reader.read_flag("sps_scaling_matrix_for_alternative_colour_space_disabled_flag")?;
        let sps_scaling_matrix_designated_colour_space_flag =
            sps_scaling_matrix_for_alternative_colour_space_disabled_flag
                && reader.read_flag("sps_scaling_matrix_designated_colour_space_flag")?;

        let sps_dep_quant_enabled_flag = reader.read_flag("sps_dep_quant_enabled_flag")?;
        let sps_sign_data_hiding_enabled_flag = reader.read_flag("sps_sign_data_hiding_enabled_flag")?;

        let sps_virtual_boundaries_enabled_flag = reader.read_flag("sps_virtual_boundaries_enabled_flag")?;
        let mut sps_virtual_boundaries_present_flag = false;
        let mut virtual_boundaries = VirtualBoundaries::default();
        if sps_virtual_boundaries_enabled_flag {
            sps_virtual_boundaries_present_flag = reader.read_flag("sps_virtual_boundaries_present_flag")?;
            if sps_virtual_boundaries_present_flag {
                virtual_boundaries = VirtualBoundaries::parse(
                    reader,
                    virtual_boundaries::SPS_NAMES,
                    sps_pic_width_max_in_luma_samples,
                    sps_pic_height_max_in_luma_samples,
                )?;
            }
        }

        let mut timing_hrd = None;
        if sps_ptl_dpb_hrd_params_present_flag && reader.read_flag("sps_timing_hrd_params_present_flag")? {
            let general = GeneralTimingHrdParameters::parse(reader)?;
            let sps_sublayer_cpb_params_present_flag =
                sps_max_sublayers_minus1 > 0 && reader.read_flag("sps_sublayer_cpb_params_present_flag")?;
            let first_sub_layer = if sps_sublayer_cpb_params_present_flag {
                0
            } else {
                sps_max_sublayers_minus1
            };
            let ols = OlsTimingHrdParameters::parse(reader, first_sub_layer, sps_max_sublayers_minus1, &general)?;
            timing_hrd = Some(SpsTimingHrd {
                general,
                sps_sublayer_cpb_params_present_flag,
                ols,
            });
        }

        let sps_field_seq_flag = reader.read_flag("sps_field_seq_flag")?;

        let mut vui_parameters = None;
        if reader.read_flag("sps_vui_parameters_present_flag")? {
            let sps_vui_payload_size_minus1 = reader.read_uev("sps_vui_payload_size_minus1")?;
            range_check!(sps_vui_payload_size_minus1, 0, 1023)?;
            reader.read_zero_bits_until_aligned("sps_vui_alignment_zero_bit")?;
            vui_parameters = Some(VuiParameters::parse_payload(
                reader,
                sps_vui_payload_size_minus1 as usize + 1,
            )?);
        }

        let mut range_extension = SpsRangeExtension::default();
        if reader.read_flag("sps_extension_flag")? {
            let sps_range_extension_flag = reader.read_flag("sps_range_extension_flag")?;
            let sps_extension_7bits = reader.read_bits("sps_extension_7bits", 7)?;

            if sps_range_extension_flag {
                range_extension.sps_extended_precision_flag = reader.read_flag("sps_extended_precision_flag")?;
                range_extension.sps_ts_residual_coding_rice_present_in_sh_flag = sps_transform_skip_enabled_flag
                    && reader.read_flag("sps_ts_residual_coding_rice_present_in_sh_flag")?;
                range_extension.sps_rrc_rice_extension_flag = reader.read_flag("sps_rrc_rice_extension_flag")?;
                range_extension.sps_persistent_rice_adaptation_enabled_flag =
                    reader.read_flag("sps_persistent_rice_adaptation_enabled_flag")?;
                range_extension.sps_reverse_last_sig_coeff_enabled_flag =
                    reader.read_flag("sps_reverse_last_sig_coeff_enabled_flag")?;
            }

            if sps_extension_7bits != 0 {
                reader.skip_extension_data("sps_extension_data_flag")?;
            }
        }

        reader.read_rbsp_trailing_bits()?;

        Ok(Self {
            sps_seq_parameter_set_id,
            sps_video_parameter_set_id,
            sps_max_sublayers_minus1,
            sps_chroma_format_idc,
            sps_log2_ctu_size_minus5,
            sps_ptl_dpb_hrd_params_present_flag,
            profile_tier_level,
            sps_gdr_enabled_flag,
            sps_ref_pic_resampling_enabled_flag,
            sps_res_change_in_clvs_allowed_flag,
            sps_pic_width_max_in_luma_samples,
            sps_pic_height_max_in_luma_samples,
            conformance_window,
            subpic_info,
            sps_bitdepth_minus8,
            sps_entropy_coding_sync_enabled_flag,
            sps_entry_point_offsets_present_flag,
            sps_log2_max_pic_order_cnt_lsb_minus4,
            sps_poc_msb_cycle_flag,
            sps_poc_msb_cycle_len_minus1,
            sps_extra_ph_bit_present_flag,
            sps_extra_sh_bit_present_flag,
            sps_sublayer_dpb_params_flag,
            dpb_parameters,
            sps_log2_min_luma_coding_block_size_minus2,
            sps_partition_constraints_override_enabled_flag,
            sps_qtbtt_dual_tree_intra_flag,
            partition_constraints,
            sps_max_luma_transform_size_64_flag,
            sps_transform_skip_enabled_flag,
            sps_log2_transform_skip_max_size_minus2,
            sps_bdpcm_enabled_flag,
            sps_mts_enabled_flag,
            sps_explicit_mts_intra_enabled_flag,
            sps_explicit_mts_inter_enabled_flag,
            sps_lfnst_enabled_flag,
            sps_joint_cbcr_enabled_flag,
            sps_same_qp_table_for_chroma_flag,
            chroma_qp_tables,
            sps_sao_enabled_flag,
            sps_alf_enabled_flag,
            sps_ccalf_enabled_flag,
            sps_lmcs_enabled_flag,
            sps_weighted_pred_flag,
            sps_weighted_bipred_flag,
            sps_long_term_ref_pics_flag,
            sps_inter_layer_prediction_enabled_flag,
            sps_idr_rpl_present_flag,
            sps_rpl1_same_as_rpl0_flag,
            ref_pic_list_structs,
            sps_ref_wraparound_enabled_flag,
            sps_temporal_mvp_enabled_flag,
            sps_sbtmvp_enabled_flag,
            sps_amvr_enabled_flag,
            sps_bdof_enabled_flag,
            sps_bdof_control_present_in_ph_flag,
            sps_smvd_enabled_flag,
            sps_dmvr_enabled_flag,
            sps_dmvr_control_present_in_ph_flag,
            sps_mmvd_enabled_flag,
            sps_mmvd_fullpel_only_enabled_flag,
            sps_six_minus_max_num_merge_cand,
            sps_sbt_enabled_flag,
            sps_affine_enabled_flag,
            sps_five_minus_max_num_subblock_merge_cand,
            sps_6param_affine_enabled_flag,
            sps_affine_amvr_enabled_flag,
            sps_affine_prof_enabled_flag,
            sps_prof_control_present_in_ph_flag,
            sps_bcw_enabled_flag,
            sps_ciip_enabled_flag,
            sps_gpm_enabled_flag,
            sps_max_num_merge_cand_minus_max_num_gpm_cand,
            sps_log2_parallel_merge_level_minus2: sps_log2_parallel_merge_level_minus2 as u8,
            sps_isp_enabled_flag,
            sps_mrl_enabled_flag,
            sps_mip_enabled_flag,
            sps_cclm_enabled_flag,
            sps_chroma_horizontal_collocated_flag,
            sps_chroma_vertical_collocated_flag,
            sps_palette_enabled_flag,
            sps_act_enabled_flag,
            sps_min_qp_prime_ts,
            sps_ibc_enabled_flag,
            sps_six_minus_max_num_ibc_merge_cand,
            ladf,
            sps_explicit_scaling_list_enabled_flag,
            sps_scaling_matrix_for_lfnst_disabled_flag,
            sps_scaling_matrix_for_alternative_colour_space_disabled_flag,
            sps_scaling_matrix_designated_colour_space_flag,
            sps_dep_quant_enabled_flag,
            sps_sign_data_hiding_enabled_flag,
            sps_virtual_boundaries_enabled_flag,
            sps_virtual_boundaries_present_flag,
            virtual_boundaries,
            timing_hrd,
            sps_field_seq_flag,
            vui_parameters,
            range_extension,
            ctb_log2_size_y,
            min_cb_log2_size_y,
        })
    }

    /// `SubWidthC`, ISO/IEC 23090-3 - Table 2.
    pub const fn sub_width_c(&self) -> u32 {
        match self.sps_chroma_format_idc {
            1 | 2 => 2,
            _ => 1,
        }
    }

    /// `SubHeightC`, ISO/IEC 23090-3 - Table 2.
    pub const fn sub_height_c(&self) -> u32 {
        if self.sps_chroma_format_idc == 1 { 2 } else { 1 }
    }

    /// `ChromaArrayType`. VVC has no separate colour planes, so this is the chroma format.
    pub const fn chroma_array_type(&self) -> u8 {
        self.sps_chroma_format_idc
    }

    /// The cropped width in luma samples.
    ///
    /// `width = sps_pic_width_max_in_luma_samples - SubWidthC * (left + right)`
    pub const fn width(&self) -> u32 {
        self.sps_pic_width_max_in_luma_samples
            - self.sub_width_c() * (self.conformance_window.left_offset + self.conformance_window.right_offset)
    }

    /// The cropped height in luma samples.
    pub const fn height(&self) -> u32 {
        self.sps_pic_height_max_in_luma_samples
            - self.sub_height_c() * (self.conformance_window.top_offset + self.conformance_window.bottom_offset)
    }

    #[inline]
    pub const fn ctb_log2_size_y(&self) -> u8 {
        self.ctb_log2_size_y
    }

    pub const fn ctb_size_y(&self) -> u32 {
        1 << self.ctb_log2_size_y
    }

    #[inline]
    pub const fn min_cb_log2_size_y(&self) -> u8 {
        self.min_cb_log2_size_y
    }

    pub const fn min_cb_size_y(&self) -> u32 {
        1 << self.min_cb_log2_size_y
    }

    /// `BitDepth`, shared by luma and chroma.
    pub const fn bit_depth(&self) -> u8 {
        self.sps_bitdepth_minus8 + 8
    }

    pub const fn qp_bd_offset(&self) -> i32 {
        6 * self.sps_bitdepth_minus8 as i32
    }

    pub const fn log2_max_pic_order_cnt_lsb(&self) -> u8 {
        self.sps_log2_max_pic_order_cnt_lsb_minus4 + 4
    }

    /// `MaxPicOrderCntLsb`.
    pub const fn max_pic_order_cnt_lsb(&self) -> u32 {
        1 << self.log2_max_pic_order_cnt_lsb()
    }

    pub const fn max_num_merge_cand(&self) -> u8 {
        6 - self.sps_six_minus_max_num_merge_cand
    }

    /// `NumExtraPhBits`.
    pub fn num_extra_ph_bits(&self) -> u32 {
        self.sps_extra_ph_bit_present_flag.iter().filter(|f| **f).count() as u32
    }

    /// `NumExtraShBits`.
    pub fn num_extra_sh_bits(&self) -> u32 {
        self.sps_extra_sh_bit_present_flag.iter().filter(|f| **f).count() as u32
    }

    /// `sps_num_ref_pic_lists[i]`.
    pub fn num_ref_pic_lists(&self, i: usize) -> usize {
        self.ref_pic_list_structs[i].len()
    }

    pub(crate) fn rpl_context(&self) -> RplContext {
        RplContext {
            long_term_ref_pics: self.sps_long_term_ref_pics_flag,
            inter_layer_prediction: self.sps_inter_layer_prediction_enabled_flag,
            weighted_pred_or_bipred: self.sps_weighted_pred_flag || self.sps_weighted_bipred_flag,
            log2_max_pic_order_cnt_lsb: self.log2_max_pic_order_cnt_lsb(),
            num_ref_pic_lists: [self.num_ref_pic_lists(0), self.num_ref_pic_lists(1)],
        }
    }

    /// `PicWidthInCtbsY` for the maximum picture size.
    pub const fn max_pic_width_in_ctbs_y(&self) -> u32 {
        self.sps_pic_width_max_in_luma_samples.div_ceil(self.ctb_size_y())
    }

    /// `PicHeightInCtbsY` for the maximum picture size.
    pub const fn max_pic_height_in_ctbs_y(&self) -> u32 {
        self.sps_pic_height_max_in_luma_samples.div_ceil(self.ctb_size_y())
    }

    /// Fails unless `pps_pic_width` and `pps_pic_height` fit within the SPS maximum.
    pub(crate) fn check_pic_size(&self, width: u32, height: u32) -> Result<()> {
        if width > self.sps_pic_width_max_in_luma_samples {
            return Err(VvcError::RangeViolation {
                field: "pps_pic_width_in_luma_samples",
                value: width as i64,
                min: 1,
                max: self.sps_pic_width_max_in_luma_samples as i64,
            });
        }
        range_check!(
            "pps_pic_height_in_luma_samples",
            height,
            1,
            self.sps_pic_height_max_in_luma_samples
        )
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::Sps;
    use crate::reader::RbspReader;
    use crate::test_util::TestSps;

    #[test]
    fn minimal_1080p() {
        let data = TestSps::default().rbsp();
        let sps = Sps::parse(&mut RbspReader::new(&data)).unwrap();

        assert_eq!(sps.sps_seq_parameter_set_id, 0);
        assert_eq!(sps.ctb_size_y(), 128);
        assert_eq!(sps.width(), 1920);
        assert_eq!(sps.height(), 1088);
        assert_eq!(sps.bit_depth(), 10);
        assert_eq!(sps.qp_bd_offset(), 12);
        assert_eq!(sps.max_pic_order_cnt_lsb(), 16);
        assert_eq!(sps.max_pic_width_in_ctbs_y(), 15);
        assert_eq!(sps.max_pic_height_in_ctbs_y(), 9);
        assert_eq!(sps.profile_tier_level.as_ref().unwrap().level(), (3, 1));
        assert_eq!(sps.dpb_parameters.as_ref().unwrap().dpb_max_dec_pic_buffering_minus1, [4]);
        assert_eq!(sps.subpic_info.num_subpics(), 1);
        assert_eq!(sps.chroma_qp_tables.len(), 1);
        assert!(sps.vui_parameters.is_none());
    }

    #[test]
    fn ctu_64_and_templates() {
        let data = TestSps {
            sps_id: 3,
            log2_ctu_size_minus5: 1,
            log2_max_poc_lsb_minus4: 4,
            rpl_templates: vec![vec![-1], vec![-1, -2]],
            alf: true,
            temporal_mvp: true,
            ..Default::default()
        }
        .rbsp();
        let sps = Sps::parse(&mut RbspReader::new(&data)).unwrap();

        assert_eq!(sps.sps_seq_parameter_set_id, 3);
        assert_eq!(sps.ctb_size_y(), 64);
        assert_eq!(sps.max_pic_width_in_ctbs_y(), 30);
        assert_eq!(sps.max_pic_height_in_ctbs_y(), 17);
        assert_eq!(sps.max_pic_order_cnt_lsb(), 256);
        assert!(sps.sps_alf_enabled_flag);
        assert!(sps.sps_temporal_mvp_enabled_flag);
        assert_eq!(sps.num_ref_pic_lists(0), 2);
        assert_eq!(sps.num_ref_pic_lists(1), 2);
        assert_eq!(sps.ref_pic_list_structs[1][1].short_term_poc_offsets(), [-1, -2]);
    }

    #[test]
    fn truncated() {
        let data = TestSps::default().rbsp();
        assert!(Sps::parse(&mut RbspReader::new(&data[..6])).is_err());
    }
}
