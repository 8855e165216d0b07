//! Picture parameter set.

use std::sync::Arc;

use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::registry::ParameterSets;
use crate::sps::{ConformanceWindow, ScalingWindow, Sps};

mod partitioning;

pub use partitioning::{ExplicitSliceLayout, SliceMap, TileLayout};

/// Chroma QP offsets of the PPS, present when `pps_chroma_tool_offsets_present_flag` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PpsChromaQpOffsets {
    pub pps_cb_qp_offset: i8,
    pub pps_cr_qp_offset: i8,
    pub pps_joint_cbcr_qp_offset_present_flag: bool,
    pub pps_joint_cbcr_qp_offset_value: i8,
    pub pps_slice_chroma_qp_offsets_present_flag: bool,
    pub pps_cu_chroma_qp_offset_list_enabled_flag: bool,
    pub pps_cb_qp_offset_list: Vec<i8>,
    pub pps_cr_qp_offset_list: Vec<i8>,
    pub pps_joint_cbcr_qp_offset_list: Vec<i8>,
}

/// `beta` and `tC` offsets of the deblocking filter, shared by the PPS, PH and SH.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeblockingOffsets {
    pub luma_beta_offset_div2: i8,
    pub luma_tc_offset_div2: i8,
    pub cb_beta_offset_div2: i8,
    pub cb_tc_offset_div2: i8,
    pub cr_beta_offset_div2: i8,
    pub cr_tc_offset_div2: i8,
}

impl DeblockingOffsets {
    /// Reads the luma offsets, then the chroma ones when `chroma_tool_offsets` is set.
    ///
    /// Chroma offsets that are not present take the luma values.
    pub(crate) fn parse(reader: &mut RbspReader, names: [&'static str; 6], chroma_tool_offsets: bool) -> Result<Self> {
        let luma_beta_offset_div2 = read_qp_offset(reader, names[0])?;
        let luma_tc_offset_div2 = read_qp_offset(reader, names[1])?;
        let mut offsets = Self {
            luma_beta_offset_div2,
            luma_tc_offset_div2,
            cb_beta_offset_div2: luma_beta_offset_div2,
            cb_tc_offset_div2: luma_tc_offset_div2,
            cr_beta_offset_div2: luma_beta_offset_div2,
            cr_tc_offset_div2: luma_tc_offset_div2,
        };

        if chroma_tool_offsets {
            offsets.cb_beta_offset_div2 = read_qp_offset(reader, names[2])?;
            offsets.cb_tc_offset_div2 = read_qp_offset(reader, names[3])?;
            offsets.cr_beta_offset_div2 = read_qp_offset(reader, names[4])?;
            offsets.cr_tc_offset_div2 = read_qp_offset(reader, names[5])?;
        }

        Ok(offsets)
    }
}

/// Deblocking filter control of the PPS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PpsDeblocking {
    pub pps_deblocking_filter_override_enabled_flag: bool,
    pub pps_deblocking_filter_disabled_flag: bool,
    pub pps_dbf_info_in_ph_flag: bool,
    pub offsets: DeblockingOffsets,
}

/// The Picture Parameter Set.
///
/// ISO/IEC 23090-3 - 7.3.2.5
#[derive(Debug, Clone, PartialEq)]
pub struct Pps {
    pub pps_pic_parameter_set_id: u8,
    pub pps_seq_parameter_set_id: u8,
    pub pps_mixed_nalu_types_in_pic_flag: bool,
    pub pps_pic_width_in_luma_samples: u32,
    pub pps_pic_height_in_luma_samples: u32,
    /// Inherited from the SPS when the picture has the maximum size.
    pub conformance_window: ConformanceWindow,
    pub scaling_window: ScalingWindow,
    pub pps_output_flag_present_flag: bool,
    pub pps_no_pic_partition_flag: bool,
    pub pps_subpic_id_mapping_present_flag: bool,
    pub pps_num_subpics_minus1: u32,
    pub pps_subpic_id_len_minus1: u8,
    pub pps_subpic_id: Vec<u32>,
    pub pps_log2_ctu_size_minus5: u8,
    pub pps_tile_column_width_minus1: Vec<u32>,
    pub pps_tile_row_height_minus1: Vec<u32>,
    pub pps_loop_filter_across_tiles_enabled_flag: bool,
    /// Inferred to 1 when not present.
    pub pps_rect_slice_flag: bool,
    pub pps_single_slice_per_subpic_flag: bool,
    pub pps_num_slices_in_pic_minus1: u32,
    pub pps_tile_idx_delta_present_flag: bool,
    pub explicit_slices: Option<ExplicitSliceLayout>,
    pub pps_loop_filter_across_slices_enabled_flag: bool,
    pub pps_cabac_init_present_flag: bool,
    /// The value ranges from \[0, 14\].
    pub pps_num_ref_idx_default_active_minus1: [u8; 2],
    pub pps_rpl1_idx_present_flag: bool,
    pub pps_weighted_pred_flag: bool,
    pub pps_weighted_bipred_flag: bool,
    pub pps_ref_wraparound_enabled_flag: bool,
    pub pps_pic_width_minus_wraparound_offset: u32,
    pub pps_init_qp_minus26: i8,
    pub pps_cu_qp_delta_enabled_flag: bool,
    pub chroma_qp_offsets: Option<PpsChromaQpOffsets>,
    pub deblocking: Option<PpsDeblocking>,
    pub pps_rpl_info_in_ph_flag: bool,
    pub pps_sao_info_in_ph_flag: bool,
    pub pps_alf_info_in_ph_flag: bool,
    pub pps_wp_info_in_ph_flag: bool,
    pub pps_qp_delta_info_in_ph_flag: bool,
    pub pps_picture_header_extension_present_flag: bool,
    pub pps_slice_header_extension_present_flag: bool,

    /// The SPS this PPS was parsed against.
    pub sps: Arc<Sps>,

    // Calculated values
    tile_layout: TileLayout,
    slice_map: Option<SliceMap>,
    subpic_id_val: Vec<u32>,
}

impl Pps {
    /// Parses the PPS RBSP, resolving the referenced SPS from `parameter_sets`.
    pub fn parse(reader: &mut RbspReader, parameter_sets: &ParameterSets) -> Result<Self> {
        // begin ISO/IEC 23090-3 - 7.3.2.5
        let pps_pic_parameter_set_id = reader.read_bits("pps_pic_parameter_set_id", 6)? as u8;
        let pps_seq_parameter_set_id = reader.read_bits("pps_seq_parameter_set_id", 4)? as u8;
        let sps = parameter_sets.sps(pps_seq_parameter_set_id)?;

        let pps_mixed_nalu_types_in_pic_flag = reader.read_flag("pps_mixed_nalu_types_in_pic_flag")?;

        let pps_pic_width_in_luma_samples = reader.read_uev("pps_pic_width_in_luma_samples")?;
        range_check!(pps_pic_width_in_luma_samples, 1, u32::MAX)?;
        let pps_pic_width_in_luma_samples = pps_pic_width_in_luma_samples as u32;
        let pps_pic_height_in_luma_samples = reader.read_uev("pps_pic_height_in_luma_samples")?;
        range_check!(pps_pic_height_in_luma_samples, 1, u32::MAX)?;
        let pps_pic_height_in_luma_samples = pps_pic_height_in_luma_samples as u32;

        sps.check_pic_size(pps_pic_width_in_luma_samples, pps_pic_height_in_luma_samples)?;
        let max_size = pps_pic_width_in_luma_samples == sps.sps_pic_width_max_in_luma_samples
            && pps_pic_height_in_luma_samples == sps.sps_pic_height_max_in_luma_samples;
        if !sps.sps_res_change_in_clvs_allowed_flag && !max_size {
            range_check!(
                pps_pic_width_in_luma_samples,
                sps.sps_pic_width_max_in_luma_samples,
                sps.sps_pic_width_max_in_luma_samples
            )?;
            range_check!(
                pps_pic_height_in_luma_samples,
                sps.sps_pic_height_max_in_luma_samples,
                sps.sps_pic_height_max_in_luma_samples
            )?;
        }

        let ctb_size_y = sps.ctb_size_y();
        let pic_width_in_ctbs_y = pps_pic_width_in_luma_samples.div_ceil(ctb_size_y);
        let pic_height_in_ctbs_y = pps_pic_height_in_luma_samples.div_ceil(ctb_size_y);

        let pps_conformance_window_flag = reader.read_flag("pps_conformance_window_flag")?;
        let conformance_window = if pps_conformance_window_flag {
            range_check!(pps_conformance_window_flag, 0, !max_size)?;
            ConformanceWindow::parse(
                reader,
                [
                    "pps_conf_win_left_offset",
                    "pps_conf_win_right_offset",
                    "pps_conf_win_top_offset",
                    "pps_conf_win_bottom_offset",
                ],
            )?
        } else if max_size {
            sps.conformance_window
        } else {
            ConformanceWindow::default()
        };

        let pps_scaling_window_explicit_signalling_flag =
            reader.read_flag("pps_scaling_window_explicit_signalling_flag")?;
        let scaling_window = if pps_scaling_window_explicit_signalling_flag {
            range_check!(
                pps_scaling_window_explicit_signalling_flag,
                0,
                sps.sps_ref_pic_resampling_enabled_flag
            )?;
            ScalingWindow::parse(reader)?
        } else {
            ScalingWindow::from(conformance_window)
        };

        let pps_output_flag_present_flag = reader.read_flag("pps_output_flag_present_flag")?;
        let pps_no_pic_partition_flag = reader.read_flag("pps_no_pic_partition_flag")?;
        if sps.subpic_info.sps_num_subpics_minus1 > 0 || pps_mixed_nalu_types_in_pic_flag {
            range_check!(pps_no_pic_partition_flag, 0, 0)?;
        }

        let subpic_info = &sps.subpic_info;
        let pps_subpic_id_mapping_present_flag = reader.read_flag("pps_subpic_id_mapping_present_flag")?;
        let mapping_expected = subpic_info.sps_subpic_id_mapping_explicitly_signalled_flag
            && !subpic_info.sps_subpic_id_mapping_present_flag;
        range_check!(pps_subpic_id_mapping_present_flag, mapping_expected, mapping_expected)?;

        let mut pps_num_subpics_minus1 = 0;
        let mut pps_subpic_id_len_minus1 = 0;
        let mut pps_subpic_id = Vec::new();
        if pps_subpic_id_mapping_present_flag {
            if !pps_no_pic_partition_flag {
                let num_subpics_minus1 = reader.read_uev("pps_num_subpics_minus1")?;
                range_check!(
                    "pps_num_subpics_minus1",
                    num_subpics_minus1,
                    subpic_info.sps_num_subpics_minus1,
                    subpic_info.sps_num_subpics_minus1
                )?;
                pps_num_subpics_minus1 = num_subpics_minus1 as u32;
            }

            let subpic_id_len_minus1 = reader.read_uev("pps_subpic_id_len_minus1")?;
            range_check!(
                "pps_subpic_id_len_minus1",
                subpic_id_len_minus1,
                subpic_info.sps_subpic_id_len_minus1,
                subpic_info.sps_subpic_id_len_minus1
            )?;
            pps_subpic_id_len_minus1 = subpic_id_len_minus1 as u8;

            for _ in 0..=pps_num_subpics_minus1 {
                pps_subpic_id.push(reader.read_bits("pps_subpic_id", pps_subpic_id_len_minus1 as u32 + 1)? as u32);
            }
        }

        // (7-39)
        let subpic_id_val = (0..=subpic_info.sps_num_subpics_minus1)
            .map(|i| {
                if !subpic_info.sps_subpic_id_mapping_explicitly_signalled_flag {
                    i
                } else if pps_subpic_id_mapping_present_flag {
                    pps_subpic_id[i as usize]
                } else {
                    subpic_info.sps_subpic_id[i as usize]
                }
            })
            .collect::<Vec<_>>();

        let mut pps_log2_ctu_size_minus5 = sps.sps_log2_ctu_size_minus5;
        let mut pps_tile_column_width_minus1 = vec![pic_width_in_ctbs_y - 1];
        let mut pps_tile_row_height_minus1 = vec![pic_height_in_ctbs_y - 1];
        let mut pps_loop_filter_across_tiles_enabled_flag = false;
        let mut pps_rect_slice_flag = true;
        let mut pps_single_slice_per_subpic_flag = true;
        let mut pps_num_slices_in_pic_minus1 = subpic_info.sps_num_subpics_minus1;
        let mut pps_tile_idx_delta_present_flag = false;
        let mut explicit_slices = None;
        let mut pps_loop_filter_across_slices_enabled_flag = false;
        let mut tile_layout = TileLayout::single(pic_width_in_ctbs_y, pic_height_in_ctbs_y);
        let slice_map;

        if !pps_no_pic_partition_flag {
            pps_log2_ctu_size_minus5 = reader.read_bits("pps_log2_ctu_size_minus5", 2)? as u8;
            range_check!(
                pps_log2_ctu_size_minus5,
                sps.sps_log2_ctu_size_minus5,
                sps.sps_log2_ctu_size_minus5
            )?;

            let pps_num_exp_tile_columns_minus1 = reader.read_uev("pps_num_exp_tile_columns_minus1")?;
            range_check!(pps_num_exp_tile_columns_minus1, 0, pic_width_in_ctbs_y - 1)?;
            let pps_num_exp_tile_rows_minus1 = reader.read_uev("pps_num_exp_tile_rows_minus1")?;
            range_check!(pps_num_exp_tile_rows_minus1, 0, pic_height_in_ctbs_y - 1)?;

            pps_tile_column_width_minus1 = read_tile_sizes(
                reader,
                "pps_tile_column_width_minus1",
                pps_num_exp_tile_columns_minus1,
                pic_width_in_ctbs_y,
            )?;
            pps_tile_row_height_minus1 = read_tile_sizes(
                reader,
                "pps_tile_row_height_minus1",
                pps_num_exp_tile_rows_minus1,
                pic_height_in_ctbs_y,
            )?;

            tile_layout = TileLayout::new(
                pic_width_in_ctbs_y,
                pic_height_in_ctbs_y,
                &pps_tile_column_width_minus1,
                &pps_tile_row_height_minus1,
            )?;

            if tile_layout.num_tiles_in_pic() > 1 {
                pps_loop_filter_across_tiles_enabled_flag =
                    reader.read_flag("pps_loop_filter_across_tiles_enabled_flag")?;
                pps_rect_slice_flag = reader.read_flag("pps_rect_slice_flag")?;
                if subpic_info.sps_subpic_info_present_flag || pps_mixed_nalu_types_in_pic_flag {
                    range_check!(pps_rect_slice_flag, 1, 1)?;
                }
            }

            pps_single_slice_per_subpic_flag =
                pps_rect_slice_flag && reader.read_flag("pps_single_slice_per_subpic_flag")?;

            if pps_rect_slice_flag && !pps_single_slice_per_subpic_flag {
                let num_slices_in_pic_minus1 = reader.read_uev("pps_num_slices_in_pic_minus1")?;
                range_check!(
                    num_slices_in_pic_minus1,
                    0,
                    pic_width_in_ctbs_y as u64 * pic_height_in_ctbs_y as u64 - 1
                )?;
                pps_num_slices_in_pic_minus1 = num_slices_in_pic_minus1 as u32;
                if pps_num_slices_in_pic_minus1 > 1 {
                    pps_tile_idx_delta_present_flag = reader.read_flag("pps_tile_idx_delta_present_flag")?;
                }

                let (layout, map) = SliceMap::parse_explicit(
                    reader,
                    &tile_layout,
                    subpic_info,
                    pps_num_slices_in_pic_minus1,
                    pps_tile_idx_delta_present_flag,
                )?;
                explicit_slices = Some(layout);
                slice_map = Some(map);
            } else if pps_rect_slice_flag {
                slice_map = Some(SliceMap::from_subpics(&tile_layout, subpic_info)?);
            } else {
                pps_num_slices_in_pic_minus1 = 0;
                slice_map = None;
            }

            if !pps_rect_slice_flag || pps_single_slice_per_subpic_flag || pps_num_slices_in_pic_minus1 > 0 {
                pps_loop_filter_across_slices_enabled_flag =
                    reader.read_flag("pps_loop_filter_across_slices_enabled_flag")?;
            }
        } else {
            slice_map = Some(SliceMap::from_subpics(&tile_layout, subpic_info)?);
        }

        let pps_cabac_init_present_flag = reader.read_flag("pps_cabac_init_present_flag")?;
        let mut pps_num_ref_idx_default_active_minus1 = [0; 2];
        for value in &mut pps_num_ref_idx_default_active_minus1 {
            let active_minus1 = reader.read_uev("pps_num_ref_idx_default_active_minus1")?;
            range_check!(active_minus1, 0, 14)?;
            *value = active_minus1 as u8;
        }
        let pps_rpl1_idx_present_flag = reader.read_flag("pps_rpl1_idx_present_flag")?;
        let pps_weighted_pred_flag = reader.read_flag("pps_weighted_pred_flag")?;
        range_check!(pps_weighted_pred_flag, 0, sps.sps_weighted_pred_flag)?;
        let pps_weighted_bipred_flag = reader.read_flag("pps_weighted_bipred_flag")?;
        range_check!(pps_weighted_bipred_flag, 0, sps.sps_weighted_bipred_flag)?;

        let pps_ref_wraparound_enabled_flag = reader.read_flag("pps_ref_wraparound_enabled_flag")?;
        let mut pps_pic_width_minus_wraparound_offset = 0;
        if pps_ref_wraparound_enabled_flag {
            range_check!(pps_ref_wraparound_enabled_flag, 0, sps.sps_ref_wraparound_enabled_flag)?;
            let min_cb_size_y = sps.min_cb_size_y();
            let max_offset = (pps_pic_width_in_luma_samples / min_cb_size_y) as i64
                - (ctb_size_y / min_cb_size_y) as i64
                - 2;
            let offset = reader.read_uev("pps_pic_width_minus_wraparound_offset")?;
            range_check!("pps_pic_width_minus_wraparound_offset", offset, 0, max_offset)?;
            pps_pic_width_minus_wraparound_offset = offset as u32;
        }

        let pps_init_qp_minus26 = reader.read_sev("pps_init_qp_minus26")?;
        range_check!(pps_init_qp_minus26, -(26 + sps.qp_bd_offset() as i64), 37)?;
        let pps_cu_qp_delta_enabled_flag = reader.read_flag("pps_cu_qp_delta_enabled_flag")?;

        let pps_chroma_tool_offsets_present_flag = reader.read_flag("pps_chroma_tool_offsets_present_flag")?;
        if sps.chroma_array_type() == 0 {
            range_check!(pps_chroma_tool_offsets_present_flag, 0, 0)?;
        }
        let chroma_qp_offsets = pps_chroma_tool_offsets_present_flag
            .then(|| parse_chroma_qp_offsets(reader))
            .transpose()?;

        let mut deblocking = None;
        if reader.read_flag("pps_deblocking_filter_control_present_flag")? {
            let pps_deblocking_filter_override_enabled_flag =
                reader.read_flag("pps_deblocking_filter_override_enabled_flag")?;
            let pps_deblocking_filter_disabled_flag = reader.read_flag("pps_deblocking_filter_disabled_flag")?;
            let pps_dbf_info_in_ph_flag = !pps_no_pic_partition_flag
                && pps_deblocking_filter_override_enabled_flag
                && reader.read_flag("pps_dbf_info_in_ph_flag")?;
            let offsets = if !pps_deblocking_filter_disabled_flag {
                DeblockingOffsets::parse(
                    reader,
                    [
                        "pps_luma_beta_offset_div2",
                        "pps_luma_tc_offset_div2",
                        "pps_cb_beta_offset_div2",
                        "pps_cb_tc_offset_div2",
                        "pps_cr_beta_offset_div2",
                        "pps_cr_tc_offset_div2",
                    ],
                    pps_chroma_tool_offsets_present_flag,
                )?
            } else {
                DeblockingOffsets::default()
            };
            deblocking = Some(PpsDeblocking {
                pps_deblocking_filter_override_enabled_flag,
                pps_deblocking_filter_disabled_flag,
                pps_dbf_info_in_ph_flag,
                offsets,
            });
        }

        let mut pps_rpl_info_in_ph_flag = false;
        let mut pps_sao_info_in_ph_flag = false;
        let mut pps_alf_info_in_ph_flag = false;
        let mut pps_wp_info_in_ph_flag = false;
        let mut pps_qp_delta_info_in_ph_flag = false;
        if !pps_no_pic_partition_flag {
            pps_rpl_info_in_ph_flag = reader.read_flag("pps_rpl_info_in_ph_flag")?;
            pps_sao_info_in_ph_flag = reader.read_flag("pps_sao_info_in_ph_flag")?;
            pps_alf_info_in_ph_flag = reader.read_flag("pps_alf_info_in_ph_flag")?;
            if (pps_weighted_pred_flag || pps_weighted_bipred_flag) && pps_rpl_info_in_ph_flag {
                pps_wp_info_in_ph_flag = reader.read_flag("pps_wp_info_in_ph_flag")?;
            }
            pps_qp_delta_info_in_ph_flag = reader.read_flag("pps_qp_delta_info_in_ph_flag")?;
        }

        let pps_picture_header_extension_present_flag =
            reader.read_flag("pps_picture_header_extension_present_flag")?;
        let pps_slice_header_extension_present_flag = reader.read_flag("pps_slice_header_extension_present_flag")?;
        if reader.read_flag("pps_extension_flag")? {
            reader.skip_extension_data("pps_extension_data_flag")?;
        }
        reader.read_rbsp_trailing_bits()?;

        Ok(Self {
            pps_pic_parameter_set_id,
            pps_seq_parameter_set_id,
            pps_mixed_nalu_types_in_pic_flag,
            pps_pic_width_in_luma_samples,
            pps_pic_height_in_luma_samples,
            conformance_window,
            scaling_window,
            pps_output_flag_present_flag,
            pps_no_pic_partition_flag,
            pps_subpic_id_mapping_present_flag,
            pps_num_subpics_minus1,
            pps_subpic_id_len_minus1,
            pps_subpic_id,
            pps_log2_ctu_size_minus5,
            pps_tile_column_width_minus1,
            pps_tile_row_height_minus1,
            pps_loop_filter_across_tiles_enabled_flag,
            pps_rect_slice_flag,
            pps_single_slice_per_subpic_flag,
            pps_num_slices_in_pic_minus1,
            pps_tile_idx_delta_present_flag,
            explicit_slices,
            pps_loop_filter_across_slices_enabled_flag,
            pps_cabac_init_present_flag,
            pps_num_ref_idx_default_active_minus1,
            pps_rpl1_idx_present_flag,
            pps_weighted_pred_flag,
            pps_weighted_bipred_flag,
            pps_ref_wraparound_enabled_flag,
            pps_pic_width_minus_wraparound_offset,
            pps_init_qp_minus26: pps_init_qp_minus26 as i8,
            pps_cu_qp_delta_enabled_flag,
            chroma_qp_offsets,
            deblocking,
            pps_rpl_info_in_ph_flag,
            pps_sao_info_in_ph_flag,
            pps_alf_info_in_ph_flag,
            pps_wp_info_in_ph_flag,
            pps_qp_delta_info_in_ph_flag,
            pps_picture_header_extension_present_flag,
            pps_slice_header_extension_present_flag,
            sps,
            tile_layout,
            slice_map,
            subpic_id_val,
        })
    }

    /// `PicWidthInCtbsY`, rounded up.
    pub fn pic_width_in_ctbs_y(&self) -> u32 {
        self.pps_pic_width_in_luma_samples.div_ceil(self.sps.ctb_size_y())
    }

    /// `PicHeightInCtbsY`, rounded up.
    pub fn pic_height_in_ctbs_y(&self) -> u32 {
        self.pps_pic_height_in_luma_samples.div_ceil(self.sps.ctb_size_y())
    }

    /// `PicSizeInCtbsY`.
    pub fn pic_size_in_ctbs_y(&self) -> u32 {
        self.pic_width_in_ctbs_y() * self.pic_height_in_ctbs_y()
    }

    pub fn pic_width_in_min_cbs_y(&self) -> u32 {
        self.pps_pic_width_in_luma_samples / self.sps.min_cb_size_y()
    }

    pub fn pic_height_in_min_cbs_y(&self) -> u32 {
        self.pps_pic_height_in_luma_samples / self.sps.min_cb_size_y()
    }

    pub fn pic_size_in_min_cbs_y(&self) -> u32 {
        self.pic_width_in_min_cbs_y() * self.pic_height_in_min_cbs_y()
    }

    pub fn pic_size_in_samples_y(&self) -> u64 {
        self.pps_pic_width_in_luma_samples as u64 * self.pps_pic_height_in_luma_samples as u64
    }

    /// `PicWidthInSamplesC`.
    pub fn pic_width_in_samples_c(&self) -> u32 {
        self.pps_pic_width_in_luma_samples / self.sps.sub_width_c()
    }

    /// `PicHeightInSamplesC`.
    pub fn pic_height_in_samples_c(&self) -> u32 {
        self.pps_pic_height_in_luma_samples / self.sps.sub_height_c()
    }

    #[inline]
    pub fn tile_layout(&self) -> &TileLayout {
        &self.tile_layout
    }

    /// The rectangular slice layout, `None` for raster scan slices.
    #[inline]
    pub fn slice_map(&self) -> Option<&SliceMap> {
        self.slice_map.as_ref()
    }

    /// `SubpicIdVal`.
    pub fn subpic_id_val(&self) -> &[u32] {
        &self.subpic_id_val
    }

    /// `NumSlicesInPic` for rectangular slices.
    pub fn num_slices_in_pic(&self) -> u32 {
        self.pps_num_slices_in_pic_minus1 + 1
    }

    /// The deblocking control, or defaults when the PPS does not signal it.
    pub fn deblocking_or_default(&self) -> PpsDeblocking {
        self.deblocking.unwrap_or_default()
    }
}

fn read_tile_sizes(
    reader: &mut RbspReader,
    name: &'static str,
    num_exp_minus1: u64,
    extent_in_ctbs: u32,
) -> Result<Vec<u32>> {
    (0..=num_exp_minus1)
        .map(|_| {
            let size_minus1 = reader.read_uev(name)?;
            crate::range_check::check(name, size_minus1 as i64, 0, extent_in_ctbs as i64 - 1)?;
            Ok(size_minus1 as u32)
        })
        .collect()
}

fn parse_chroma_qp_offsets(reader: &mut RbspReader) -> Result<PpsChromaQpOffsets> {
    let pps_cb_qp_offset = read_qp_offset(reader, "pps_cb_qp_offset")?;
    let pps_cr_qp_offset = read_qp_offset(reader, "pps_cr_qp_offset")?;
    let mut offsets = PpsChromaQpOffsets {
        pps_cb_qp_offset,
        pps_cr_qp_offset,
        ..Default::default()
    };

    offsets.pps_joint_cbcr_qp_offset_present_flag = reader.read_flag("pps_joint_cbcr_qp_offset_present_flag")?;
    if offsets.pps_joint_cbcr_qp_offset_present_flag {
        offsets.pps_joint_cbcr_qp_offset_value = read_qp_offset(reader, "pps_joint_cbcr_qp_offset_value")?;
    }
    offsets.pps_slice_chroma_qp_offsets_present_flag = reader.read_flag("pps_slice_chroma_qp_offsets_present_flag")?;
    offsets.pps_cu_chroma_qp_offset_list_enabled_flag =
        reader.read_flag("pps_cu_chroma_qp_offset_list_enabled_flag")?;

    if offsets.pps_cu_chroma_qp_offset_list_enabled_flag {
        let pps_chroma_qp_offset_list_len_minus1 = reader.read_uev("pps_chroma_qp_offset_list_len_minus1")?;
        range_check!(pps_chroma_qp_offset_list_len_minus1, 0, 5)?;
        for _ in 0..=pps_chroma_qp_offset_list_len_minus1 {
            offsets
                .pps_cb_qp_offset_list
                .push(read_qp_offset(reader, "pps_cb_qp_offset_list")?);
            offsets
                .pps_cr_qp_offset_list
                .push(read_qp_offset(reader, "pps_cr_qp_offset_list")?);
            if offsets.pps_joint_cbcr_qp_offset_present_flag {
                offsets
                    .pps_joint_cbcr_qp_offset_list
                    .push(read_qp_offset(reader, "pps_joint_cbcr_qp_offset_list")?);
            }
        }
    }

    Ok(offsets)
}

/// Reads an `se(v)` offset in \[-12, 12\].
fn read_qp_offset(reader: &mut RbspReader, name: &'static str) -> Result<i8> {
    let value = reader.read_sev(name)?;
    crate::range_check::check(name, value, -12, 12)?;
    Ok(value as i8)
}

impl From<ConformanceWindow> for ScalingWindow {
    fn from(window: ConformanceWindow) -> Self {
        Self {
            left_offset: window.left_offset as i32,
            right_offset: window.right_offset as i32,
            top_offset: window.top_offset as i32,
            bottom_offset: window.bottom_offset as i32,
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::Pps;
    use crate::reader::RbspReader;
    use crate::registry::ParameterSets;
    use crate::sps::Sps;
    use crate::test_util::{TestPps, TestSps, TestTiles};
    use crate::VvcError;

    fn registry(sps: TestSps) -> ParameterSets {
        let mut sets = ParameterSets::new();
        let data = sps.rbsp();
        sets.insert_sps(Sps::parse(&mut RbspReader::new(&data)).unwrap());
        sets
    }

    #[test]
    fn single_tile() {
        let sets = registry(TestSps {
            log2_ctu_size_minus5: 1,
            ..Default::default()
        });
        let data = TestPps {
            pps_id: 5,
            width: 1920,
            height: 1088,
            ..Default::default()
        }
        .rbsp(6);

        let pps = Pps::parse(&mut RbspReader::new(&data), &sets).unwrap();
        assert_eq!(pps.pps_pic_parameter_set_id, 5);
        assert!(pps.pps_no_pic_partition_flag);
        assert_eq!(pps.pic_width_in_ctbs_y(), 30);
        assert_eq!(pps.pic_height_in_ctbs_y(), 17);
        assert_eq!(pps.pic_size_in_ctbs_y(), 510);
        assert_eq!(pps.pic_width_in_samples_c(), 960);
        assert_eq!(pps.tile_layout().num_tiles_in_pic(), 1);
        let slices = pps.slice_map().unwrap();
        assert_eq!(slices.num_slices(), 1);
        assert_eq!(slices.num_ctus_in_slice(0), 510);
        assert_eq!(pps.subpic_id_val(), [0]);
    }

    #[test]
    fn tiles_and_rect_slices() {
        // 1920x1088 with 128 luma CTUs is 15x9 CTBs
        let sets = registry(TestSps::default());
        let data = TestPps {
            width: 1920,
            height: 1088,
            tiles: Some(TestTiles {
                column_widths_minus1: vec![7],
                row_heights_minus1: vec![4],
                // one slice over the top tile row, the last one takes the rest
                rect_slices: Some((1, vec![1, 0])),
            }),
            rpl_info_in_ph: true,
            ..Default::default()
        }
        .rbsp(7);

        let pps = Pps::parse(&mut RbspReader::new(&data), &sets).unwrap();
        let tiles = pps.tile_layout();
        assert_eq!(tiles.col_width_val(), [8, 7]);
        assert_eq!(tiles.row_height_val(), [5, 4]);
        assert!(pps.pps_rect_slice_flag);
        assert!(pps.pps_rpl_info_in_ph_flag);
        let slices = pps.slice_map().unwrap();
        assert_eq!(slices.num_slices(), 2);
        assert_eq!(slices.num_ctus_in_slice(0), 75);
        assert_eq!(slices.num_ctus_in_slice(1), 60);
        assert_eq!(slices.slice_top_left_tile_idx(1), Some(2));
    }

    #[test]
    fn raster_slices() {
        let sets = registry(TestSps::default());
        let data = TestPps {
            width: 1920,
            height: 1088,
            tiles: Some(TestTiles {
                column_widths_minus1: vec![4],
                row_heights_minus1: vec![8],
                rect_slices: None,
            }),
            ..Default::default()
        }
        .rbsp(7);

        let pps = Pps::parse(&mut RbspReader::new(&data), &sets).unwrap();
        assert!(!pps.pps_rect_slice_flag);
        assert!(pps.slice_map().is_none());
        assert_eq!(pps.tile_layout().num_tiles_in_pic(), 3);
    }

    #[test]
    fn unknown_sps() {
        let data = TestPps {
            sps_id: 4,
            width: 1920,
            height: 1088,
            ..Default::default()
        }
        .rbsp(7);
        assert!(matches!(
            Pps::parse(&mut RbspReader::new(&data), &ParameterSets::new()).unwrap_err(),
            VvcError::ReferenceNotFound { kind: "SPS", id: 4 }
        ));
    }

    #[test]
    fn size_must_match_sps() {
        let sets = registry(TestSps::default());
        let data = TestPps {
            width: 1280,
            height: 1088,
            ..Default::default()
        }
        .rbsp(7);
        assert_eq!(
            Pps::parse(&mut RbspReader::new(&data), &sets).unwrap_err().to_string(),
            "pps_pic_width_in_luma_samples is out of range [1920, 1920]: 1280"
        );
    }
}
