//! Bitstream builders shared by the unit tests.

use scuffle_bytes_util::BitWriter;
use scuffle_expgolomb::BitWriterExpGolombExt;

use crate::NALUnitType;
use crate::pps::{Pps, TileLayout};
use crate::reader::RbspReader;
use crate::registry::ParameterSets;
use crate::sps::Sps;

/// Writes RBSP syntax elements MSB first.
pub(crate) struct RbspBuilder {
    writer: BitWriter<Vec<u8>>,
    bits: usize,
}

const fn exp_golomb_len(code: u64) -> usize {
    let leading = 63 - (code + 1).leading_zeros() as usize;
    2 * leading + 1
}

impl RbspBuilder {
    pub(crate) fn new() -> Self {
        Self {
            writer: BitWriter::new(Vec::new()),
            bits: 0,
        }
    }

    pub(crate) const fn bit_len(&self) -> usize {
        self.bits
    }

    pub(crate) fn bits(mut self, value: u64, count: u8) -> Self {
        self.writer.write_bits(value, count).unwrap();
        self.bits += count as usize;
        self
    }

    pub(crate) fn flag(mut self, value: bool) -> Self {
        self.writer.write_bit(value).unwrap();
        self.bits += 1;
        self
    }

    pub(crate) fn ue(mut self, value: u64) -> Self {
        self.writer.write_exp_golomb(value).unwrap();
        self.bits += exp_golomb_len(value);
        self
    }

    pub(crate) fn se(mut self, value: i64) -> Self {
        self.writer.write_signed_exp_golomb(value).unwrap();
        let code = if value > 0 { 2 * value as u64 - 1 } else { 2 * value.unsigned_abs() };
        self.bits += exp_golomb_len(code);
        self
    }

    /// Pads with zero bits up to the next byte boundary.
    pub(crate) fn zero_align(mut self) -> Self {
        while self.bits % 8 != 0 {
            self = self.flag(false);
        }
        self
    }

    /// Appends `rbsp_trailing_bits()` and returns the bytes.
    pub(crate) fn trailing(self) -> Vec<u8> {
        self.flag(true).zero_align().writer.finish().unwrap()
    }

    /// Returns the bytes written so far, which must be byte aligned.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        assert_eq!(self.bits % 8, 0);
        self.writer.finish().unwrap()
    }
}

/// Prepends a NAL unit header and inserts emulation prevention bytes.
pub(crate) fn nal_unit(nal_unit_type: NALUnitType, temporal_id: u8, rbsp: &[u8]) -> Vec<u8> {
    let mut nal = vec![0x00, (nal_unit_type.0 << 3) | (temporal_id + 1)];
    let mut zeros = 0;
    for &byte in rbsp {
        if zeros >= 2 && byte <= 0x03 {
            nal.push(0x03);
            zeros = 0;
        }
        zeros = if byte == 0 { zeros + 1 } else { 0 };
        nal.push(byte);
    }
    nal
}

/// Joins NAL units with four byte start codes.
pub(crate) fn annex_b(nal_units: &[Vec<u8>]) -> Vec<u8> {
    nal_units
        .iter()
        .flat_map(|nal| [0x00, 0x00, 0x00, 0x01].into_iter().chain(nal.iter().copied()))
        .collect()
}

/// A sequence parameter set with every optional coding tool disabled.
///
/// Only the fields the tests vary are configurable.
#[derive(Debug, Clone)]
pub(crate) struct TestSps {
    pub sps_id: u8,
    pub chroma_format_idc: u8,
    pub log2_ctu_size_minus5: u8,
    pub width: u64,
    pub height: u64,
    pub log2_max_poc_lsb_minus4: u8,
    pub poc_msb_cycle_len: Option<u8>,
    pub idr_rpl_present: bool,
    /// Short-term delta POCs of each list 0 template. List 1 reuses list 0.
    pub rpl_templates: Vec<Vec<i64>>,
    pub alf: bool,
    pub lmcs: bool,
    pub explicit_scaling_list: bool,
    pub entry_points: bool,
    pub temporal_mvp: bool,
    pub weighted_pred: bool,
}

impl Default for TestSps {
    fn default() -> Self {
        Self {
            sps_id: 0,
            chroma_format_idc: 1,
            log2_ctu_size_minus5: 2,
            width: 1920,
            height: 1088,
            log2_max_poc_lsb_minus4: 0,
            poc_msb_cycle_len: None,
            idr_rpl_present: false,
            rpl_templates: Vec::new(),
            alf: false,
            lmcs: false,
            explicit_scaling_list: false,
            entry_points: false,
            temporal_mvp: false,
            weighted_pred: false,
        }
    }
}

impl TestSps {
    pub(crate) fn rbsp(&self) -> Vec<u8> {
        let mut b = RbspBuilder::new()
            .bits(self.sps_id as u64, 4) // sps_seq_parameter_set_id
            .bits(0, 4) // sps_video_parameter_set_id
            .bits(0, 3) // sps_max_sublayers_minus1
            .bits(self.chroma_format_idc as u64, 2)
            .bits(self.log2_ctu_size_minus5 as u64, 2)
            .flag(true) // sps_ptl_dpb_hrd_params_present_flag
            // profile_tier_level(1, 0)
            .bits(1, 7) // general_profile_idc
            .flag(false) // general_tier_flag
            .bits(51, 8) // general_level_idc
            .flag(true) // ptl_frame_only_constraint_flag
            .flag(false) // ptl_multilayer_enabled_flag
            .flag(false) // gci_present_flag
            .zero_align() // gci_alignment_zero_bit
            .bits(0, 8) // ptl_num_sub_profiles
            .flag(false) // sps_gdr_enabled_flag
            .flag(false) // sps_ref_pic_resampling_enabled_flag
            .ue(self.width)
            .ue(self.height)
            .flag(false) // sps_conformance_window_flag
            .flag(false) // sps_subpic_info_present_flag
            .ue(2) // sps_bitdepth_minus8
            .flag(self.entry_points) // sps_entropy_coding_sync_enabled_flag
            .flag(self.entry_points) // sps_entry_point_offsets_present_flag
            .bits(self.log2_max_poc_lsb_minus4 as u64, 4);
        b = b.flag(self.poc_msb_cycle_len.is_some());
        if let Some(len) = self.poc_msb_cycle_len {
            b = b.ue(len as u64 - 1);
        }
        b = b
            .bits(0, 2) // sps_num_extra_ph_bytes
            .bits(0, 2) // sps_num_extra_sh_bytes
            // dpb_parameters(0, 0)
            .ue(4)
            .ue(2)
            .ue(0)
            .ue(0) // sps_log2_min_luma_coding_block_size_minus2
            .flag(false) // sps_partition_constraints_override_enabled_flag
            .ue(1) // sps_log2_diff_min_qt_min_cb_intra_slice_luma
            .ue(0); // sps_max_mtt_hierarchy_depth_intra_slice_luma
        if self.chroma_format_idc != 0 {
            b = b.flag(false); // sps_qtbtt_dual_tree_intra_flag
        }
        b = b
            .ue(1) // sps_log2_diff_min_qt_min_cb_inter_slice
            .ue(0); // sps_max_mtt_hierarchy_depth_inter_slice
        if self.log2_ctu_size_minus5 > 0 {
            b = b.flag(false); // sps_max_luma_transform_size_64_flag
        }
        b = b
            .flag(false) // sps_transform_skip_enabled_flag
            .flag(false) // sps_mts_enabled_flag
            .flag(false); // sps_lfnst_enabled_flag
        if self.chroma_format_idc != 0 {
            b = b.flag(false); // sps_joint_cbcr_enabled_flag
            b = b.flag(true); // sps_same_qp_table_for_chroma_flag
            // chroma qp table 0: identity with a single point
            b = b.se(0).ue(0).ue(0).ue(1);
        }
        b = b
            .flag(false) // sps_sao_enabled_flag
            .flag(self.alf); // sps_alf_enabled_flag
        if self.alf && self.chroma_format_idc != 0 {
            b = b.flag(false); // sps_ccalf_enabled_flag
        }
        b = b
            .flag(self.lmcs)
            .flag(self.weighted_pred) // sps_weighted_pred_flag
            .flag(false) // sps_weighted_bipred_flag
            .flag(false) // sps_long_term_ref_pics_flag
            .flag(self.idr_rpl_present)
            .flag(true); // sps_rpl1_same_as_rpl0_flag
        b = b.ue(self.rpl_templates.len() as u64);
        for template in &self.rpl_templates {
            b = b.ue(template.len() as u64);
            let mut previous = 0;
            for (i, &delta) in template.iter().enumerate() {
                // without weighted prediction AbsDeltaPocSt is abs_delta_poc_st + 1
                let step = delta - previous;
                previous = delta;
                let abs = step.unsigned_abs();
                let code = if self.weighted_pred && i != 0 { abs } else { abs - 1 };
                b = b.ue(code);
                if abs > 0 {
                    b = b.flag(step < 0); // strp_entry_sign_flag
                }
            }
        }
        b = b
            .flag(false) // sps_ref_wraparound_enabled_flag
            .flag(self.temporal_mvp);
        if self.temporal_mvp {
            b = b.flag(false); // sps_sbtmvp_enabled_flag
        }
        b = b
            .flag(false) // sps_amvr_enabled_flag
            .flag(false) // sps_bdof_enabled_flag
            .flag(false) // sps_smvd_enabled_flag
            .flag(false) // sps_dmvr_enabled_flag
            .flag(false) // sps_mmvd_enabled_flag
            .ue(0) // sps_six_minus_max_num_merge_cand
            .flag(false) // sps_sbt_enabled_flag
            .flag(false) // sps_affine_enabled_flag
            .flag(false) // sps_bcw_enabled_flag
            .flag(false) // sps_ciip_enabled_flag
            // MaxNumMergeCand is 6 so sps_gpm_enabled_flag is present
            .flag(false)
            .ue(0) // sps_log2_parallel_merge_level_minus2
            .flag(false) // sps_isp_enabled_flag
            .flag(false) // sps_mrl_enabled_flag
            .flag(false); // sps_mip_enabled_flag
        if self.chroma_format_idc != 0 {
            b = b.flag(false); // sps_cclm_enabled_flag
        }
        if self.chroma_format_idc == 1 {
            b = b.flag(false).flag(false); // chroma vertical and horizontal collocated flags
        }
        b = b
            .flag(false) // sps_palette_enabled_flag
            .flag(false) // sps_ibc_enabled_flag
            .flag(false) // sps_ladf_enabled_flag
            .flag(self.explicit_scaling_list)
            .flag(false) // sps_dep_quant_enabled_flag
            .flag(false) // sps_sign_data_hiding_enabled_flag
            .flag(false) // sps_virtual_boundaries_enabled_flag
            .flag(false) // sps_timing_hrd_params_present_flag
            .flag(false) // sps_field_seq_flag
            .flag(false) // sps_vui_parameters_present_flag
            .flag(false); // sps_extension_flag
        b.trailing()
    }
}

/// A picture parameter set with a single tile and slice unless configured otherwise.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestPps {
    pub pps_id: u8,
    pub sps_id: u8,
    pub width: u64,
    pub height: u64,
    pub tiles: Option<TestTiles>,
    pub rpl_info_in_ph: bool,
    pub wp_info_in_ph: bool,
    pub weighted_pred: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TestTiles {
    pub column_widths_minus1: Vec<u64>,
    pub row_heights_minus1: Vec<u64>,
    /// `pps_num_slices_in_pic_minus1` and the `ue(v)` slice layout elements that follow it.
    ///
    /// `None` selects raster scan slices.
    pub rect_slices: Option<(u64, Vec<u64>)>,
}

impl TestPps {
    pub(crate) fn rbsp(&self, log2_ctu_size: u8) -> Vec<u8> {
        let mut b = RbspBuilder::new()
            .bits(self.pps_id as u64, 6)
            .bits(self.sps_id as u64, 4)
            .flag(false) // pps_mixed_nalu_types_in_pic_flag
            .ue(self.width)
            .ue(self.height)
            .flag(false) // pps_conformance_window_flag
            .flag(false) // pps_scaling_window_explicit_signalling_flag
            .flag(false) // pps_output_flag_present_flag
            .flag(self.tiles.is_none()) // pps_no_pic_partition_flag
            .flag(false); // pps_subpic_id_mapping_present_flag
        if let Some(tiles) = &self.tiles {
            b = b
                .bits(log2_ctu_size as u64 - 5, 2)
                .ue(tiles.column_widths_minus1.len() as u64 - 1)
                .ue(tiles.row_heights_minus1.len() as u64 - 1);
            for &w in &tiles.column_widths_minus1 {
                b = b.ue(w);
            }
            for &h in &tiles.row_heights_minus1 {
                b = b.ue(h);
            }
            let ctb_size = 1u64 << log2_ctu_size;
            let columns = tiles.column_widths_minus1.iter().map(|&w| w as u32).collect::<Vec<_>>();
            let rows = tiles.row_heights_minus1.iter().map(|&h| h as u32).collect::<Vec<_>>();
            let num_tiles = TileLayout::new(
                self.width.div_ceil(ctb_size) as u32,
                self.height.div_ceil(ctb_size) as u32,
                &columns,
                &rows,
            )
            .unwrap()
            .num_tiles_in_pic();
            if num_tiles > 1 {
                b = b
                    .flag(false) // pps_loop_filter_across_tiles_enabled_flag
                    .flag(tiles.rect_slices.is_some());
            }
            if let Some((num_slices_minus1, layout)) = &tiles.rect_slices {
                b = b.flag(false).ue(*num_slices_minus1); // pps_single_slice_per_subpic_flag
                if *num_slices_minus1 > 1 {
                    b = b.flag(false); // pps_tile_idx_delta_present_flag
                }
                for &value in layout {
                    b = b.ue(value);
                }
            }
            if tiles.rect_slices.as_ref().is_none_or(|(n, _)| *n > 0) {
                b = b.flag(false); // pps_loop_filter_across_slices_enabled_flag
            }
        }
        b = b
            .flag(false) // pps_cabac_init_present_flag
            .ue(0)
            .ue(0) // pps_num_ref_idx_default_active_minus1
            .flag(false) // pps_rpl1_idx_present_flag
            .flag(self.weighted_pred) // pps_weighted_pred_flag
            .flag(false) // pps_weighted_bipred_flag
            .flag(false) // pps_ref_wraparound_enabled_flag
            .se(0) // pps_init_qp_minus26
            .flag(false) // pps_cu_qp_delta_enabled_flag
            .flag(false) // pps_chroma_tool_offsets_present_flag
            .flag(false); // pps_deblocking_filter_control_present_flag
        if self.tiles.is_some() {
            b = b
                .flag(self.rpl_info_in_ph)
                .flag(false) // pps_sao_info_in_ph_flag
                .flag(false); // pps_alf_info_in_ph_flag
            if self.weighted_pred && self.rpl_info_in_ph {
                b = b.flag(self.wp_info_in_ph);
            }
            b = b.flag(false); // pps_qp_delta_info_in_ph_flag
        }
        b = b
            .flag(false) // pps_picture_header_extension_present_flag
            .flag(false) // pps_slice_header_extension_present_flag
            .flag(false); // pps_extension_flag
        b.trailing()
    }
}

/// Parameter sets holding the given SPS and PPS.
pub(crate) fn parameter_sets(sps: TestSps, pps: TestPps) -> ParameterSets {
    let mut sets = ParameterSets::new();
    let log2_ctu_size = sps.log2_ctu_size_minus5 + 5;
    sets.insert_sps(Sps::parse(&mut RbspReader::new(&sps.rbsp())).unwrap());
    let pps = Pps::parse(&mut RbspReader::new(&pps.rbsp(log2_ctu_size)), &sets).unwrap();
    sets.insert_pps(pps);
    sets
}
