//! Slice header.

use std::sync::Arc;

use crate::NALUnitType;
use crate::enums::{ApsParamsType, SliceType};
use crate::error::{Result, VvcError};
use crate::picture_header::{AlfSelection, DeblockingParams, PictureHeader, SH_ALF_NAMES, SH_DEBLOCKING_NAMES};
use crate::pred_weight_table::PredWeightTable;
use crate::range_check::range_check;
use crate::reader::{RbspReader, ceil_log2};
use crate::ref_pic_lists::RefPicLists;
use crate::registry::ParameterSets;

/// `slice_header()`.
///
/// Values that are not signalled in the slice header are inherited from the picture header.
///
/// ISO/IEC 23090-3 - 7.3.7
#[derive(Debug, Clone, PartialEq)]
pub struct SliceHeader {
    pub sh_picture_header_in_slice_header_flag: bool,
    pub sh_subpic_id: u32,
    pub sh_slice_address: u32,
    pub sh_extra_bit: Vec<bool>,
    pub sh_num_tiles_in_slice_minus1: u32,
    pub sh_slice_type: SliceType,
    pub sh_no_output_of_prior_pics_flag: bool,
    pub alf: AlfSelection,
    pub sh_lmcs_used_flag: bool,
    pub sh_explicit_scaling_list_used_flag: bool,
    /// Empty lists for IDR slices that do not carry reference picture lists.
    pub ref_pic_lists: RefPicLists,
    pub sh_num_ref_idx_active_override_flag: bool,
    pub sh_num_ref_idx_active_minus1: [u8; 2],
    pub sh_cabac_init_flag: bool,
    pub sh_collocated_from_l0_flag: bool,
    pub sh_collocated_ref_idx: u8,
    pub pred_weight_table: Option<PredWeightTable>,
    pub sh_qp_delta: i8,
    pub sh_cb_qp_offset: i8,
    pub sh_cr_qp_offset: i8,
    pub sh_joint_cbcr_qp_offset: i8,
    pub sh_cu_chroma_qp_offset_enabled_flag: bool,
    pub sh_sao_luma_used_flag: bool,
    pub sh_sao_chroma_used_flag: bool,
    pub deblocking: DeblockingParams,
    pub sh_dep_quant_used_flag: bool,
    pub sh_sign_data_hiding_used_flag: bool,
    pub sh_ts_residual_coding_disabled_flag: bool,
    pub sh_ts_residual_coding_rice_idx_minus1: u8,
    pub sh_reverse_last_sig_coeff_flag: bool,
    pub sh_slice_header_extension_data_byte: Vec<u8>,
    pub sh_entry_offset_len_minus1: u8,
    pub entry_point_offset_minus1: Vec<u32>,

    /// The picture header of the slice, embedded or received before it.
    pub picture_header: Arc<PictureHeader>,

    // Calculated values
    num_ref_idx_active: [u32; 2],
    curr_subpic_idx: u32,
    slice_qp_y: i32,
    ctb_addr_in_curr_slice: Vec<u32>,
}

impl SliceHeader {
    /// Parses the slice header, ending at `byte_alignment()`.
    ///
    /// `picture_header` is the picture header received for the current picture, if any. It is
    /// only used when the slice header does not carry its own. `previous` is handed to the POC
    /// derivation of an embedded picture header.
    pub fn parse(
        reader: &mut RbspReader,
        nal_unit_type: NALUnitType,
        parameter_sets: &ParameterSets,
        picture_header: Option<Arc<PictureHeader>>,
        previous: Option<&PictureHeader>,
    ) -> Result<Self> {
        let sh_picture_header_in_slice_header_flag = reader.read_flag("sh_picture_header_in_slice_header_flag")?;
        let ph = if sh_picture_header_in_slice_header_flag {
            Arc::new(PictureHeader::parse(reader, parameter_sets, nal_unit_type, previous)?)
        } else {
            picture_header.ok_or(VvcError::MissingPictureHeader)?
        };

        let pps = ph.pps.clone();
        let sps = pps.sps.clone();
        let chroma = sps.chroma_array_type() != 0;

        let mut sh_subpic_id = 0;
        let mut curr_subpic_idx = 0;
        if sps.subpic_info.sps_subpic_info_present_flag {
            sh_subpic_id = reader.read_bits("sh_subpic_id", sps.subpic_info.sps_subpic_id_len_minus1 as u32 + 1)? as u32;
            curr_subpic_idx = pps
                .subpic_id_val()
                .iter()
                .position(|&id| id == sh_subpic_id)
                .ok_or(VvcError::ReferenceNotFound {
                    kind: "subpicture",
                    id: sh_subpic_id,
                })? as u32;
        }

        let tiles = pps.tile_layout();
        let num_tiles_in_pic = tiles.num_tiles_in_pic();
        let num_addresses = match pps.slice_map() {
            Some(slices) => slices.num_slices_in_subpic(curr_subpic_idx as usize),
            None => num_tiles_in_pic,
        };
        let mut sh_slice_address = 0;
        if num_addresses > 1 {
            sh_slice_address = reader.read_bits("sh_slice_address", ceil_log2(num_addresses as u64))? as u32;
            range_check!(sh_slice_address, 0, num_addresses - 1)?;
        }

        let sh_extra_bit = (0..sps.num_extra_sh_bits())
            .map(|_| reader.read_flag("sh_extra_bit"))
            .collect::<Result<Vec<_>>>()?;

        let mut sh_num_tiles_in_slice_minus1 = 0;
        if pps.slice_map().is_none() && num_tiles_in_pic - sh_slice_address > 1 {
            sh_num_tiles_in_slice_minus1 = reader.read_uev("sh_num_tiles_in_slice_minus1")? as u32;
            range_check!(sh_num_tiles_in_slice_minus1, 0, num_tiles_in_pic - sh_slice_address - 1)?;
        }

        let sh_slice_type = if ph.ph_inter_slice_allowed_flag {
            let sh_slice_type = reader.read_uev("sh_slice_type")?;
            range_check!(sh_slice_type, 0, if ph.ph_intra_slice_allowed_flag { 2 } else { 1 })?;
            SliceType(sh_slice_type as u8)
        } else {
            SliceType::I
        };

        let sh_no_output_of_prior_pics_flag = (nal_unit_type.is_irap() || nal_unit_type == NALUnitType::GdrNut)
            && reader.read_flag("sh_no_output_of_prior_pics_flag")?;

        let alf = if sps.sps_alf_enabled_flag && !pps.pps_alf_info_in_ph_flag {
            AlfSelection::parse(reader, SH_ALF_NAMES, chroma, sps.sps_ccalf_enabled_flag)?
        } else {
            ph.alf.clone()
        };

        let sh_lmcs_used_flag = if sh_picture_header_in_slice_header_flag {
            ph.ph_lmcs_enabled_flag
        } else {
            ph.ph_lmcs_enabled_flag && reader.read_flag("sh_lmcs_used_flag")?
        };
        let sh_explicit_scaling_list_used_flag = if sh_picture_header_in_slice_header_flag {
            ph.ph_explicit_scaling_list_enabled_flag
        } else {
            ph.ph_explicit_scaling_list_enabled_flag && reader.read_flag("sh_explicit_scaling_list_used_flag")?
        };

        let ref_pic_lists = if pps.pps_rpl_info_in_ph_flag {
            ph.ref_pic_lists.clone().unwrap_or_default()
        } else if !nal_unit_type.is_idr() || sps.sps_idr_rpl_present_flag {
            RefPicLists::parse(reader, &sps, pps.pps_rpl1_idx_present_flag)?
        } else {
            RefPicLists::default()
        };
        let num_entries = [
            ref_pic_lists.lists[0].num_ref_entries(),
            ref_pic_lists.lists[1].num_ref_entries(),
        ];

        let is_b = sh_slice_type == SliceType::B;
        let is_p = sh_slice_type == SliceType::P;
        let active_lists = if is_b { 2 } else { 1 };

        let mut sh_num_ref_idx_active_override_flag = false;
        let mut sh_num_ref_idx_active_minus1 = [0; 2];
        if (sh_slice_type != SliceType::I && num_entries[0] > 1) || (is_b && num_entries[1] > 1) {
            sh_num_ref_idx_active_override_flag = reader.read_flag("sh_num_ref_idx_active_override_flag")?;
            if sh_num_ref_idx_active_override_flag {
                for i in 0..active_lists {
                    if num_entries[i] > 1 {
                        let minus1 = reader.read_uev("sh_num_ref_idx_active_minus1")?;
                        range_check!("sh_num_ref_idx_active_minus1", minus1, 0, 14)?;
                        sh_num_ref_idx_active_minus1[i] = minus1 as u8;
                    }
                }
            }
        }

        // (138)
        let mut num_ref_idx_active = [0; 2];
        for i in 0..2 {
            if is_b || (is_p && i == 0) {
                num_ref_idx_active[i] = if sh_num_ref_idx_active_override_flag {
                    sh_num_ref_idx_active_minus1[i] as u32 + 1
                } else {
                    (num_entries[i] as u32).min(pps.pps_num_ref_idx_default_active_minus1[i] as u32 + 1)
                };
            }
        }

        let mut sh_cabac_init_flag = false;
        let mut sh_collocated_from_l0_flag = if is_b && pps.pps_rpl_info_in_ph_flag {
            ph.ph_collocated_from_l0_flag
        } else {
            true
        };
        let mut sh_collocated_ref_idx = if pps.pps_rpl_info_in_ph_flag { ph.ph_collocated_ref_idx } else { 0 };
        let mut pred_weight_table = None;

        if sh_slice_type != SliceType::I {
            if pps.pps_cabac_init_present_flag {
                sh_cabac_init_flag = reader.read_flag("sh_cabac_init_flag")?;
            }

            if ph.ph_temporal_mvp_enabled_flag && !pps.pps_rpl_info_in_ph_flag {
                if is_b {
                    sh_collocated_from_l0_flag = reader.read_flag("sh_collocated_from_l0_flag")?;
                }
                let list = if sh_collocated_from_l0_flag { 0 } else { 1 };
                if num_ref_idx_active[list] > 1 {
                    let idx = reader.read_uev("sh_collocated_ref_idx")?;
                    range_check!("sh_collocated_ref_idx", idx, 0, num_ref_idx_active[list] - 1)?;
                    sh_collocated_ref_idx = idx as u8;
                }
            }

            if pps.pps_wp_info_in_ph_flag {
                pred_weight_table = ph.pred_weight_table.clone();
            } else if (pps.pps_weighted_pred_flag && is_p) || (pps.pps_weighted_bipred_flag && is_b) {
                pred_weight_table = Some(PredWeightTable::parse(
                    reader,
                    &sps,
                    &pps,
                    &ref_pic_lists,
                    num_ref_idx_active,
                )?);
            }
        }

        let mut sh_qp_delta = ph.ph_qp_delta;
        if !pps.pps_qp_delta_info_in_ph_flag {
            let qp_delta = reader.read_sev("sh_qp_delta")?;
            range_check!(
                "SliceQpY",
                26 + pps.pps_init_qp_minus26 as i64 + qp_delta,
                -sps.qp_bd_offset(),
                63
            )?;
            sh_qp_delta = qp_delta as i8;
        }
        let slice_qp_y = 26 + pps.pps_init_qp_minus26 as i32 + sh_qp_delta as i32;

        let mut sh_cb_qp_offset = 0;
        let mut sh_cr_qp_offset = 0;
        let mut sh_joint_cbcr_qp_offset = 0;
        let mut sh_cu_chroma_qp_offset_enabled_flag = false;
        if let Some(offsets) = &pps.chroma_qp_offsets {
            if offsets.pps_slice_chroma_qp_offsets_present_flag {
                sh_cb_qp_offset = read_chroma_qp_offset(reader, "sh_cb_qp_offset", offsets.pps_cb_qp_offset)?;
                sh_cr_qp_offset = read_chroma_qp_offset(reader, "sh_cr_qp_offset", offsets.pps_cr_qp_offset)?;
                if sps.sps_joint_cbcr_enabled_flag {
                    sh_joint_cbcr_qp_offset = read_chroma_qp_offset(
                        reader,
                        "sh_joint_cbcr_qp_offset",
                        offsets.pps_joint_cbcr_qp_offset_value,
                    )?;
                }
            }
            if offsets.pps_cu_chroma_qp_offset_list_enabled_flag {
                sh_cu_chroma_qp_offset_enabled_flag = reader.read_flag("sh_cu_chroma_qp_offset_enabled_flag")?;
            }
        }

        let mut sh_sao_luma_used_flag = ph.ph_sao_luma_enabled_flag;
        let mut sh_sao_chroma_used_flag = ph.ph_sao_chroma_enabled_flag;
        if sps.sps_sao_enabled_flag && !pps.pps_sao_info_in_ph_flag {
            sh_sao_luma_used_flag = reader.read_flag("sh_sao_luma_used_flag")?;
            sh_sao_chroma_used_flag = chroma && reader.read_flag("sh_sao_chroma_used_flag")?;
        }

        let deblocking_present = pps
            .deblocking
            .is_some_and(|d| d.pps_deblocking_filter_override_enabled_flag && !d.pps_dbf_info_in_ph_flag);
        let deblocking = DeblockingParams::parse(reader, SH_DEBLOCKING_NAMES, deblocking_present, &pps, ph.deblocking)?;

        let sh_dep_quant_used_flag = sps.sps_dep_quant_enabled_flag && reader.read_flag("sh_dep_quant_used_flag")?;
        let sh_sign_data_hiding_used_flag = sps.sps_sign_data_hiding_enabled_flag
            && !sh_dep_quant_used_flag
            && reader.read_flag("sh_sign_data_hiding_used_flag")?;
        let sh_ts_residual_coding_disabled_flag = sps.sps_transform_skip_enabled_flag
            && !sh_dep_quant_used_flag
            && !sh_sign_data_hiding_used_flag
            && reader.read_flag("sh_ts_residual_coding_disabled_flag")?;

        let mut sh_ts_residual_coding_rice_idx_minus1 = 0;
        if sps.range_extension.sps_ts_residual_coding_rice_present_in_sh_flag {
            sh_ts_residual_coding_rice_idx_minus1 = reader.read_bits("sh_ts_residual_coding_rice_idx_minus1", 3)? as u8;
        }
        let sh_reverse_last_sig_coeff_flag = sps.range_extension.sps_reverse_last_sig_coeff_enabled_flag
            && reader.read_flag("sh_reverse_last_sig_coeff_flag")?;

        let mut sh_slice_header_extension_data_byte = Vec::new();
        if pps.pps_slice_header_extension_present_flag {
            let sh_slice_header_extension_length = reader.read_uev("sh_slice_header_extension_length")?;
            range_check!(sh_slice_header_extension_length, 0, 256)?;
            for _ in 0..sh_slice_header_extension_length {
                sh_slice_header_extension_data_byte.push(reader.read_bits("sh_slice_header_extension_data_byte", 8)? as u8);
            }
        }

        // (112)
        let ctb_addr_in_curr_slice = match pps.slice_map() {
            Some(slices) => {
                let idx = slices
                    .pic_level_slice_idx(curr_subpic_idx, sh_slice_address)
                    .ok_or(VvcError::RangeViolation {
                        field: "sh_slice_address",
                        value: sh_slice_address as i64,
                        min: 0,
                        max: slices.num_slices_in_subpic(curr_subpic_idx as usize) as i64 - 1,
                    })?;
                slices.ctb_addr_in_slice(idx).unwrap_or_default().to_vec()
            }
            None => tiles.ctb_addrs_in_tiles(sh_slice_address, sh_num_tiles_in_slice_minus1 + 1),
        };

        // (140)
        let num_entry_points = if sps.sps_entry_point_offsets_present_flag {
            tiles.num_entry_points(&ctb_addr_in_curr_slice, sps.sps_entropy_coding_sync_enabled_flag)
        } else {
            0
        };

        let mut sh_entry_offset_len_minus1 = 0;
        let mut entry_point_offset_minus1 = Vec::with_capacity(num_entry_points as usize);
        if num_entry_points > 0 {
            let len_minus1 = reader.read_uev("sh_entry_offset_len_minus1")?;
            range_check!("sh_entry_offset_len_minus1", len_minus1, 0, 31)?;
            sh_entry_offset_len_minus1 = len_minus1 as u8;
            for _ in 0..num_entry_points {
                entry_point_offset_minus1
                    .push(reader.read_bits("entry_point_offset_minus1", len_minus1 as u32 + 1)? as u32);
            }
        }

        reader.read_byte_alignment()?;

        tracing::trace!(
            slice_type = sh_slice_type.letter(),
            address = sh_slice_address,
            ctus = ctb_addr_in_curr_slice.len(),
            "parsed slice header"
        );

        Ok(Self {
            sh_picture_header_in_slice_header_flag,
            sh_subpic_id,
            sh_slice_address,
            sh_extra_bit,
            sh_num_tiles_in_slice_minus1,
            sh_slice_type,
            sh_no_output_of_prior_pics_flag,
            alf,
            sh_lmcs_used_flag,
            sh_explicit_scaling_list_used_flag,
            ref_pic_lists,
            sh_num_ref_idx_active_override_flag,
            sh_num_ref_idx_active_minus1,
            sh_cabac_init_flag,
            sh_collocated_from_l0_flag,
            sh_collocated_ref_idx,
            pred_weight_table,
            sh_qp_delta,
            sh_cb_qp_offset,
            sh_cr_qp_offset,
            sh_joint_cbcr_qp_offset,
            sh_cu_chroma_qp_offset_enabled_flag,
            sh_sao_luma_used_flag,
            sh_sao_chroma_used_flag,
            deblocking,
            sh_dep_quant_used_flag,
            sh_sign_data_hiding_used_flag,
            sh_ts_residual_coding_disabled_flag,
            sh_ts_residual_coding_rice_idx_minus1,
            sh_reverse_last_sig_coeff_flag,
            sh_slice_header_extension_data_byte,
            sh_entry_offset_len_minus1,
            entry_point_offset_minus1,
            picture_header: ph,
            num_ref_idx_active,
            curr_subpic_idx,
            slice_qp_y,
            ctb_addr_in_curr_slice,
        })
    }

    /// `NumRefIdxActive[i]`.
    pub const fn num_ref_idx_active(&self, i: usize) -> u32 {
        self.num_ref_idx_active[i]
    }

    /// `CurrSubpicIdx`.
    pub const fn curr_subpic_idx(&self) -> u32 {
        self.curr_subpic_idx
    }

    /// `SliceQpY`.
    pub const fn slice_qp_y(&self) -> i32 {
        self.slice_qp_y
    }

    /// `CtbAddrInCurrSlice`.
    pub fn ctb_addr_in_curr_slice(&self) -> &[u32] {
        &self.ctb_addr_in_curr_slice
    }

    /// `NumCtusInCurrSlice`.
    pub fn num_ctus_in_curr_slice(&self) -> usize {
        self.ctb_addr_in_curr_slice.len()
    }

    /// `NumEntryPoints`.
    pub fn num_entry_points(&self) -> usize {
        self.entry_point_offset_minus1.len()
    }

    /// `PicOrderCntVal` of the picture this slice belongs to.
    pub fn pic_order_cnt_val(&self) -> i32 {
        self.picture_header.pic_order_cnt_val()
    }

    /// Fails if an APS used by this slice has not been received.
    pub fn check_aps_references(&self, parameter_sets: &ParameterSets) -> Result<()> {
        self.alf.check_references(parameter_sets)?;
        if self.sh_lmcs_used_flag {
            parameter_sets.aps(ApsParamsType::LmcsAps, self.picture_header.ph_lmcs_aps_id)?;
        }
        if self.sh_explicit_scaling_list_used_flag {
            parameter_sets.aps(ApsParamsType::ScalingAps, self.picture_header.ph_scaling_list_aps_id)?;
        }
        Ok(())
    }
}

/// Reads a slice chroma QP offset. The sum with the PPS offset must stay within \[-12, 12\].
fn read_chroma_qp_offset(reader: &mut RbspReader, name: &'static str, pps_offset: i8) -> Result<i8> {
    let offset = reader.read_sev(name)?;
    crate::range_check::check(name, offset, -12, 12)?;
    crate::range_check::check(name, offset + pps_offset as i64, -12, 12)?;
    Ok(offset as i8)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::SliceHeader;
    use crate::enums::SliceType;
    use crate::picture_header::PictureHeader;
    use crate::reader::RbspReader;
    use crate::registry::ParameterSets;
    use crate::test_util::{RbspBuilder, TestPps, TestSps, TestTiles, parameter_sets};
    use crate::{NALUnitType, VvcError};

    fn single_tile_pps() -> TestPps {
        TestPps {
            width: 1920,
            height: 1088,
            ..Default::default()
        }
    }

    #[test]
    fn idr_with_embedded_picture_header() {
        let sets = parameter_sets(TestSps::default(), single_tile_pps());
        let data = RbspBuilder::new()
            .flag(true) // sh_picture_header_in_slice_header_flag
            .flag(true) // ph_gdr_or_irap_pic_flag
            .flag(false)
            .flag(false)
            .flag(false) // ph_inter_slice_allowed_flag
            .ue(0)
            .bits(0, 4)
            .flag(false) // sh_no_output_of_prior_pics_flag
            .se(-4) // sh_qp_delta
            .trailing();

        let mut reader = RbspReader::new(&data);
        let sh = SliceHeader::parse(&mut reader, NALUnitType::IdrNLp, &sets, None, None).unwrap();
        assert_eq!(reader.bits_remaining(), 0);

        assert!(sh.sh_picture_header_in_slice_header_flag);
        assert_eq!(sh.sh_slice_type, SliceType::I);
        assert_eq!(sh.slice_qp_y(), 22);
        assert_eq!(sh.num_ref_idx_active(0), 0);
        assert_eq!(sh.ref_pic_lists.lists[0].num_ref_entries(), 0);
        assert_eq!(sh.num_ctus_in_curr_slice(), 135);
        assert_eq!(sh.ctb_addr_in_curr_slice()[134], 134);
        assert_eq!(sh.num_entry_points(), 0);
        assert_eq!(sh.pic_order_cnt_val(), 0);
    }

    #[test]
    fn missing_picture_header() {
        let sets = parameter_sets(TestSps::default(), single_tile_pps());
        let data = RbspBuilder::new().flag(false).trailing();
        assert!(matches!(
            SliceHeader::parse(&mut RbspReader::new(&data), NALUnitType::TrailNut, &sets, None, None),
            Err(VvcError::MissingPictureHeader)
        ));
    }

    /// A picture header allowing inter slices, following an IDR anchor with POC 0.
    fn inter_picture_header(sets: &ParameterSets) -> Arc<PictureHeader> {
        let anchor = RbspBuilder::new()
            .flag(true)
            .flag(false)
            .flag(false)
            .flag(false)
            .ue(0)
            .bits(0, 4)
            .trailing();
        let anchor = PictureHeader::parse(&mut RbspReader::new(&anchor), sets, NALUnitType::IdrNLp, None).unwrap();

        let data = RbspBuilder::new()
            .flag(false)
            .flag(false)
            .flag(true) // ph_inter_slice_allowed_flag
            .flag(true) // ph_intra_slice_allowed_flag
            .ue(0)
            .bits(3, 4)
            .flag(false) // ph_mvd_l1_zero_flag
            .trailing();
        Arc::new(PictureHeader::parse(&mut RbspReader::new(&data), sets, NALUnitType::PhNut, Some(&anchor)).unwrap())
    }

    #[test]
    fn raster_slice_with_entry_points() {
        let sets = parameter_sets(
            TestSps {
                rpl_templates: vec![vec![-1, -2]],
                entry_points: true,
                ..Default::default()
            },
            TestPps {
                width: 1920,
                height: 1088,
                // 15x9 CTBs split into 8+7 columns and 5+4 rows
                tiles: Some(TestTiles {
                    column_widths_minus1: vec![7],
                    row_heights_minus1: vec![4],
                    rect_slices: None,
                }),
                ..Default::default()
            },
        );
        let ph = inter_picture_header(&sets);
        assert_eq!(ph.pic_order_cnt_val(), 3);

        let mut b = RbspBuilder::new()
            .flag(false) // sh_picture_header_in_slice_header_flag
            .bits(1, 2) // sh_slice_address
            .ue(1) // sh_num_tiles_in_slice_minus1
            .ue(1) // sh_slice_type
            .flag(true) // rpl_sps_flag[0]
            .flag(true) // sh_num_ref_idx_active_override_flag
            .ue(1) // sh_num_ref_idx_active_minus1[0]
            .se(0) // sh_qp_delta
            .ue(7); // sh_entry_offset_len_minus1
        for offset in 0..8 {
            b = b.bits(100 + offset, 8);
        }
        let data = b.trailing();

        let mut reader = RbspReader::new(&data);
        let sh = SliceHeader::parse(&mut reader, NALUnitType::TrailNut, &sets, Some(ph.clone()), None).unwrap();
        assert_eq!(reader.bits_remaining(), 0);

        assert_eq!(sh.sh_slice_type, SliceType::P);
        assert_eq!(sh.sh_slice_address, 1);
        assert_eq!(sh.num_ref_idx_active(0), 2);
        assert_eq!(sh.num_ref_idx_active(1), 0);
        assert_eq!(sh.ref_pic_lists.lists[0].ref_pic_list_struct.short_term_poc_offsets(), [-1, -2]);
        // tile 1 (7x5) then tile 2 (8x4)
        assert_eq!(sh.num_ctus_in_curr_slice(), 35 + 32);
        assert_eq!(sh.ctb_addr_in_curr_slice()[0], 8);
        assert_eq!(sh.ctb_addr_in_curr_slice()[35], 75);
        // one per CTU row change inside each tile plus one at the tile boundary
        assert_eq!(sh.num_entry_points(), 4 + 1 + 3);
        assert_eq!(sh.entry_point_offset_minus1[7], 107);
        assert!(Arc::ptr_eq(&sh.picture_header, &ph));
    }

    #[test]
    fn slice_type_range_without_intra() {
        let sets = parameter_sets(TestSps::default(), single_tile_pps());
        let data = RbspBuilder::new()
            .flag(true)
            .flag(true) // ph_gdr_or_irap_pic_flag
            .flag(false)
            .flag(false)
            .flag(true) // ph_inter_slice_allowed_flag
            .flag(false) // ph_intra_slice_allowed_flag
            .ue(0)
            .bits(0, 4)
            .flag(false) // ph_mvd_l1_zero_flag
            .ue(2) // sh_slice_type
            .trailing();
        assert_eq!(
            SliceHeader::parse(&mut RbspReader::new(&data), NALUnitType::CraNut, &sets, None, None)
                .unwrap_err()
                .to_string(),
            "sh_slice_type is out of range [0, 1]: 2"
        );
    }
}
