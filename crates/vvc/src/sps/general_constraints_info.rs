use bitflags::bitflags;

use crate::error::Result;
use crate::reader::RbspReader;

bitflags! {
    /// The single bit `gci_*_constraint_flag` syntax elements, in bitstream order.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct GciFlags: u128 {
        const INTRA_ONLY = 1 << 0;
        const ALL_LAYERS_INDEPENDENT = 1 << 1;
        const ONE_AU_ONLY = 1 << 2;
        const NO_MIXED_NALU_TYPES_IN_PIC = 1 << 3;
        const NO_TRAIL = 1 << 4;
        const NO_STSA = 1 << 5;
        const NO_RASL = 1 << 6;
        const NO_RADL = 1 << 7;
        const NO_IDR = 1 << 8;
        const NO_CRA = 1 << 9;
        const NO_GDR = 1 << 10;
        const NO_APS = 1 << 11;
        const NO_IDR_RPL = 1 << 12;
        const ONE_TILE_PER_PIC = 1 << 13;
        const PIC_HEADER_IN_SLICE_HEADER = 1 << 14;
        const ONE_SLICE_PER_PIC = 1 << 15;
        const NO_RECTANGULAR_SLICE = 1 << 16;
        const ONE_SLICE_PER_SUBPIC = 1 << 17;
        const NO_SUBPIC_INFO = 1 << 18;
        const NO_PARTITION_CONSTRAINTS_OVERRIDE = 1 << 19;
        const NO_MTT = 1 << 20;
        const NO_QTBTT_DUAL_TREE_INTRA = 1 << 21;
        const NO_PALETTE = 1 << 22;
        const NO_IBC = 1 << 23;
        const NO_ISP = 1 << 24;
        const NO_MRL = 1 << 25;
        const NO_MIP = 1 << 26;
        const NO_CCLM = 1 << 27;
        const NO_REF_PIC_RESAMPLING = 1 << 28;
        const NO_RES_CHANGE_IN_CLVS = 1 << 29;
        const NO_WEIGHTED_PREDICTION = 1 << 30;
        const NO_REF_WRAPAROUND = 1 << 31;
        const NO_TEMPORAL_MVP = 1 << 32;
        const NO_SBTMVP = 1 << 33;
        const NO_AMVR = 1 << 34;
        const NO_BDOF = 1 << 35;
        const NO_SMVD = 1 << 36;
        const NO_DMVR = 1 << 37;
        const NO_MMVD = 1 << 38;
        const NO_AFFINE_MOTION = 1 << 39;
        const NO_PROF = 1 << 40;
        const NO_BCW = 1 << 41;
        const NO_CIIP = 1 << 42;
        const NO_GPM = 1 << 43;
        const NO_LUMA_TRANSFORM_SIZE_64 = 1 << 44;
        const NO_TRANSFORM_SKIP = 1 << 45;
        const NO_BDPCM = 1 << 46;
        const NO_MTS = 1 << 47;
        const NO_LFNST = 1 << 48;
        const NO_JOINT_CBCR = 1 << 49;
        const NO_SBT = 1 << 50;
        const NO_ACT = 1 << 51;
        const NO_EXPLICIT_SCALING_LIST = 1 << 52;
        const NO_DEP_QUANT = 1 << 53;
        const NO_SIGN_DATA_HIDING = 1 << 54;
        const NO_CU_QP_DELTA = 1 << 55;
        const NO_CHROMA_QP_OFFSET = 1 << 56;
        const NO_SAO = 1 << 57;
        const NO_ALF = 1 << 58;
        const NO_CCALF = 1 << 59;
        const NO_LMCS = 1 << 60;
        const NO_LADF = 1 << 61;
        const NO_VIRTUAL_BOUNDARIES = 1 << 62;
        // Carried in the additional bits.
        const ALL_RAP_PICTURES = 1 << 63;
        const NO_EXTENDED_PRECISION_PROCESSING = 1 << 64;
        const NO_TS_RESIDUAL_CODING_RICE = 1 << 65;
        const NO_RRC_RICE_EXTENSION = 1 << 66;
        const NO_PERSISTENT_RICE_ADAPTATION = 1 << 67;
        const NO_REVERSE_LAST_SIG_COEFF = 1 << 68;
    }
}

const FLAG_NAMES: [(&str, GciFlags); 63] = [
    ("gci_intra_only_constraint_flag", GciFlags::INTRA_ONLY),
    ("gci_all_layers_independent_constraint_flag", GciFlags::ALL_LAYERS_INDEPENDENT),
    ("gci_one_au_only_constraint_flag", GciFlags::ONE_AU_ONLY),
    ("gci_no_mixed_nalu_types_in_pic_constraint_flag", GciFlags::NO_MIXED_NALU_TYPES_IN_PIC),
    ("gci_no_trail_constraint_flag", GciFlags::NO_TRAIL),
    ("gci_no_stsa_constraint_flag", GciFlags::NO_STSA),
    ("gci_no_rasl_constraint_flag", GciFlags::NO_RASL),
    ("gci_no_radl_constraint_flag", GciFlags::NO_RADL),
    ("gci_no_idr_constraint_flag", GciFlags::NO_IDR),
    ("gci_no_cra_constraint_flag", GciFlags::NO_CRA),
    ("gci_no_gdr_constraint_flag", GciFlags::NO_GDR),
    ("gci_no_aps_constraint_flag", GciFlags::NO_APS),
    ("gci_no_idr_rpl_constraint_flag", GciFlags::NO_IDR_RPL),
    ("gci_one_tile_per_pic_constraint_flag", GciFlags::ONE_TILE_PER_PIC),
    ("gci_pic_header_in_slice_header_constraint_flag", GciFlags::PIC_HEADER_IN_SLICE_HEADER),
    ("gci_one_slice_per_pic_constraint_flag", GciFlags::ONE_SLICE_PER_PIC),
    ("gci_no_rectangular_slice_constraint_flag", GciFlags::NO_RECTANGULAR_SLICE),
    ("gci_one_slice_per_subpic_constraint_flag", GciFlags::ONE_SLICE_PER_SUBPIC),
    ("gci_no_subpic_info_constraint_flag", GciFlags::NO_SUBPIC_INFO),
    (
        "gci_no_partition_constraints_override_constraint_flag",
        GciFlags::NO_PARTITION_CONSTRAINTS_OVERRIDE,
    ),
    ("gci_no_mtt_constraint_flag", GciFlags::NO_MTT),
    ("gci_no_qtbtt_dual_tree_intra_constraint_flag", GciFlags::NO_QTBTT_DUAL_TREE_INTRA),
    ("gci_no_palette_constraint_flag", GciFlags::NO_PALETTE),
    ("gci_no_ibc_constraint_flag", GciFlags::NO_IBC),
    ("gci_no_isp_constraint_flag", GciFlags::NO_ISP),
    ("gci_no_mrl_constraint_flag", GciFlags::NO_MRL),
    ("gci_no_mip_constraint_flag", GciFlags::NO_MIP),
    ("gci_no_cclm_constraint_flag", GciFlags::NO_CCLM),
    ("gci_no_ref_pic_resampling_constraint_flag", GciFlags::NO_REF_PIC_RESAMPLING),
    ("gci_no_res_change_in_clvs_constraint_flag", GciFlags::NO_RES_CHANGE_IN_CLVS),
    ("gci_no_weighted_prediction_constraint_flag", GciFlags::NO_WEIGHTED_PREDICTION),
    ("gci_no_ref_wraparound_constraint_flag", GciFlags::NO_REF_WRAPAROUND),
    ("gci_no_temporal_mvp_constraint_flag", GciFlags::NO_TEMPORAL_MVP),
    ("gci_no_sbtmvp_constraint_flag", GciFlags::NO_SBTMVP),
    ("gci_no_amvr_constraint_flag", GciFlags::NO_AMVR),
    ("gci_no_bdof_constraint_flag", GciFlags::NO_BDOF),
    ("gci_no_smvd_constraint_flag", GciFlags::NO_SMVD),
    ("gci_no_dmvr_constraint_flag", GciFlags::NO_DMVR),
    ("gci_no_mmvd_constraint_flag", GciFlags::NO_MMVD),
    ("gci_no_affine_motion_constraint_flag", GciFlags::NO_AFFINE_MOTION),
    ("gci_no_prof_constraint_flag", GciFlags::NO_PROF),
    ("gci_no_bcw_constraint_flag", GciFlags::NO_BCW),
    ("gci_no_ciip_constraint_flag", GciFlags::NO_CIIP),
    ("gci_no_gpm_constraint_flag", GciFlags::NO_GPM),
    ("gci_no_luma_transform_size_64_constraint_flag", GciFlags::NO_LUMA_TRANSFORM_SIZE_64),
    ("gci_no_transform_skip_constraint_flag", GciFlags::NO_TRANSFORM_SKIP),
    ("gci_no_bdpcm_constraint_flag", GciFlags::NO_BDPCM),
    ("gci_no_mts_constraint_flag", GciFlags::NO_MTS),
    ("gci_no_lfnst_constraint_flag", GciFlags::NO_LFNST),
    ("gci_no_joint_cbcr_constraint_flag", GciFlags::NO_JOINT_CBCR),
    ("gci_no_sbt_constraint_flag", GciFlags::NO_SBT),
    ("gci_no_act_constraint_flag", GciFlags::NO_ACT),
    ("gci_no_explicit_scaling_list_constraint_flag", GciFlags::NO_EXPLICIT_SCALING_LIST),
    ("gci_no_dep_quant_constraint_flag", GciFlags::NO_DEP_QUANT),
    ("gci_no_sign_data_hiding_constraint_flag", GciFlags::NO_SIGN_DATA_HIDING),
    ("gci_no_cu_qp_delta_constraint_flag", GciFlags::NO_CU_QP_DELTA),
    ("gci_no_chroma_qp_offset_constraint_flag", GciFlags::NO_CHROMA_QP_OFFSET),
    ("gci_no_sao_constraint_flag", GciFlags::NO_SAO),
    ("gci_no_alf_constraint_flag", GciFlags::NO_ALF),
    ("gci_no_ccalf_constraint_flag", GciFlags::NO_CCALF),
    ("gci_no_lmcs_constraint_flag", GciFlags::NO_LMCS),
    ("gci_no_ladf_constraint_flag", GciFlags::NO_LADF),
    ("gci_no_virtual_boundaries_constraint_flag", GciFlags::NO_VIRTUAL_BOUNDARIES),
];

const ADDITIONAL_FLAG_NAMES: [(&str, GciFlags); 6] = [
    ("gci_all_rap_pictures_constraint_flag", GciFlags::ALL_RAP_PICTURES),
    (
        "gci_no_extended_precision_processing_constraint_flag",
        GciFlags::NO_EXTENDED_PRECISION_PROCESSING,
    ),
    ("gci_no_ts_residual_coding_rice_constraint_flag", GciFlags::NO_TS_RESIDUAL_CODING_RICE),
    ("gci_no_rrc_rice_extension_constraint_flag", GciFlags::NO_RRC_RICE_EXTENSION),
    (
        "gci_no_persistent_rice_adaptation_constraint_flag",
        GciFlags::NO_PERSISTENT_RICE_ADAPTATION,
    ),
    ("gci_no_reverse_last_sig_coeff_constraint_flag", GciFlags::NO_REVERSE_LAST_SIG_COEFF),
];

/// `general_constraints_info()`.
///
/// ISO/IEC 23090-3 - 7.3.3.2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralConstraintsInfo {
    pub gci_present_flag: bool,
    pub flags: GciFlags,
    pub gci_sixteen_minus_max_bitdepth_constraint_idc: u8,
    pub gci_three_minus_max_chroma_format_constraint_idc: u8,
    pub gci_three_minus_max_log2_ctu_size_constraint_idc: u8,
    pub gci_num_additional_bits: u8,
}

impl GeneralConstraintsInfo {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        let mut gci = Self {
            gci_present_flag: reader.read_flag("gci_present_flag")?,
            ..Default::default()
        };

        if gci.gci_present_flag {
            // The two multi-bit idc fields sit between the flags, so read the flags in groups.
            for &(name, flag) in &FLAG_NAMES[..3] {
                gci.flags.set(flag, reader.read_flag(name)?);
            }
            gci.gci_sixteen_minus_max_bitdepth_constraint_idc =
                reader.read_bits("gci_sixteen_minus_max_bitdepth_constraint_idc", 4)? as u8;
            gci.gci_three_minus_max_chroma_format_constraint_idc =
                reader.read_bits("gci_three_minus_max_chroma_format_constraint_idc", 2)? as u8;
            for &(name, flag) in &FLAG_NAMES[3..19] {
                gci.flags.set(flag, reader.read_flag(name)?);
            }
            gci.gci_three_minus_max_log2_ctu_size_constraint_idc =
                reader.read_bits("gci_three_minus_max_log2_ctu_size_constraint_idc", 2)? as u8;
            for &(name, flag) in &FLAG_NAMES[19..] {
                gci.flags.set(flag, reader.read_flag(name)?);
            }

            gci.gci_num_additional_bits = reader.read_bits("gci_num_additional_bits", 8)? as u8;
            let mut num_additional_bits_used = 0;
            if gci.gci_num_additional_bits > 5 {
                for &(name, flag) in &ADDITIONAL_FLAG_NAMES {
                    gci.flags.set(flag, reader.read_flag(name)?);
                }
                num_additional_bits_used = ADDITIONAL_FLAG_NAMES.len();
            }
            let reserved = gci.gci_num_additional_bits as usize - num_additional_bits_used;
            reader.skip_bits("gci_reserved_bit", reserved)?;
        }

        reader.read_zero_bits_until_aligned("gci_alignment_zero_bit")?;

        Ok(gci)
    }

    /// The maximum bit depth allowed by `gci_sixteen_minus_max_bitdepth_constraint_idc`.
    pub const fn max_bitdepth(&self) -> u8 {
        16 - self.gci_sixteen_minus_max_bitdepth_constraint_idc
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::{GciFlags, GeneralConstraintsInfo};
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn not_present() {
        let data = RbspBuilder::new().flag(false).zero_align().into_bytes();
        let mut reader = RbspReader::new(&data);
        let gci = GeneralConstraintsInfo::parse(&mut reader).unwrap();
        assert!(!gci.gci_present_flag);
        assert!(gci.flags.is_empty());
        assert_eq!(reader.bits_read(), 8);
    }

    #[test]
    fn flags_and_additional_bits() {
        let mut b = RbspBuilder::new()
            .flag(true)
            .flag(true) // intra only
            .flag(false)
            .flag(false)
            .bits(6, 4)
            .bits(2, 2);
        for i in 3..19 {
            b = b.flag(i == 14); // pic header in slice header
        }
        b = b.bits(1, 2);
        for i in 19..63 {
            b = b.flag(i == 62); // no virtual boundaries
        }
        // six named flags and two reserved bits
        b = b.bits(8, 8).bits(0b1000_01, 6).bits(0b11, 2);
        let data = b.zero_align().into_bytes();

        let mut reader = RbspReader::new(&data);
        let gci = GeneralConstraintsInfo::parse(&mut reader).unwrap();
        assert_eq!(
            gci.flags,
            GciFlags::INTRA_ONLY
                | GciFlags::PIC_HEADER_IN_SLICE_HEADER
                | GciFlags::NO_VIRTUAL_BOUNDARIES
                | GciFlags::ALL_RAP_PICTURES
                | GciFlags::NO_REVERSE_LAST_SIG_COEFF
        );
        assert_eq!(gci.max_bitdepth(), 10);
        assert_eq!(gci.gci_three_minus_max_chroma_format_constraint_idc, 2);
        assert_eq!(gci.gci_three_minus_max_log2_ctu_size_constraint_idc, 1);
        assert!(reader.byte_aligned());
        assert_eq!(reader.bits_remaining(), 0);
    }
}
