use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::{RbspReader, ceil_log2};

/// `NumAlfFilters`, the number of luma filter classes.
pub const NUM_ALF_FILTERS: usize = 25;

/// Luma filters of an ALF APS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlfLumaFilters {
    pub alf_luma_clip_flag: bool,
    pub alf_luma_num_filters_signalled_minus1: u8,
    /// Maps each filter class to one of the signalled filters.
    pub alf_luma_coeff_delta_idx: [u8; NUM_ALF_FILTERS],
    /// Signed coefficients, `alf_luma_coeff_abs` with `alf_luma_coeff_sign` applied.
    pub alf_luma_coeff: Vec<[i16; 12]>,
    /// Empty unless `alf_luma_clip_flag` is set.
    pub alf_luma_clip_idx: Vec<[u8; 12]>,
}

/// Chroma filters of an ALF APS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlfChromaFilters {
    pub alf_chroma_clip_flag: bool,
    pub alf_chroma_num_alt_filters_minus1: u8,
    pub alf_chroma_coeff: Vec<[i16; 6]>,
    /// Empty unless `alf_chroma_clip_flag` is set.
    pub alf_chroma_clip_idx: Vec<[u8; 6]>,
}

/// Cross-component filters for one chroma component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcAlfFilters {
    pub filters_signalled_minus1: u8,
    pub mapped_coeff_abs: Vec<[u8; 7]>,
    pub coeff_sign: Vec<[bool; 7]>,
}

impl CcAlfFilters {
    fn parse(reader: &mut RbspReader, names: [&'static str; 3]) -> Result<Self> {
        let filters_signalled_minus1 = reader.read_uev(names[0])?;
        crate::range_check::check(names[0], filters_signalled_minus1 as i64, 0, 3)?;

        let mut filters = Self {
            filters_signalled_minus1: filters_signalled_minus1 as u8,
            mapped_coeff_abs: Vec::with_capacity(filters_signalled_minus1 as usize + 1),
            coeff_sign: Vec::with_capacity(filters_signalled_minus1 as usize + 1),
        };
        for _ in 0..=filters_signalled_minus1 {
            let mut abs = [0; 7];
            let mut sign = [false; 7];
            for j in 0..7 {
                abs[j] = reader.read_bits(names[1], 3)? as u8;
                if abs[j] != 0 {
                    sign[j] = reader.read_flag(names[2])?;
                }
            }
            filters.mapped_coeff_abs.push(abs);
            filters.coeff_sign.push(sign);
        }

        Ok(filters)
    }

    /// `CcAlfApsCoeff` of filter `k`.
    ///
    /// A mapped magnitude `m > 0` stands for `2^(m - 1)`.
    pub fn coeff(&self, k: usize) -> Option<[i16; 7]> {
        let abs = self.mapped_coeff_abs.get(k)?;
        let sign = self.coeff_sign.get(k)?;
        Some(std::array::from_fn(|j| match abs[j] {
            0 => 0,
            m if sign[j] => -(1 << (m - 1)),
            m => 1 << (m - 1),
        }))
    }
}

/// `alf_data()`.
///
/// ISO/IEC 23090-3 - 7.3.2.18
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlfData {
    pub alf_luma_filter_signal_flag: bool,
    pub alf_chroma_filter_signal_flag: bool,
    pub alf_cc_cb_filter_signal_flag: bool,
    pub alf_cc_cr_filter_signal_flag: bool,
    pub luma: Option<AlfLumaFilters>,
    pub chroma: Option<AlfChromaFilters>,
    pub cc_cb: Option<CcAlfFilters>,
    pub cc_cr: Option<CcAlfFilters>,
}

impl AlfData {
    pub fn parse(reader: &mut RbspReader, aps_chroma_present_flag: bool) -> Result<Self> {
        let mut alf = Self {
            alf_luma_filter_signal_flag: reader.read_flag("alf_luma_filter_signal_flag")?,
            ..Default::default()
        };
        if aps_chroma_present_flag {
            alf.alf_chroma_filter_signal_flag = reader.read_flag("alf_chroma_filter_signal_flag")?;
            alf.alf_cc_cb_filter_signal_flag = reader.read_flag("alf_cc_cb_filter_signal_flag")?;
            alf.alf_cc_cr_filter_signal_flag = reader.read_flag("alf_cc_cr_filter_signal_flag")?;
        }

        let alf_filter_signal_flags = [
            alf.alf_luma_filter_signal_flag,
            alf.alf_chroma_filter_signal_flag,
            alf.alf_cc_cb_filter_signal_flag,
            alf.alf_cc_cr_filter_signal_flag,
        ]
        .into_iter()
        .filter(|f| *f)
        .count();
        range_check!(alf_filter_signal_flags, 1, 4)?;

        if alf.alf_luma_filter_signal_flag {
            alf.luma = Some(parse_luma(reader)?);
        }
        if alf.alf_chroma_filter_signal_flag {
            alf.chroma = Some(parse_chroma(reader)?);
        }
        if alf.alf_cc_cb_filter_signal_flag {
            alf.cc_cb = Some(CcAlfFilters::parse(
                reader,
                [
                    "alf_cc_cb_filters_signalled_minus1",
                    "alf_cc_cb_mapped_coeff_abs",
                    "alf_cc_cb_coeff_sign",
                ],
            )?);
        }
        if alf.alf_cc_cr_filter_signal_flag {
            alf.cc_cr = Some(CcAlfFilters::parse(
                reader,
                [
                    "alf_cc_cr_filters_signalled_minus1",
                    "alf_cc_cr_mapped_coeff_abs",
                    "alf_cc_cr_coeff_sign",
                ],
            )?);
        }

        Ok(alf)
    }
}

fn read_coeff(reader: &mut RbspReader, abs_name: &'static str, sign_name: &'static str) -> Result<i16> {
    let abs = reader.read_uev(abs_name)?;
    crate::range_check::check(abs_name, abs as i64, 0, 128)?;
    if abs != 0 && reader.read_flag(sign_name)? {
        Ok(-(abs as i16))
    } else {
        Ok(abs as i16)
    }
}

fn parse_luma(reader: &mut RbspReader) -> Result<AlfLumaFilters> {
    let alf_luma_clip_flag = reader.read_flag("alf_luma_clip_flag")?;
    let alf_luma_num_filters_signalled_minus1 = reader.read_uev("alf_luma_num_filters_signalled_minus1")?;
    range_check!(alf_luma_num_filters_signalled_minus1, 0, NUM_ALF_FILTERS - 1)?;

    let mut alf_luma_coeff_delta_idx = [0; NUM_ALF_FILTERS];
    if alf_luma_num_filters_signalled_minus1 > 0 {
        let bits = ceil_log2(alf_luma_num_filters_signalled_minus1 + 1);
        for idx in &mut alf_luma_coeff_delta_idx {
            let alf_luma_coeff_delta_idx = reader.read_bits("alf_luma_coeff_delta_idx", bits)?;
            range_check!(alf_luma_coeff_delta_idx, 0, alf_luma_num_filters_signalled_minus1)?;
            *idx = alf_luma_coeff_delta_idx as u8;
        }
    }

    let num_filters = alf_luma_num_filters_signalled_minus1 as usize + 1;
    let mut alf_luma_coeff = Vec::with_capacity(num_filters);
    for _ in 0..num_filters {
        let mut coeff = [0; 12];
        for c in &mut coeff {
            *c = read_coeff(reader, "alf_luma_coeff_abs", "alf_luma_coeff_sign")?;
        }
        alf_luma_coeff.push(coeff);
    }

    let mut alf_luma_clip_idx = Vec::new();
    if alf_luma_clip_flag {
        for _ in 0..num_filters {
            let mut clip = [0; 12];
            for c in &mut clip {
                *c = reader.read_bits("alf_luma_clip_idx", 2)? as u8;
            }
            alf_luma_clip_idx.push(clip);
        }
    }

    Ok(AlfLumaFilters {
        alf_luma_clip_flag,
        alf_luma_num_filters_signalled_minus1: alf_luma_num_filters_signalled_minus1 as u8,
        alf_luma_coeff_delta_idx,
        alf_luma_coeff,
        alf_luma_clip_idx,
    })
}

fn parse_chroma(reader: &mut RbspReader) -> Result<AlfChromaFilters> {
    let alf_chroma_clip_flag = reader.read_flag("alf_chroma_clip_flag")?;
    let alf_chroma_num_alt_filters_minus1 = reader.read_uev("alf_chroma_num_alt_filters_minus1")?;
    range_check!(alf_chroma_num_alt_filters_minus1, 0, 7)?;

    let mut filters = AlfChromaFilters {
        alf_chroma_clip_flag,
        alf_chroma_num_alt_filters_minus1: alf_chroma_num_alt_filters_minus1 as u8,
        alf_chroma_coeff: Vec::new(),
        alf_chroma_clip_idx: Vec::new(),
    };
    for _ in 0..=alf_chroma_num_alt_filters_minus1 {
        let mut coeff = [0; 6];
        for c in &mut coeff {
            *c = read_coeff(reader, "alf_chroma_coeff_abs", "alf_chroma_coeff_sign")?;
        }
        filters.alf_chroma_coeff.push(coeff);

        if alf_chroma_clip_flag {
            let mut clip = [0; 6];
            for c in &mut clip {
                *c = reader.read_bits("alf_chroma_clip_idx", 2)? as u8;
            }
            filters.alf_chroma_clip_idx.push(clip);
        }
    }

    Ok(filters)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::AlfData;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn luma_with_two_filters() {
        let mut b = RbspBuilder::new()
            .flag(true) // alf_luma_filter_signal_flag
            .flag(false) // alf_luma_clip_flag
            .ue(1); // alf_luma_num_filters_signalled_minus1
        // classes alternate between the two filters, one bit each
        for idx in 0..25 {
            b = b.bits(idx % 2, 1);
        }
        for filter in 0..2 {
            for j in 0..12 {
                if j == 0 {
                    b = b.ue(filter + 1).flag(filter == 1);
                } else {
                    b = b.ue(0);
                }
            }
        }
        let data = b.zero_align().into_bytes();

        let alf = AlfData::parse(&mut RbspReader::new(&data), false).unwrap();
        assert!(alf.chroma.is_none());
        let luma = alf.luma.unwrap();
        assert_eq!(luma.alf_luma_coeff_delta_idx[0], 0);
        assert_eq!(luma.alf_luma_coeff_delta_idx[1], 1);
        assert_eq!(luma.alf_luma_coeff_delta_idx[24], 0);
        assert_eq!(luma.alf_luma_coeff[0][0], 1);
        assert_eq!(luma.alf_luma_coeff[1][0], -2);
        assert_eq!(luma.alf_luma_coeff[1][11], 0);
        assert!(luma.alf_luma_clip_idx.is_empty());
    }

    #[test]
    fn chroma_and_cross_component() {
        let mut b = RbspBuilder::new()
            .flag(false) // alf_luma_filter_signal_flag
            .flag(true) // alf_chroma_filter_signal_flag
            .flag(true) // alf_cc_cb_filter_signal_flag
            .flag(false) // alf_cc_cr_filter_signal_flag
            .flag(true) // alf_chroma_clip_flag
            .ue(0); // alf_chroma_num_alt_filters_minus1
        for _ in 0..6 {
            b = b.ue(3).flag(false);
        }
        for _ in 0..6 {
            b = b.bits(2, 2);
        }
        b = b.ue(0); // alf_cc_cb_filters_signalled_minus1
        b = b.bits(3, 3).flag(true);
        for _ in 1..7 {
            b = b.bits(0, 3);
        }
        let data = b.zero_align().into_bytes();

        let alf = AlfData::parse(&mut RbspReader::new(&data), true).unwrap();
        let chroma = alf.chroma.unwrap();
        assert_eq!(chroma.alf_chroma_coeff, vec![[3; 6]]);
        assert_eq!(chroma.alf_chroma_clip_idx, vec![[2; 6]]);
        let cc_cb = alf.cc_cb.unwrap();
        assert_eq!(cc_cb.coeff(0), Some([-4, 0, 0, 0, 0, 0, 0]));
        assert_eq!(cc_cb.coeff(1), None);
        assert!(alf.cc_cr.is_none());
    }

    #[test]
    fn no_filter_signalled() {
        let data = [0b0000_0000];
        assert_eq!(
            AlfData::parse(&mut RbspReader::new(&data), true).unwrap_err().to_string(),
            "alf_filter_signal_flags is out of range [1, 4]: 0"
        );
    }
}
