use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::RbspReader;

/// `lmcs_data()`.
///
/// ISO/IEC 23090-3 - 7.3.2.19
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LmcsData {
    /// The value ranges from \[0, 15\].
    pub lmcs_min_bin_idx: u8,
    /// The value ranges from \[0, 15\].
    pub lmcs_delta_max_bin_idx: u8,
    /// The value ranges from \[0, 14\].
    pub lmcs_delta_cw_prec_minus1: u8,
    /// `lmcsDeltaCW[i]` for `i` in `lmcs_min_bin_idx..=LmcsMaxBinIdx`, signs applied.
    pub lmcs_delta_cw: Vec<i32>,
    /// `lmcsDeltaCrs`, zero when chroma is absent.
    pub lmcs_delta_crs: i8,
}

impl LmcsData {
    pub fn parse(reader: &mut RbspReader, aps_chroma_present_flag: bool) -> Result<Self> {
        let lmcs_min_bin_idx = reader.read_uev("lmcs_min_bin_idx")?;
        range_check!(lmcs_min_bin_idx, 0, 15)?;
        let lmcs_delta_max_bin_idx = reader.read_uev("lmcs_delta_max_bin_idx")?;
        range_check!(lmcs_delta_max_bin_idx, 0, 15)?;
        let lmcs_max_bin_idx = 15 - lmcs_delta_max_bin_idx;
        range_check!("LmcsMaxBinIdx", lmcs_max_bin_idx, lmcs_min_bin_idx, 15)?;

        let lmcs_delta_cw_prec_minus1 = reader.read_uev("lmcs_delta_cw_prec_minus1")?;
        range_check!(lmcs_delta_cw_prec_minus1, 0, 14)?;

        let mut lmcs_delta_cw = Vec::with_capacity((lmcs_max_bin_idx - lmcs_min_bin_idx + 1) as usize);
        for _ in lmcs_min_bin_idx..=lmcs_max_bin_idx {
            let abs = reader.read_bits("lmcs_delta_abs_cw", lmcs_delta_cw_prec_minus1 as u32 + 1)? as i32;
            let negative = abs > 0 && reader.read_flag("lmcs_delta_sign_cw_flag")?;
            lmcs_delta_cw.push(if negative { -abs } else { abs });
        }

        let mut lmcs_delta_crs = 0;
        if aps_chroma_present_flag {
            let abs = reader.read_bits("lmcs_delta_abs_crs", 3)? as i8;
            let negative = abs > 0 && reader.read_flag("lmcs_delta_sign_crs_flag")?;
            lmcs_delta_crs = if negative { -abs } else { abs };
        }

        Ok(Self {
            lmcs_min_bin_idx: lmcs_min_bin_idx as u8,
            lmcs_delta_max_bin_idx: lmcs_delta_max_bin_idx as u8,
            lmcs_delta_cw_prec_minus1: lmcs_delta_cw_prec_minus1 as u8,
            lmcs_delta_cw,
            lmcs_delta_crs,
        })
    }

    /// `LmcsMaxBinIdx`.
    pub const fn lmcs_max_bin_idx(&self) -> u8 {
        15 - self.lmcs_delta_max_bin_idx
    }

    /// `lmcsCW[i]` for all 16 bins at the given bit depth.
    ///
    /// ISO/IEC 23090-3 - 7.4.3.19
    pub fn lmcs_cw(&self, bit_depth: u8) -> [i32; 16] {
        let org_cw = (1i32 << bit_depth) / 16;
        let min = self.lmcs_min_bin_idx as usize;
        std::array::from_fn(|i| {
            if i < min || i > self.lmcs_max_bin_idx() as usize {
                0
            } else {
                org_cw + self.lmcs_delta_cw[i - min]
            }
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::LmcsData;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn codewords() {
        // bins 1..=14 with 4 bit codeword deltas
        let mut b = RbspBuilder::new().ue(1).ue(1).ue(3);
        for i in 0..14 {
            b = match i {
                0 => b.bits(5, 4).flag(true),
                1 => b.bits(3, 4).flag(false),
                _ => b.bits(0, 4),
            };
        }
        b = b.bits(2, 3).flag(true); // lmcs_delta_crs
        let data = b.zero_align().into_bytes();

        let lmcs = LmcsData::parse(&mut RbspReader::new(&data), true).unwrap();
        assert_eq!(lmcs.lmcs_max_bin_idx(), 14);
        assert_eq!(lmcs.lmcs_delta_cw.len(), 14);
        assert_eq!(lmcs.lmcs_delta_crs, -2);

        let cw = lmcs.lmcs_cw(10);
        assert_eq!(cw[0], 0);
        assert_eq!(cw[1], 59);
        assert_eq!(cw[2], 67);
        assert_eq!(cw[3], 64);
        assert_eq!(cw[15], 0);
    }

    #[test]
    fn max_bin_below_min_bin() {
        let data = RbspBuilder::new().ue(10).ue(8).zero_align().into_bytes();
        assert_eq!(
            LmcsData::parse(&mut RbspReader::new(&data), false).unwrap_err().to_string(),
            "LmcsMaxBinIdx is out of range [10, 15]: 7"
        );
    }
}
