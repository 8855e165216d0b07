use crate::error::Result;
use crate::pps::Pps;
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::ref_pic_lists::RefPicLists;
use crate::sps::Sps;

/// `WpOffsetHalfRangeC`.
const WP_OFFSET_HALF_RANGE_C: i32 = 1 << 7;

/// The weights of one reference picture list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListWeights {
    pub luma_weight_flag: Vec<bool>,
    /// Empty when `ChromaArrayType` is 0.
    pub chroma_weight_flag: Vec<bool>,
    /// Zero where `luma_weight_flag` is not set.
    pub delta_luma_weight: Vec<i8>,
    pub luma_offset: Vec<i8>,
    /// Zero where `chroma_weight_flag` is not set.
    pub delta_chroma_weight: Vec<[i8; 2]>,
    pub delta_chroma_offset: Vec<[i16; 2]>,
}

impl ListWeights {
    fn parse(reader: &mut RbspReader, num_weights: usize, chroma: bool, l1: bool) -> Result<Self> {
        let names = if l1 {
            [
                "luma_weight_l1_flag",
                "chroma_weight_l1_flag",
                "delta_luma_weight_l1",
                "luma_offset_l1",
                "delta_chroma_weight_l1",
                "delta_chroma_offset_l1",
            ]
        } else {
            [
                "luma_weight_l0_flag",
                "chroma_weight_l0_flag",
                "delta_luma_weight_l0",
                "luma_offset_l0",
                "delta_chroma_weight_l0",
                "delta_chroma_offset_l0",
            ]
        };

        let mut weights = Self {
            luma_weight_flag: Vec::with_capacity(num_weights),
            chroma_weight_flag: Vec::with_capacity(num_weights),
            delta_luma_weight: vec![0; num_weights],
            luma_offset: vec![0; num_weights],
            delta_chroma_weight: vec![[0; 2]; num_weights],
            delta_chroma_offset: vec![[0; 2]; num_weights],
        };

        for _ in 0..num_weights {
            weights.luma_weight_flag.push(reader.read_flag(names[0])?);
        }
        if chroma {
            for _ in 0..num_weights {
                weights.chroma_weight_flag.push(reader.read_flag(names[1])?);
            }
        }

        for i in 0..num_weights {
            if weights.luma_weight_flag[i] {
                weights.delta_luma_weight[i] = read_se(reader, names[2], -128, 127)? as i8;
                weights.luma_offset[i] = read_se(reader, names[3], -128, 127)? as i8;
            }
            if weights.chroma_weight_flag.get(i).copied().unwrap_or(false) {
                for j in 0..2 {
                    weights.delta_chroma_weight[i][j] = read_se(reader, names[4], -128, 127)? as i8;
                    weights.delta_chroma_offset[i][j] = read_se(reader, names[5], -4 * 128, 4 * 127)? as i16;
                }
            }
        }

        Ok(weights)
    }

    pub fn len(&self) -> usize {
        self.luma_weight_flag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.luma_weight_flag.is_empty()
    }
}

fn read_se(reader: &mut RbspReader, name: &'static str, min: i64, max: i64) -> Result<i64> {
    let value = reader.read_sev(name)?;
    crate::range_check::check(name, value, min, max)?;
    Ok(value)
}

/// `pred_weight_table()`.
///
/// ISO/IEC 23090-3 - 7.3.8
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredWeightTable {
    /// The value ranges from \[0, 7\].
    pub luma_log2_weight_denom: u8,
    pub delta_chroma_log2_weight_denom: i8,
    pub num_l0_weights: u8,
    pub num_l1_weights: u8,
    pub l0: ListWeights,
    pub l1: ListWeights,
}

impl PredWeightTable {
    /// Parses the table.
    ///
    /// `num_ref_idx_active` is only used when the table is in a slice header, i.e. when
    /// `pps_wp_info_in_ph_flag` is not set.
    pub fn parse(
        reader: &mut RbspReader,
        sps: &Sps,
        pps: &Pps,
        ref_pic_lists: &RefPicLists,
        num_ref_idx_active: [u32; 2],
    ) -> Result<Self> {
        let chroma = sps.chroma_array_type() != 0;

        let luma_log2_weight_denom = reader.read_uev("luma_log2_weight_denom")?;
        range_check!(luma_log2_weight_denom, 0, 7)?;

        let mut delta_chroma_log2_weight_denom = 0;
        if chroma {
            delta_chroma_log2_weight_denom = reader.read_sev("delta_chroma_log2_weight_denom")?;
            range_check!(
                "ChromaLog2WeightDenom",
                luma_log2_weight_denom as i64 + delta_chroma_log2_weight_denom,
                0,
                7
            )?;
        }

        let num_entries = [
            ref_pic_lists.lists[0].num_ref_entries(),
            ref_pic_lists.lists[1].num_ref_entries(),
        ];

        let mut num_l0_weights = 0;
        if pps.pps_wp_info_in_ph_flag {
            num_l0_weights = reader.read_uev("num_l0_weights")?;
            range_check!(num_l0_weights, 0, num_entries[0].min(15))?;
        }
        let num_weights_l0 = if pps.pps_wp_info_in_ph_flag {
            num_l0_weights as usize
        } else {
            num_ref_idx_active[0] as usize
        };
        let l0 = ListWeights::parse(reader, num_weights_l0, chroma, false)?;

        let mut num_l1_weights = 0;
        if pps.pps_weighted_bipred_flag && pps.pps_wp_info_in_ph_flag && num_entries[1] > 0 {
            num_l1_weights = reader.read_uev("num_l1_weights")?;
            range_check!(num_l1_weights, 0, num_entries[1].min(15))?;
        }

        // (144)
        let num_weights_l1 = if !pps.pps_weighted_bipred_flag || (pps.pps_wp_info_in_ph_flag && num_entries[1] == 0) {
            0
        } else if pps.pps_wp_info_in_ph_flag {
            num_l1_weights as usize
        } else {
            num_ref_idx_active[1] as usize
        };
        let l1 = ListWeights::parse(reader, num_weights_l1, chroma, true)?;

        Ok(Self {
            luma_log2_weight_denom: luma_log2_weight_denom as u8,
            delta_chroma_log2_weight_denom: delta_chroma_log2_weight_denom as i8,
            num_l0_weights: num_l0_weights as u8,
            num_l1_weights: num_l1_weights as u8,
            l0,
            l1,
        })
    }

    /// `ChromaLog2WeightDenom`.
    pub const fn chroma_log2_weight_denom(&self) -> u8 {
        (self.luma_log2_weight_denom as i8 + self.delta_chroma_log2_weight_denom) as u8
    }

    fn list(&self, list: usize) -> &ListWeights {
        if list == 0 { &self.l0 } else { &self.l1 }
    }

    /// `NumWeightsL0` or `NumWeightsL1`.
    pub fn num_weights(&self, list: usize) -> usize {
        self.list(list).len()
    }

    /// `LumaWeightL0[i]` or `LumaWeightL1[i]`.
    pub fn luma_weight(&self, list: usize, i: usize) -> i32 {
        let base = 1 << self.luma_log2_weight_denom;
        let weights = self.list(list);
        match weights.luma_weight_flag.get(i) {
            Some(true) => base + weights.delta_luma_weight[i] as i32,
            _ => base,
        }
    }

    /// `ChromaWeightL0[i][j]` or `ChromaWeightL1[i][j]`.
    pub fn chroma_weight(&self, list: usize, i: usize, j: usize) -> i32 {
        let base = 1 << self.chroma_log2_weight_denom();
        let weights = self.list(list);
        match weights.chroma_weight_flag.get(i) {
            Some(true) => base + weights.delta_chroma_weight[i][j] as i32,
            _ => base,
        }
    }

    /// `ChromaOffsetL0[i][j]` or `ChromaOffsetL1[i][j]`.
    pub fn chroma_offset(&self, list: usize, i: usize, j: usize) -> i32 {
        let weights = self.list(list);
        if !weights.chroma_weight_flag.get(i).copied().unwrap_or(false) {
            return 0;
        }
        let offset = WP_OFFSET_HALF_RANGE_C + weights.delta_chroma_offset[i][j] as i32
            - ((WP_OFFSET_HALF_RANGE_C * self.chroma_weight(list, i, j)) >> self.chroma_log2_weight_denom());
        offset.clamp(-WP_OFFSET_HALF_RANGE_C, WP_OFFSET_HALF_RANGE_C - 1)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::ListWeights;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn flags_before_values() {
        let data = RbspBuilder::new()
            .flag(true)
            .flag(false) // luma_weight_l0_flag
            .flag(false)
            .flag(true) // chroma_weight_l0_flag
            .se(-3)
            .se(10) // entry 0 luma
            .se(1)
            .se(-20)
            .se(2)
            .se(0) // entry 1 chroma
            .zero_align()
            .into_bytes();

        let weights = ListWeights::parse(&mut RbspReader::new(&data), 2, true, false).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.delta_luma_weight, [-3, 0]);
        assert_eq!(weights.luma_offset, [10, 0]);
        assert_eq!(weights.delta_chroma_weight, [[0, 0], [1, 2]]);
        assert_eq!(weights.delta_chroma_offset, [[0, 0], [-20, 0]]);
    }

    #[test]
    fn offset_out_of_range() {
        let data = RbspBuilder::new().flag(true).se(0).se(128).zero_align().into_bytes();
        assert_eq!(
            ListWeights::parse(&mut RbspReader::new(&data), 1, false, true)
                .unwrap_err()
                .to_string(),
            "luma_offset_l1 is out of range [-128, 127]: 128"
        );
    }
}
