use crate::error::Result;
use crate::reader::RbspReader;

/// One signalled chroma QP mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromaQpMapping {
    pub sps_qp_table_start_minus26: i32,
    pub sps_delta_qp_in_val_minus1: Vec<u32>,
    pub sps_delta_qp_diff_val: Vec<u32>,
    /// `ChromaQpTable[i][k]` for `k` in `-QpBdOffset..=63`, stored at `k + QpBdOffset`.
    table: Vec<i32>,
}

impl ChromaQpMapping {
    pub(crate) fn parse(reader: &mut RbspReader, qp_bd_offset: i32) -> Result<Self> {
        let sps_qp_table_start_minus26 = reader.read_sev("sps_qp_table_start_minus26")?;
        crate::range_check::check(
            "sps_qp_table_start_minus26",
            sps_qp_table_start_minus26,
            -26 - qp_bd_offset as i64,
            36,
        )?;

        let num_points_minus1 = reader.read_uev("sps_num_points_in_qp_table_minus1")?;
        crate::range_check::check(
            "sps_num_points_in_qp_table_minus1",
            num_points_minus1 as i64,
            0,
            36 - sps_qp_table_start_minus26,
        )?;

        let mut sps_delta_qp_in_val_minus1 = Vec::with_capacity(num_points_minus1 as usize + 1);
        let mut sps_delta_qp_diff_val = Vec::with_capacity(num_points_minus1 as usize + 1);
        for _ in 0..=num_points_minus1 {
            let delta_in = reader.read_uev("sps_delta_qp_in_val_minus1")?;
            crate::range_check::check("sps_delta_qp_in_val_minus1", delta_in as i64, 0, 63)?;
            let diff = reader.read_uev("sps_delta_qp_diff_val")?;
            crate::range_check::check("sps_delta_qp_diff_val", diff as i64, 0, 127)?;
            sps_delta_qp_in_val_minus1.push(delta_in as u32);
            sps_delta_qp_diff_val.push(diff as u32);
        }

        let mut mapping = Self {
            sps_qp_table_start_minus26: sps_qp_table_start_minus26 as i32,
            sps_delta_qp_in_val_minus1,
            sps_delta_qp_diff_val,
            table: Vec::new(),
        };
        mapping.table = mapping.derive_table(qp_bd_offset)?;
        Ok(mapping)
    }

    // (57)
    fn derive_table(&self, qp_bd_offset: i32) -> Result<Vec<i32>> {
        let points = self.sps_delta_qp_in_val_minus1.len();
        let mut qp_in_val = vec![self.sps_qp_table_start_minus26 + 26; points + 1];
        let mut qp_out_val = qp_in_val.clone();
        for j in 0..points {
            qp_in_val[j + 1] = qp_in_val[j] + self.sps_delta_qp_in_val_minus1[j] as i32 + 1;
            qp_out_val[j + 1] =
                qp_out_val[j] + (self.sps_delta_qp_in_val_minus1[j] ^ self.sps_delta_qp_diff_val[j]) as i32;
        }

        if qp_in_val[points] > 63 {
            return Err(crate::VvcError::RangeViolation {
                field: "qpInVal",
                value: qp_in_val[points] as i64,
                min: -qp_bd_offset as i64,
                max: 63,
            });
        }

        let idx = |k: i32| (k + qp_bd_offset) as usize;
        let mut table = vec![0; 64 + qp_bd_offset as usize];

        table[idx(qp_in_val[0])] = qp_out_val[0];
        for k in (-qp_bd_offset..qp_in_val[0]).rev() {
            table[idx(k)] = (table[idx(k + 1)] - 1).clamp(-qp_bd_offset, 63);
        }
        for j in 0..points {
            let delta = self.sps_delta_qp_in_val_minus1[j] as i32 + 1;
            let sh = delta >> 1;
            for (m, k) in (qp_in_val[j] + 1..=qp_in_val[j + 1]).enumerate() {
                let m = m as i32 + 1;
                table[idx(k)] = table[idx(qp_in_val[j])] + ((qp_out_val[j + 1] - qp_out_val[j]) * m + sh) / delta;
            }
        }
        for k in qp_in_val[points] + 1..=63 {
            table[idx(k)] = (table[idx(k - 1)] + 1).clamp(-qp_bd_offset, 63);
        }

        Ok(table)
    }

    /// Maps a luma QP in `-QpBdOffset..=63` to the chroma QP.
    pub fn chroma_qp(&self, qp: i32) -> Option<i32> {
        let qp_bd_offset = self.table.len() as i32 - 64;
        self.table.get(usize::try_from(qp + qp_bd_offset).ok()?).copied()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::ChromaQpMapping;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn identity_single_point() {
        // a single segment from 26 to 27 where the output also grows by one
        let data = RbspBuilder::new().se(0).ue(0).ue(0).ue(1).trailing();
        let mapping = ChromaQpMapping::parse(&mut RbspReader::new(&data), 12).unwrap();
        assert_eq!(mapping.chroma_qp(26), Some(26));
        assert_eq!(mapping.chroma_qp(30), Some(30));
        assert_eq!(mapping.chroma_qp(-12), Some(-12));
        assert_eq!(mapping.chroma_qp(63), Some(63));
        assert_eq!(mapping.chroma_qp(64), None);
    }

    #[test]
    fn flattened_segment() {
        // start 30, one segment of 8 values where the output grows by 4
        let data = RbspBuilder::new().se(4).ue(0).ue(7).ue(3).trailing();
        let mapping = ChromaQpMapping::parse(&mut RbspReader::new(&data), 0).unwrap();
        assert_eq!(mapping.chroma_qp(30), Some(30));
        assert_eq!(mapping.chroma_qp(34), Some(32));
        assert_eq!(mapping.chroma_qp(38), Some(34));
        assert_eq!(mapping.chroma_qp(39), Some(35));
        assert_eq!(mapping.chroma_qp(29), Some(29));
    }
}
