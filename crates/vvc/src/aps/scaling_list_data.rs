use crate::error::Result;
use crate::reader::RbspReader;

/// Number of scaling matrices carried by a scaling list APS.
pub const NUM_SCALING_MATRICES: usize = 28;

/// Up-right diagonal scan positions `(x, y)` of a square block.
///
/// ISO/IEC 23090-3 - 6.5.2
pub fn diag_scan_order(size: usize) -> Vec<(u8, u8)> {
    let mut scan = Vec::with_capacity(size * size);
    let (mut x, mut y) = (0i32, 0i32);
    while scan.len() < size * size {
        while y >= 0 {
            if (x as usize) < size && (y as usize) < size {
                scan.push((x as u8, y as u8));
            }
            y -= 1;
            x += 1;
        }
        y = x;
        x = 0;
    }
    scan
}

/// The side length of the coefficient matrix coded for `id`.
pub const fn matrix_size(id: usize) -> usize {
    if id < 2 {
        2
    } else if id < 8 {
        4
    } else {
        8
    }
}

/// One coded scaling matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalingMatrix {
    pub scaling_list_copy_mode_flag: bool,
    pub scaling_list_pred_mode_flag: bool,
    pub scaling_list_pred_id_delta: u8,
    /// `scaling_list_dc_coef[id - 14]`, zero for `id <= 13`.
    pub scaling_list_dc_coef: i16,
    /// `ScalingList[id][i]` in diagonal scan order.
    pub scaling_list: Vec<i16>,
}

/// `scaling_list_data()`.
///
/// ISO/IEC 23090-3 - 7.3.2.20
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingListData {
    pub matrices: Vec<ScalingMatrix>,
    matrix_rec: Vec<Vec<u8>>,
    dc_rec: [u8; NUM_SCALING_MATRICES - 14],
}

impl ScalingListData {
    pub fn parse(reader: &mut RbspReader, aps_chroma_present_flag: bool) -> Result<Self> {
        let scan = diag_scan_order(8);
        let mut matrices = Vec::with_capacity(NUM_SCALING_MATRICES);

        for id in 0..NUM_SCALING_MATRICES {
            let size = matrix_size(id);
            let mut matrix = ScalingMatrix {
                scaling_list_copy_mode_flag: true,
                scaling_list: vec![0; size * size],
                ..Default::default()
            };

            if aps_chroma_present_flag || id % 3 == 2 || id == 27 {
                matrix.scaling_list_copy_mode_flag = reader.read_flag("scaling_list_copy_mode_flag")?;
                if !matrix.scaling_list_copy_mode_flag {
                    matrix.scaling_list_pred_mode_flag = reader.read_flag("scaling_list_pred_mode_flag")?;
                }

                if (matrix.scaling_list_copy_mode_flag || matrix.scaling_list_pred_mode_flag)
                    && id != 0
                    && id != 2
                    && id != 8
                {
                    let delta = reader.read_uev("scaling_list_pred_id_delta")?;
                    crate::range_check::check("scaling_list_pred_id_delta", delta as i64, 0, max_id_delta(id) as i64)?;
                    matrix.scaling_list_pred_id_delta = delta as u8;
                }

                if !matrix.scaling_list_copy_mode_flag {
                    let mut next_coef = 0i64;
                    if id > 13 {
                        let dc = reader.read_sev("scaling_list_dc_coef")?;
                        crate::range_check::check("scaling_list_dc_coef", dc, -128, 127)?;
                        matrix.scaling_list_dc_coef = dc as i16;
                        next_coef += dc;
                    }

                    for (i, &(x, y)) in scan.iter().take(size * size).enumerate() {
                        if id > 25 && x >= 4 && y >= 4 {
                            continue;
                        }
                        let delta = reader.read_sev("scaling_list_delta_coef")?;
                        crate::range_check::check("scaling_list_delta_coef", delta, -128, 127)?;
                        next_coef += delta;
                        matrix.scaling_list[i] = next_coef as i16;
                    }
                }
            }

            matrices.push(matrix);
        }

        let mut data = Self {
            matrices,
            matrix_rec: Vec::with_capacity(NUM_SCALING_MATRICES),
            dc_rec: [0; NUM_SCALING_MATRICES - 14],
        };
        data.reconstruct()?;
        Ok(data)
    }

    /// `refId` of matrix `id`.
    pub fn ref_id(&self, id: usize) -> usize {
        id - self.matrices[id].scaling_list_pred_id_delta as usize
    }

    /// Derives `ScalingMatrixRec` and `ScalingMatrixDCRec`.
    ///
    /// ISO/IEC 23090-3 - 7.4.3.20
    fn reconstruct(&mut self) -> Result<()> {
        for id in 0..NUM_SCALING_MATRICES {
            let matrix = &self.matrices[id];
            let size = matrix_size(id);
            let scan = diag_scan_order(size);
            let ref_id = self.ref_id(id);

            let flat = !matrix.scaling_list_copy_mode_flag && !matrix.scaling_list_pred_mode_flag;
            let default = matrix.scaling_list_pred_id_delta == 0;

            let mut rec = vec![0u8; size * size];
            for (k, &(x, y)) in scan.iter().enumerate() {
                let pos = y as usize * size + x as usize;
                if id > 25 && x >= 4 && y >= 4 {
                    continue;
                }
                let pred = if flat {
                    8
                } else if default {
                    16
                } else {
                    self.matrix_rec[ref_id][pos] as i16
                };
                let value = pred + matrix.scaling_list[k];
                crate::range_check::check("ScalingMatrixRec", value as i64, 1, 255)?;
                rec[pos] = value as u8;
            }

            if id > 13 {
                let dc_pred = if flat {
                    8
                } else if default {
                    16
                } else if ref_id > 13 {
                    self.dc_rec[ref_id - 14] as i16
                } else {
                    self.matrix_rec[ref_id][0] as i16
                };
                let value = dc_pred + matrix.scaling_list_dc_coef;
                crate::range_check::check("ScalingMatrixDCRec", value as i64, 1, 255)?;
                self.dc_rec[id - 14] = value as u8;
            }

            self.matrix_rec.push(rec);
        }

        Ok(())
    }

    /// `ScalingMatrixRec[id][x][y]`. Zero for the high frequency positions of `id > 25`.
    pub fn matrix_rec(&self, id: usize, x: usize, y: usize) -> u8 {
        self.matrix_rec[id][y * matrix_size(id) + x]
    }

    /// `ScalingMatrixDCRec[id - 14]` for `id` in `14..28`.
    pub fn dc_rec(&self, id: usize) -> Option<u8> {
        id.checked_sub(14).and_then(|i| self.dc_rec.get(i)).copied()
    }
}

const fn max_id_delta(id: usize) -> usize {
    if id < 2 {
        id
    } else if id < 8 {
        id - 2
    } else {
        id - 8
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::{ScalingListData, diag_scan_order};
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn diagonal_scan() {
        assert_eq!(diag_scan_order(2), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        let scan = diag_scan_order(4);
        assert_eq!(&scan[..6], [(0, 0), (0, 1), (1, 0), (0, 2), (1, 1), (2, 0)]);
        assert_eq!(scan[15], (3, 3));
        assert_eq!(diag_scan_order(8).len(), 64);
    }

    /// Luma only: ids 2, 5, 8, .., 26 and 27 are coded, the rest are inferred copies.
    fn luma_only(id_26: impl FnOnce(RbspBuilder) -> RbspBuilder) -> Vec<u8> {
        let mut b = RbspBuilder::new();
        for id in (2..26).step_by(3) {
            b = b.flag(true); // scaling_list_copy_mode_flag
            if id != 2 && id != 8 {
                b = b.ue(0); // scaling_list_pred_id_delta
            }
        }
        b = id_26(b);
        b = b.flag(true).ue(1); // id 27 copies id 26
        b.zero_align().into_bytes()
    }

    #[test]
    fn high_frequency_positions_are_not_coded() {
        let mut bits = 0;
        let data = luma_only(|b| {
            // flat prediction, DC +4, then 48 coded deltas
            let mut b = b.flag(false).flag(false).se(4);
            b = b.se(2);
            for _ in 1..48 {
                b = b.se(0);
            }
            bits = b.bit_len();
            b
        });

        let mut reader = RbspReader::new(&data);
        let scaling = ScalingListData::parse(&mut reader, false).unwrap();
        // id 27 adds a flag and a three bit ue(v)
        assert_eq!(reader.bits_read(), bits + 4);

        let m = &scaling.matrices[26];
        assert!(!m.scaling_list_copy_mode_flag);
        assert_eq!(m.scaling_list_dc_coef, 4);
        assert_eq!(scaling.dc_rec(26), Some(12));
        assert_eq!(scaling.matrix_rec(26, 0, 0), 14);
        assert_eq!(scaling.matrix_rec(26, 7, 0), 14);
        assert_eq!(scaling.matrix_rec(26, 4, 4), 0);
        assert_eq!(scaling.matrix_rec(26, 7, 7), 0);

        assert_eq!(scaling.ref_id(27), 26);
        assert_eq!(scaling.matrix_rec(27, 3, 0), 14);
        assert_eq!(scaling.dc_rec(27), Some(12));
    }

    #[test]
    fn absent_chroma_is_inferred_as_default() {
        let data = luma_only(|b| b.flag(true).ue(0));
        let scaling = ScalingListData::parse(&mut RbspReader::new(&data), false).unwrap();

        for id in [0, 1, 3, 4, 13, 25] {
            let m = &scaling.matrices[id];
            assert!(m.scaling_list_copy_mode_flag, "id {id}");
            assert_eq!(m.scaling_list_pred_id_delta, 0);
        }
        assert_eq!(scaling.matrix_rec(0, 1, 1), 16);
        assert_eq!(scaling.matrix_rec(13, 7, 7), 16);
        assert_eq!(scaling.dc_rec(14), Some(16));
        assert_eq!(scaling.dc_rec(13), None);
    }

    #[test]
    fn reconstructed_coefficients_must_stay_positive() {
        // flat prediction of 8 with a first delta of -8
        let data = luma_only(|b| {
            let mut b = b.flag(false).flag(false).se(0).se(-8);
            for _ in 1..48 {
                b = b.se(0);
            }
            b
        });
        assert_eq!(
            ScalingListData::parse(&mut RbspReader::new(&data), false)
                .unwrap_err()
                .to_string(),
            "ScalingMatrixRec is out of range [1, 255]: 0"
        );

        // a DC of 127 over the flat prediction reaches 135, a second delta of 127 overflows
        let data = luma_only(|b| {
            let mut b = b.flag(false).flag(false).se(127);
            for _ in 0..48 {
                b = b.se(0);
            }
            b
        });
        let scaling = ScalingListData::parse(&mut RbspReader::new(&data), false).unwrap();
        assert_eq!(scaling.dc_rec(26), Some(135));
        assert_eq!(scaling.matrix_rec(26, 0, 0), 135);

        let data = luma_only(|b| {
            let mut b = b.flag(false).flag(false).se(127).se(127);
            for _ in 1..48 {
                b = b.se(0);
            }
            b
        });
        assert_eq!(
            ScalingListData::parse(&mut RbspReader::new(&data), false)
                .unwrap_err()
                .to_string(),
            "ScalingMatrixRec is out of range [1, 255]: 262"
        );
    }
}
