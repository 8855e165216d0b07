use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::{RbspReader, ceil_log2};

/// Position and size of one subpicture, in CTUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpicLayout {
    pub sps_subpic_ctu_top_left_x: u32,
    pub sps_subpic_ctu_top_left_y: u32,
    pub sps_subpic_width_minus1: u32,
    pub sps_subpic_height_minus1: u32,
    pub sps_subpic_treated_as_pic_flag: bool,
    pub sps_loop_filter_across_subpic_enabled_flag: bool,
}

/// The subpicture layout of the SPS.
///
/// When `sps_subpic_info_present_flag` is 0 this holds a single subpicture covering the picture.
///
/// ISO/IEC 23090-3 - 7.3.2.4 / 7.4.3.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpicInfo {
    pub sps_subpic_info_present_flag: bool,
    pub sps_num_subpics_minus1: u32,
    pub sps_independent_subpics_flag: bool,
    pub sps_subpic_same_size_flag: bool,
    pub subpics: Vec<SubpicLayout>,
    pub sps_subpic_id_len_minus1: u8,
    pub sps_subpic_id_mapping_explicitly_signalled_flag: bool,
    pub sps_subpic_id_mapping_present_flag: bool,
    /// Only filled when `sps_subpic_id_mapping_present_flag` is set.
    pub sps_subpic_id: Vec<u32>,
}

impl SubpicInfo {
    /// A single subpicture spanning `width_in_ctbs` x `height_in_ctbs`.
    pub fn single(width_in_ctbs: u32, height_in_ctbs: u32) -> Self {
        Self {
            sps_subpic_info_present_flag: false,
            sps_num_subpics_minus1: 0,
            sps_independent_subpics_flag: true,
            sps_subpic_same_size_flag: false,
            subpics: vec![SubpicLayout {
                sps_subpic_ctu_top_left_x: 0,
                sps_subpic_ctu_top_left_y: 0,
                sps_subpic_width_minus1: width_in_ctbs - 1,
                sps_subpic_height_minus1: height_in_ctbs - 1,
                sps_subpic_treated_as_pic_flag: true,
                sps_loop_filter_across_subpic_enabled_flag: false,
            }],
            sps_subpic_id_len_minus1: 0,
            sps_subpic_id_mapping_explicitly_signalled_flag: false,
            sps_subpic_id_mapping_present_flag: false,
            sps_subpic_id: Vec::new(),
        }
    }

    /// Parses the subpicture syntax following `sps_subpic_info_present_flag` equal to 1.
    pub fn parse(
        reader: &mut RbspReader,
        pic_width_max_in_luma_samples: u32,
        pic_height_max_in_luma_samples: u32,
        ctb_log2_size_y: u8,
    ) -> Result<Self> {
        let ctb_size_y = 1u32 << ctb_log2_size_y;
        let tmp_width_val = pic_width_max_in_luma_samples.div_ceil(ctb_size_y);
        let tmp_height_val = pic_height_max_in_luma_samples.div_ceil(ctb_size_y);
        let x_bits = ceil_log2(tmp_width_val as u64);
        let y_bits = ceil_log2(tmp_height_val as u64);

        let mut info = Self::single(tmp_width_val, tmp_height_val);
        info.sps_subpic_info_present_flag = true;

        let sps_num_subpics_minus1 = reader.read_uev("sps_num_subpics_minus1")?;
        range_check!(sps_num_subpics_minus1, 0, tmp_width_val * tmp_height_val - 1)?;
        let n = sps_num_subpics_minus1 as u32;
        info.sps_num_subpics_minus1 = n;

        if n > 0 {
            info.sps_independent_subpics_flag = reader.read_flag("sps_independent_subpics_flag")?;
            info.sps_subpic_same_size_flag = reader.read_flag("sps_subpic_same_size_flag")?;

            info.subpics.clear();
            for i in 0..=n {
                let mut layout = if !info.sps_subpic_same_size_flag || i == 0 {
                    let mut x = 0;
                    let mut y = 0;
                    if i > 0 && pic_width_max_in_luma_samples > ctb_size_y {
                        x = reader.read_bits("sps_subpic_ctu_top_left_x", x_bits)? as u32;
                        range_check!("sps_subpic_ctu_top_left_x", x, 0, tmp_width_val - 1)?;
                    }
                    if i > 0 && pic_height_max_in_luma_samples > ctb_size_y {
                        y = reader.read_bits("sps_subpic_ctu_top_left_y", y_bits)? as u32;
                        range_check!("sps_subpic_ctu_top_left_y", y, 0, tmp_height_val - 1)?;
                    }

                    let width_minus1 = if i < n && pic_width_max_in_luma_samples > ctb_size_y {
                        let width_minus1 = reader.read_bits("sps_subpic_width_minus1", x_bits)? as u32;
                        range_check!("sps_subpic_width_minus1", width_minus1, 0, tmp_width_val - 1 - x)?;
                        width_minus1
                    } else {
                        tmp_width_val - 1 - x
                    };
                    let height_minus1 = if i < n && pic_height_max_in_luma_samples > ctb_size_y {
                        let height_minus1 = reader.read_bits("sps_subpic_height_minus1", y_bits)? as u32;
                        range_check!("sps_subpic_height_minus1", height_minus1, 0, tmp_height_val - 1 - y)?;
                        height_minus1
                    } else {
                        tmp_height_val - 1 - y
                    };

                    SubpicLayout {
                        sps_subpic_ctu_top_left_x: x,
                        sps_subpic_ctu_top_left_y: y,
                        sps_subpic_width_minus1: width_minus1,
                        sps_subpic_height_minus1: height_minus1,
                        sps_subpic_treated_as_pic_flag: true,
                        sps_loop_filter_across_subpic_enabled_flag: false,
                    }
                } else {
                    // (37)
                    let first = info.subpics[0];
                    let width = first.sps_subpic_width_minus1 + 1;
                    let height = first.sps_subpic_height_minus1 + 1;
                    let num_subpic_cols = tmp_width_val / width;
                    let top_left_y = (i / num_subpic_cols) * height;
                    if top_left_y + height > tmp_height_val {
                        return Err(VvcError::RangeViolation {
                            field: "sps_num_subpics_minus1",
                            value: n as i64,
                            min: 0,
                            max: (num_subpic_cols * (tmp_height_val / height)) as i64 - 1,
                        });
                    }
                    SubpicLayout {
                        sps_subpic_ctu_top_left_x: (i % num_subpic_cols) * width,
                        sps_subpic_ctu_top_left_y: top_left_y,
                        ..first
                    }
                };

                if !info.sps_independent_subpics_flag {
                    layout.sps_subpic_treated_as_pic_flag = reader.read_flag("sps_subpic_treated_as_pic_flag")?;
                    layout.sps_loop_filter_across_subpic_enabled_flag =
                        reader.read_flag("sps_loop_filter_across_subpic_enabled_flag")?;
                }

                info.subpics.push(layout);
            }
        }

        let sps_subpic_id_len_minus1 = reader.read_uev("sps_subpic_id_len_minus1")?;
        range_check!(sps_subpic_id_len_minus1, 0, 15)?;
        if (1u64 << (sps_subpic_id_len_minus1 + 1)) < n as u64 + 1 {
            return Err(VvcError::RangeViolation {
                field: "sps_subpic_id_len_minus1",
                value: sps_subpic_id_len_minus1 as i64,
                min: ceil_log2(n as u64 + 1) as i64 - 1,
                max: 15,
            });
        }
        info.sps_subpic_id_len_minus1 = sps_subpic_id_len_minus1 as u8;

        info.sps_subpic_id_mapping_explicitly_signalled_flag =
            reader.read_flag("sps_subpic_id_mapping_explicitly_signalled_flag")?;
        if info.sps_subpic_id_mapping_explicitly_signalled_flag {
            info.sps_subpic_id_mapping_present_flag = reader.read_flag("sps_subpic_id_mapping_present_flag")?;
            if info.sps_subpic_id_mapping_present_flag {
                info.sps_subpic_id = (0..=n)
                    .map(|_| {
                        reader
                            .read_bits("sps_subpic_id", sps_subpic_id_len_minus1 as u32 + 1)
                            .map(|v| v as u32)
                    })
                    .collect::<Result<_>>()?;
            }
        }

        Ok(info)
    }

    pub fn num_subpics(&self) -> usize {
        self.subpics.len()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::SubpicInfo;
    use crate::VvcError;
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn same_size_grid() {
        // 1024x512 with 128 CTUs is 8x4 CTUs, four subpictures of 4x2
        let data = RbspBuilder::new()
            .ue(3)
            .flag(true) // independent
            .flag(true) // same size
            .bits(3, 3) // width_minus1
            .bits(1, 2) // height_minus1
            .ue(1) // id len
            .flag(false)
            .trailing();

        let info = SubpicInfo::parse(&mut RbspReader::new(&data), 1024, 512, 7).unwrap();
        let origins: Vec<_> = info
            .subpics
            .iter()
            .map(|s| (s.sps_subpic_ctu_top_left_x, s.sps_subpic_ctu_top_left_y))
            .collect();
        assert_eq!(origins, [(0, 0), (4, 0), (0, 2), (4, 2)]);
        assert!(info.subpics.iter().all(|s| s.sps_subpic_treated_as_pic_flag));
    }

    #[test]
    fn explicit_layout_with_ids() {
        // 4x4 CTUs, left half and right half
        let data = RbspBuilder::new()
            .ue(1)
            .flag(false) // independent
            .flag(false) // same size
            .bits(1, 2) // width_minus1[0]
            .bits(3, 2) // height_minus1[0]
            .flag(true)
            .flag(false)
            .bits(2, 2) // top_left_x[1]
            .bits(0, 2) // top_left_y[1]
            .flag(false)
            .flag(true)
            .ue(3) // id len minus1
            .flag(true)
            .flag(true)
            .bits(7, 4)
            .bits(9, 4)
            .trailing();

        let info = SubpicInfo::parse(&mut RbspReader::new(&data), 256, 256, 6).unwrap();
        assert_eq!(info.num_subpics(), 2);
        assert_eq!(info.subpics[1].sps_subpic_ctu_top_left_x, 2);
        assert_eq!(info.subpics[1].sps_subpic_width_minus1, 1);
        assert_eq!(info.subpics[1].sps_subpic_height_minus1, 3);
        assert!(!info.subpics[1].sps_subpic_treated_as_pic_flag);
        assert!(info.subpics[1].sps_loop_filter_across_subpic_enabled_flag);
        assert_eq!(info.sps_subpic_id, [7, 9]);
    }

    #[test]
    fn subpicture_wider_than_picture() {
        // 192x64 with 64 CTUs is 3x1 CTUs, a 4 CTU wide subpicture does not fit
        let data = RbspBuilder::new()
            .ue(1)
            .flag(true) // independent
            .flag(true) // same size
            .bits(3, 2) // width_minus1
            .ue(0)
            .flag(false)
            .trailing();

        let err = SubpicInfo::parse(&mut RbspReader::new(&data), 192, 64, 6).unwrap_err();
        assert!(matches!(
            err,
            VvcError::RangeViolation {
                field: "sps_subpic_width_minus1",
                value: 3,
                min: 0,
                max: 2
            }
        ));
    }

    #[test]
    fn subpicture_origin_outside_picture() {
        // 3x4 CTUs, the second subpicture starts at column 3
        let data = RbspBuilder::new()
            .ue(1)
            .flag(true)
            .flag(false)
            .bits(0, 2) // width_minus1[0]
            .bits(3, 2) // height_minus1[0]
            .bits(3, 2) // top_left_x[1]
            .trailing();

        let err = SubpicInfo::parse(&mut RbspReader::new(&data), 192, 256, 6).unwrap_err();
        assert!(matches!(
            err,
            VvcError::RangeViolation {
                field: "sps_subpic_ctu_top_left_x",
                value: 3,
                ..
            }
        ));
    }

    #[test]
    fn same_size_grid_must_fit_vertically() {
        // 2x2 CTUs of 2x1 subpictures holds two, not three
        let data = RbspBuilder::new()
            .ue(2)
            .flag(true)
            .flag(true)
            .bits(1, 1) // width_minus1
            .bits(0, 1) // height_minus1
            .trailing();

        let err = SubpicInfo::parse(&mut RbspReader::new(&data), 128, 128, 6).unwrap_err();
        assert!(matches!(
            err,
            VvcError::RangeViolation {
                field: "sps_num_subpics_minus1",
                value: 2,
                max: 1,
                ..
            }
        ));
    }
}
