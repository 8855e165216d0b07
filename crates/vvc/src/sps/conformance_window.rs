use crate::error::Result;
use crate::reader::RbspReader;

/// `ConformanceWindow` contains the frame cropping info.
///
/// The same four offsets are used by the SPS (`sps_conf_win_*`) and the PPS (`pps_conf_win_*`),
/// and, signed, by the PPS scaling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConformanceWindow {
    /// The left crop offset which is used to compute the width:
    ///
    /// `width = pic_width_in_luma_samples - sub_width_c * (left_offset + right_offset)`
    pub left_offset: u32,
    /// The right crop offset which is used to compute the width.
    pub right_offset: u32,
    /// The top crop offset which is used to compute the height:
    ///
    /// `height = pic_height_in_luma_samples - sub_height_c * (top_offset + bottom_offset)`
    pub top_offset: u32,
    /// The bottom crop offset which is used to compute the height.
    pub bottom_offset: u32,
}

impl ConformanceWindow {
    /// Parses the four `ue(v)` offsets of a conformance window.
    pub fn parse(
        reader: &mut RbspReader,
        names: [&'static str; 4],
    ) -> Result<Self> {
        Ok(Self {
            left_offset: reader.read_uev(names[0])? as u32,
            right_offset: reader.read_uev(names[1])? as u32,
            top_offset: reader.read_uev(names[2])? as u32,
            bottom_offset: reader.read_uev(names[3])? as u32,
        })
    }

    /// Returns `true` if no cropping is applied.
    pub const fn is_empty(&self) -> bool {
        self.left_offset == 0 && self.right_offset == 0 && self.top_offset == 0 && self.bottom_offset == 0
    }
}

/// The signed scaling window offsets of the PPS.
///
/// ISO/IEC 23090-3 - 7.4.3.5
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalingWindow {
    pub left_offset: i32,
    pub right_offset: i32,
    pub top_offset: i32,
    pub bottom_offset: i32,
}

impl ScalingWindow {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        Ok(Self {
            left_offset: reader.read_sev("pps_scaling_win_left_offset")? as i32,
            right_offset: reader.read_sev("pps_scaling_win_right_offset")? as i32,
            top_offset: reader.read_sev("pps_scaling_win_top_offset")? as i32,
            bottom_offset: reader.read_sev("pps_scaling_win_bottom_offset")? as i32,
        })
    }
}
