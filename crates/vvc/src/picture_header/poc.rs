use super::PictureHeader;
use crate::NALUnitType;
use crate::error::{Result, VvcError};

/// `PicOrderCntMsb` from the previous reference picture's `PicOrderCntVal`.
///
/// ISO/IEC 23090-3 - 8.3.1 (196)
pub(crate) fn derive_pic_order_cnt_msb(pic_order_cnt_lsb: u32, max_pic_order_cnt_lsb: u32, prev_pic_order_cnt: i32) -> i32 {
    let max_lsb = max_pic_order_cnt_lsb as i32;
    let lsb = pic_order_cnt_lsb as i32;
    let prev_lsb = prev_pic_order_cnt & (max_lsb - 1);
    let prev_msb = prev_pic_order_cnt - prev_lsb;

    if lsb < prev_lsb && prev_lsb - lsb >= max_lsb / 2 {
        prev_msb + max_lsb
    } else if lsb > prev_lsb && lsb - prev_lsb > max_lsb / 2 {
        prev_msb - max_lsb
    } else {
        prev_msb
    }
}

impl PictureHeader {
    /// Derives `PicOrderCntMsb` and `PicOrderCntVal`.
    ///
    /// An IDR picture, or an IRAP or GDR picture that starts the stream, restarts the count at its
    /// LSB. Any other picture needs the previous reference picture.
    pub(crate) fn calculate_picture_order_count(
        &mut self,
        nal_unit_type: NALUnitType,
        previous: Option<&PictureHeader>,
    ) -> Result<()> {
        let max_lsb = self.sps().max_pic_order_cnt_lsb();

        self.pic_order_cnt_msb = if self.ph_poc_msb_cycle_present_flag {
            (self.ph_poc_msb_cycle_val * max_lsb) as i32
        } else if nal_unit_type.is_idr() || (previous.is_none() && self.ph_gdr_or_irap_pic_flag) {
            0
        } else {
            let previous = previous.ok_or(VvcError::MissingPreviousPicture)?;
            derive_pic_order_cnt_msb(self.ph_pic_order_cnt_lsb, max_lsb, previous.pic_order_cnt_val)
        };
        self.pic_order_cnt_val = self.pic_order_cnt_msb + self.ph_pic_order_cnt_lsb as i32;

        tracing::trace!(poc = self.pic_order_cnt_val, lsb = self.ph_pic_order_cnt_lsb, "derived picture order count");
        Ok(())
    }

    /// `PicOrderCntMsb`.
    #[inline]
    pub const fn pic_order_cnt_msb(&self) -> i32 {
        self.pic_order_cnt_msb
    }

    /// `PicOrderCntVal`.
    #[inline]
    pub const fn pic_order_cnt_val(&self) -> i32 {
        self.pic_order_cnt_val
    }

    /// Returns `true` if this picture can be the previous picture of a later POC derivation.
    ///
    /// `TemporalId` must be 0 and the picture must not be a RASL, RADL or non-reference picture.
    pub fn is_poc_anchor(&self, nal_unit_type: NALUnitType, temporal_id: u8) -> bool {
        temporal_id == 0 && !nal_unit_type.is_leading() && !self.ph_non_ref_pic_flag
    }
}
