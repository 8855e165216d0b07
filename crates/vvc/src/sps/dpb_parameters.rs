use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::RbspReader;

/// Decoded picture buffer sizing, `dpb_parameters()`.
///
/// ISO/IEC 23090-3 - 7.3.4
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DpbParameters {
    pub dpb_max_dec_pic_buffering_minus1: Vec<u32>,
    pub dpb_max_num_reorder_pics: Vec<u32>,
    pub dpb_max_latency_increase_plus1: Vec<u32>,
}

impl DpbParameters {
    pub fn parse(reader: &mut RbspReader, max_sub_layers_minus1: u8, sub_layer_info_flag: bool) -> Result<Self> {
        let len = max_sub_layers_minus1 as usize + 1;
        let mut dpb_max_dec_pic_buffering_minus1 = vec![0; len];
        let mut dpb_max_num_reorder_pics = vec![0; len];
        let mut dpb_max_latency_increase_plus1 = vec![0; len];

        let first = if sub_layer_info_flag { 0 } else { len - 1 };
        for i in first..len {
            let max_dec_pic_buffering_minus1 = reader.read_uev("dpb_max_dec_pic_buffering_minus1")?;
            range_check!(max_dec_pic_buffering_minus1, 0, 15)?;
            if i > first && (max_dec_pic_buffering_minus1 as u32) < dpb_max_dec_pic_buffering_minus1[i - 1] {
                return Err(VvcError::RangeViolation {
                    field: "dpb_max_dec_pic_buffering_minus1",
                    value: max_dec_pic_buffering_minus1 as i64,
                    min: dpb_max_dec_pic_buffering_minus1[i - 1] as i64,
                    max: 15,
                });
            }
            dpb_max_dec_pic_buffering_minus1[i] = max_dec_pic_buffering_minus1 as u32;

            let max_num_reorder_pics = reader.read_uev("dpb_max_num_reorder_pics")?;
            range_check!(max_num_reorder_pics, 0, max_dec_pic_buffering_minus1)?;
            dpb_max_num_reorder_pics[i] = max_num_reorder_pics as u32;

            let max_latency_increase_plus1 = reader.read_uev("dpb_max_latency_increase_plus1")?;
            range_check!(max_latency_increase_plus1, 0, u32::MAX - 1)?;
            dpb_max_latency_increase_plus1[i] = max_latency_increase_plus1 as u32;
        }

        // Lower sub-layers without signalled values take the values of the highest one.
        if !sub_layer_info_flag {
            for values in [
                &mut dpb_max_dec_pic_buffering_minus1,
                &mut dpb_max_num_reorder_pics,
                &mut dpb_max_latency_increase_plus1,
            ] {
                let highest = values[len - 1];
                values.fill(highest);
            }
        }

        Ok(Self {
            dpb_max_dec_pic_buffering_minus1,
            dpb_max_num_reorder_pics,
            dpb_max_latency_increase_plus1,
        })
    }

    /// `MaxLatencyPictures[i]`, `None` when no limit is expressed.
    pub fn max_latency_pictures_at(&self, i: usize) -> Option<u64> {
        Some(
            *self.dpb_max_num_reorder_pics.get(i)? as u64
                + self.dpb_max_latency_increase_plus1.get(i)?.checked_sub(1)? as u64,
        )
    }
}
