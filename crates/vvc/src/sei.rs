//! Supplemental enhancement information.

use std::sync::Arc;

use crate::NALUnitType;
use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::{RbspReader, ceil_log2};
use crate::sps::{GeneralTimingHrdParameters, Sps};

/// `payloadType` of a buffering period SEI message.
pub const BUFFERING_PERIOD: u32 = 0;
/// `payloadType` of a picture timing SEI message.
pub const PIC_TIMING: u32 = 1;

/// `sei_rbsp()`.
///
/// ISO/IEC 23090-3 - 7.3.2.8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeiRbsp {
    /// At least one message.
    pub messages: Vec<SeiMessage>,
}

impl SeiRbsp {
    /// Parses every `sei_message()` of the RBSP.
    ///
    /// `sps` supplies the HRD parameters the buffering period is checked against. A picture timing
    /// message is interpreted with the buffering period that precedes it in this NAL unit, or
    /// `buffering_period` if there is none.
    pub fn parse(
        reader: &mut RbspReader,
        nal_unit_type: NALUnitType,
        temporal_id: u8,
        sps: Option<&Sps>,
        buffering_period: Option<&Arc<BufferingPeriod>>,
    ) -> Result<Self> {
        let mut active = buffering_period.cloned();
        let mut messages = Vec::new();

        loop {
            let message = SeiMessage::parse(reader, nal_unit_type, temporal_id, sps, active.as_ref())?;
            if let SeiPayload::BufferingPeriod(bp) = &message.payload {
                active = Some(bp.clone());
            }
            messages.push(message);

            if !reader.more_rbsp_data() {
                break;
            }
        }
        reader.read_rbsp_trailing_bits()?;

        Ok(Self { messages })
    }

    /// The last buffering period carried by this NAL unit.
    pub fn buffering_period(&self) -> Option<&Arc<BufferingPeriod>> {
        self.messages.iter().rev().find_map(|m| match &m.payload {
            SeiPayload::BufferingPeriod(bp) => Some(bp),
            _ => None,
        })
    }

    pub fn pic_timing(&self) -> Option<&PicTiming> {
        self.messages.iter().find_map(|m| match &m.payload {
            SeiPayload::PicTiming(pt) => Some(pt),
            _ => None,
        })
    }
}

/// `sei_message()`.
///
/// ISO/IEC 23090-3 - 7.3.6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeiMessage {
    pub payload_type: u32,
    /// In bytes.
    pub payload_size: u32,
    pub payload: SeiPayload,
}

/// The decoded content of an SEI message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeiPayload {
    BufferingPeriod(Arc<BufferingPeriod>),
    PicTiming(PicTiming),
    /// Any other payload type, or a buffering period or picture timing in a suffix SEI NAL unit.
    /// The payload bytes are skipped.
    Other,
}

impl SeiMessage {
    fn parse(
        reader: &mut RbspReader,
        nal_unit_type: NALUnitType,
        temporal_id: u8,
        sps: Option<&Sps>,
        buffering_period: Option<&Arc<BufferingPeriod>>,
    ) -> Result<Self> {
        let payload_type = read_ff_coded(reader, "payload_type_byte")?;
        let payload_size = read_ff_coded(reader, "payload_size_byte")?;
        let payload_bits = payload_size as usize * 8;
        if payload_bits > reader.bits_remaining() {
            return Err(VvcError::BitstreamExhausted {
                field: "sei_payload",
                requested: payload_bits,
                remaining: reader.bits_remaining(),
            });
        }

        let start = reader.bits_read();
        let payload = match (nal_unit_type, payload_type) {
            (NALUnitType::PrefixSeiNut, BUFFERING_PERIOD) => {
                let hrd = sps.and_then(|sps| sps.timing_hrd.as_ref()).map(|t| &t.general);
                let max_sublayers_minus1 = sps.map_or(6, |sps| sps.sps_max_sublayers_minus1);
                SeiPayload::BufferingPeriod(Arc::new(BufferingPeriod::parse(reader, hrd, max_sublayers_minus1)?))
            }
            (NALUnitType::PrefixSeiNut, PIC_TIMING) => {
                let bp = buffering_period.ok_or(VvcError::MissingBufferingPeriod)?;
                SeiPayload::PicTiming(PicTiming::parse(reader, bp, temporal_id)?)
            }
            _ => SeiPayload::Other,
        };

        let consumed = reader.bits_read() - start;
        if consumed > payload_bits {
            return Err(VvcError::BitstreamExhausted {
                field: "sei_payload",
                requested: consumed,
                remaining: payload_bits,
            });
        }
        // reserved extension data and the payload alignment bits
        reader.skip_bits("sei_payload_extension", payload_bits - consumed)?;

        Ok(Self {
            payload_type,
            payload_size,
            payload,
        })
    }
}

/// Reads a value coded as a run of `0xFF` bytes followed by a final byte.
fn read_ff_coded(reader: &mut RbspReader, name: &'static str) -> Result<u32> {
    let mut value = 0u32;
    loop {
        let byte = reader.read_bits(name, 8)? as u32;
        value = value.saturating_add(byte);
        if byte != 0xFF {
            return Ok(value);
        }
    }
}

/// The initial CPB removal delay and offset of one CPB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitialCpbRemoval {
    pub initial_cpb_removal_delay: u32,
    pub initial_cpb_removal_offset: u32,
    /// Zero unless `bp_du_hrd_params_present_flag` is set.
    pub initial_alt_cpb_removal_delay: u32,
    /// Zero unless `bp_du_hrd_params_present_flag` is set.
    pub initial_alt_cpb_removal_offset: u32,
}

/// `buffering_period()`.
///
/// ISO/IEC 23090-3 - D.2.2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferingPeriod {
    pub bp_nal_hrd_params_present_flag: bool,
    pub bp_vcl_hrd_params_present_flag: bool,
    /// The value ranges from \[0, 31\].
    pub bp_cpb_initial_removal_delay_length_minus1: u8,
    /// The value ranges from \[0, 31\].
    pub bp_cpb_removal_delay_length_minus1: u8,
    /// The value ranges from \[0, 31\].
    pub bp_dpb_output_delay_length_minus1: u8,
    pub bp_du_hrd_params_present_flag: bool,
    pub bp_du_cpb_removal_delay_increment_length_minus1: u8,
    pub bp_dpb_output_delay_du_length_minus1: u8,
    pub bp_du_cpb_params_in_pic_timing_sei_flag: bool,
    pub bp_du_dpb_params_in_pic_timing_sei_flag: bool,
    pub bp_concatenation_flag: bool,
    pub bp_additional_concatenation_info_present_flag: bool,
    pub bp_max_initial_removal_delay_for_concatenation: u32,
    pub bp_cpb_removal_delay_delta_minus1: u32,
    /// The value ranges from \[0, `sps_max_sublayers_minus1`\].
    pub bp_max_sublayers_minus1: u8,
    pub bp_cpb_removal_delay_deltas_present_flag: bool,
    /// The value ranges from \[0, 15\].
    pub bp_num_cpb_removal_delay_deltas_minus1: u8,
    pub bp_cpb_removal_delay_delta_val: Vec<u32>,
    /// Equal to `hrd_cpb_cnt_minus1`.
    pub bp_cpb_cnt_minus1: u8,
    pub bp_sublayer_initial_cpb_removal_delay_present_flag: bool,
    /// Indexed by sub-layer, then CPB. Empty without NAL HRD parameters.
    ///
    /// Sub-layers below `bp_max_sublayers_minus1` copy the highest one when they are not signalled.
    pub nal_initial_cpb_removal: Vec<Vec<InitialCpbRemoval>>,
    /// Indexed by sub-layer, then CPB. Empty without VCL HRD parameters.
    pub vcl_initial_cpb_removal: Vec<Vec<InitialCpbRemoval>>,
    pub bp_sublayer_dpb_output_offsets_present_flag: bool,
    /// Indexed by sub-layer, `0..=bp_max_sublayers_minus1`.
    pub bp_dpb_output_tid_offset: Vec<u32>,
    pub bp_alt_cpb_params_present_flag: bool,
    pub bp_use_alt_cpb_params_flag: bool,
}

impl BufferingPeriod {
    pub fn parse(
        reader: &mut RbspReader,
        hrd: Option<&GeneralTimingHrdParameters>,
        max_sublayers_minus1: u8,
    ) -> Result<Self> {
        let mut bp = Self {
            bp_nal_hrd_params_present_flag: reader.read_flag("bp_nal_hrd_params_present_flag")?,
            bp_vcl_hrd_params_present_flag: reader.read_flag("bp_vcl_hrd_params_present_flag")?,
            bp_cpb_initial_removal_delay_length_minus1: reader
                .read_bits("bp_cpb_initial_removal_delay_length_minus1", 5)?
                as u8,
            bp_cpb_removal_delay_length_minus1: reader.read_bits("bp_cpb_removal_delay_length_minus1", 5)? as u8,
            bp_dpb_output_delay_length_minus1: reader.read_bits("bp_dpb_output_delay_length_minus1", 5)? as u8,
            bp_du_hrd_params_present_flag: reader.read_flag("bp_du_hrd_params_present_flag")?,
            ..Default::default()
        };

        if bp.bp_du_hrd_params_present_flag {
            bp.bp_du_cpb_removal_delay_increment_length_minus1 =
                reader.read_bits("bp_du_cpb_removal_delay_increment_length_minus1", 5)? as u8;
            bp.bp_dpb_output_delay_du_length_minus1 = reader.read_bits("bp_dpb_output_delay_du_length_minus1", 5)? as u8;
            bp.bp_du_cpb_params_in_pic_timing_sei_flag = reader.read_flag("bp_du_cpb_params_in_pic_timing_sei_flag")?;
            bp.bp_du_dpb_params_in_pic_timing_sei_flag = reader.read_flag("bp_du_dpb_params_in_pic_timing_sei_flag")?;
        }

        bp.bp_concatenation_flag = reader.read_flag("bp_concatenation_flag")?;
        bp.bp_additional_concatenation_info_present_flag =
            reader.read_flag("bp_additional_concatenation_info_present_flag")?;
        let initial_removal_len = bp.bp_cpb_initial_removal_delay_length_minus1 as u32 + 1;
        let removal_len = bp.bp_cpb_removal_delay_length_minus1 as u32 + 1;
        if bp.bp_additional_concatenation_info_present_flag {
            bp.bp_max_initial_removal_delay_for_concatenation =
                reader.read_bits("bp_max_initial_removal_delay_for_concatenation", initial_removal_len)? as u32;
        }
        bp.bp_cpb_removal_delay_delta_minus1 =
            reader.read_bits("bp_cpb_removal_delay_delta_minus1", removal_len)? as u32;

        let bp_max_sublayers_minus1 = reader.read_bits("bp_max_sublayers_minus1", 3)?;
        range_check!(bp_max_sublayers_minus1, 0, max_sublayers_minus1)?;
        bp.bp_max_sublayers_minus1 = bp_max_sublayers_minus1 as u8;
        let max_sublayer = bp.bp_max_sublayers_minus1 as usize;

        if max_sublayer > 0 {
            bp.bp_cpb_removal_delay_deltas_present_flag = reader.read_flag("bp_cpb_removal_delay_deltas_present_flag")?;
        }
        if bp.bp_cpb_removal_delay_deltas_present_flag {
            let bp_num_cpb_removal_delay_deltas_minus1 = reader.read_uev("bp_num_cpb_removal_delay_deltas_minus1")?;
            range_check!(bp_num_cpb_removal_delay_deltas_minus1, 0, 15)?;
            bp.bp_num_cpb_removal_delay_deltas_minus1 = bp_num_cpb_removal_delay_deltas_minus1 as u8;
            for _ in 0..=bp_num_cpb_removal_delay_deltas_minus1 {
                bp.bp_cpb_removal_delay_delta_val
                    .push(reader.read_bits("bp_cpb_removal_delay_delta_val", removal_len)? as u32);
            }
        }

        let bp_cpb_cnt_minus1 = reader.read_uev("bp_cpb_cnt_minus1")?;
        match hrd {
            Some(hrd) => range_check!(bp_cpb_cnt_minus1, hrd.hrd_cpb_cnt_minus1, hrd.hrd_cpb_cnt_minus1)?,
            None => range_check!(bp_cpb_cnt_minus1, 0, 31)?,
        }
        bp.bp_cpb_cnt_minus1 = bp_cpb_cnt_minus1 as u8;

        if max_sublayer > 0 {
            bp.bp_sublayer_initial_cpb_removal_delay_present_flag =
                reader.read_flag("bp_sublayer_initial_cpb_removal_delay_present_flag")?;
        }
        let first_sublayer = if bp.bp_sublayer_initial_cpb_removal_delay_present_flag {
            0
        } else {
            max_sublayer
        };

        let cpb_count = bp.bp_cpb_cnt_minus1 as usize + 1;
        if bp.bp_nal_hrd_params_present_flag {
            bp.nal_initial_cpb_removal = vec![Vec::new(); max_sublayer + 1];
        }
        if bp.bp_vcl_hrd_params_present_flag {
            bp.vcl_initial_cpb_removal = vec![Vec::new(); max_sublayer + 1];
        }
        for i in first_sublayer..=max_sublayer {
            if bp.bp_nal_hrd_params_present_flag {
                bp.nal_initial_cpb_removal[i] = read_initial_cpb_removals(
                    reader,
                    [
                        "bp_nal_initial_cpb_removal_delay",
                        "bp_nal_initial_cpb_removal_offset",
                        "bp_nal_initial_alt_cpb_removal_delay",
                        "bp_nal_initial_alt_cpb_removal_offset",
                    ],
                    cpb_count,
                    initial_removal_len,
                    bp.bp_du_hrd_params_present_flag,
                )?;
            }
            if bp.bp_vcl_hrd_params_present_flag {
                bp.vcl_initial_cpb_removal[i] = read_initial_cpb_removals(
                    reader,
                    [
                        "bp_vcl_initial_cpb_removal_delay",
                        "bp_vcl_initial_cpb_removal_offset",
                        "bp_vcl_initial_alt_cpb_removal_delay",
                        "bp_vcl_initial_alt_cpb_removal_offset",
                    ],
                    cpb_count,
                    initial_removal_len,
                    bp.bp_du_hrd_params_present_flag,
                )?;
            }
        }
        for removals in [&mut bp.nal_initial_cpb_removal, &mut bp.vcl_initial_cpb_removal] {
            if let Some(highest) = removals.last().cloned() {
                removals[..first_sublayer].fill(highest);
            }
        }

        if max_sublayer > 0 {
            bp.bp_sublayer_dpb_output_offsets_present_flag =
                reader.read_flag("bp_sublayer_dpb_output_offsets_present_flag")?;
        }
        bp.bp_dpb_output_tid_offset = vec![0; max_sublayer + 1];
        if bp.bp_sublayer_dpb_output_offsets_present_flag {
            for offset in &mut bp.bp_dpb_output_tid_offset[..max_sublayer] {
                let value = reader.read_uev("bp_dpb_output_tid_offset")?;
                range_check!("bp_dpb_output_tid_offset", value, 0, u32::MAX)?;
                *offset = value as u32;
            }
        }

        bp.bp_alt_cpb_params_present_flag = reader.read_flag("bp_alt_cpb_params_present_flag")?;
        if bp.bp_alt_cpb_params_present_flag {
            bp.bp_use_alt_cpb_params_flag = reader.read_flag("bp_use_alt_cpb_params_flag")?;
        }

        Ok(bp)
    }

    /// Sub-layers whose timing is signalled: all of them if
    /// `bp_sublayer_initial_cpb_removal_delay_present_flag` is set, otherwise only the highest.
    pub fn signalled_sublayers(&self) -> std::ops::RangeInclusive<usize> {
        let max = self.bp_max_sublayers_minus1 as usize;
        if self.bp_sublayer_initial_cpb_removal_delay_present_flag {
            0..=max
        } else {
            max..=max
        }
    }
}

fn read_initial_cpb_removals(
    reader: &mut RbspReader,
    names: [&'static str; 4],
    cpb_count: usize,
    len: u32,
    alt: bool,
) -> Result<Vec<InitialCpbRemoval>> {
    let mut removals = Vec::with_capacity(cpb_count);
    for _ in 0..cpb_count {
        let mut removal = InitialCpbRemoval {
            initial_cpb_removal_delay: reader.read_bits(names[0], len)? as u32,
            initial_cpb_removal_offset: reader.read_bits(names[1], len)? as u32,
            ..Default::default()
        };
        if alt {
            removal.initial_alt_cpb_removal_delay = reader.read_bits(names[2], len)? as u32;
            removal.initial_alt_cpb_removal_offset = reader.read_bits(names[3], len)? as u32;
        }
        removals.push(removal);
    }

    Ok(removals)
}

/// Alternative CPB timing of one sub-layer in a picture timing SEI message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltCpbTiming {
    /// Indexed by CPB.
    pub cpb_alt_initial_removal_delay_delta: Vec<u32>,
    /// Indexed by CPB.
    pub cpb_alt_initial_removal_offset_delta: Vec<u32>,
    pub cpb_delay_offset: u32,
    pub dpb_delay_offset: u32,
}

/// `pic_timing()`.
///
/// ISO/IEC 23090-3 - D.2.3
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PicTiming {
    /// Indexed by sub-layer, `0..=bp_max_sublayers_minus1`. Zero where not signalled.
    pub pt_cpb_removal_delay_minus1: Vec<u32>,
    /// Indexed by sub-layer. Always set for `bp_max_sublayers_minus1`.
    pub pt_sublayer_delays_present_flag: Vec<bool>,
    /// Indexed by sub-layer.
    pub pt_cpb_removal_delay_delta_enabled_flag: Vec<bool>,
    /// Indexed by sub-layer.
    pub pt_cpb_removal_delay_delta_idx: Vec<u8>,
    pub pt_dpb_output_delay: u32,
    pub pt_cpb_alt_timing_info_present_flag: bool,
    /// Indexed by sub-layer. Empty unless alternative timing is present for the NAL HRD.
    pub nal_alt_timing: Vec<AltCpbTiming>,
    /// Indexed by sub-layer. Empty unless alternative timing is present for the VCL HRD.
    pub vcl_alt_timing: Vec<AltCpbTiming>,
    pub pt_dpb_output_du_delay: u32,
    pub pt_num_decoding_units_minus1: u32,
    pub pt_du_common_cpb_removal_delay_flag: bool,
    /// Indexed by sub-layer.
    pub pt_du_common_cpb_removal_delay_increment_minus1: Vec<u32>,
    /// Indexed by decoding unit.
    pub pt_num_nalus_in_du_minus1: Vec<u32>,
    /// Indexed by decoding unit, then sub-layer.
    pub pt_du_cpb_removal_delay_increment_minus1: Vec<Vec<u32>>,
    pub pt_delay_for_concatenation_ensured_flag: bool,
    pub pt_display_elemental_periods_minus1: u8,
}

impl PicTiming {
    /// `temporal_id` is the `TemporalId` of the SEI NAL unit.
    pub fn parse(reader: &mut RbspReader, bp: &BufferingPeriod, temporal_id: u8) -> Result<Self> {
        let max_sublayer = bp.bp_max_sublayers_minus1 as usize;
        let first = temporal_id as usize;
        let removal_len = bp.bp_cpb_removal_delay_length_minus1 as u32 + 1;
        let initial_removal_len = bp.bp_cpb_initial_removal_delay_length_minus1 as u32 + 1;
        let output_len = bp.bp_dpb_output_delay_length_minus1 as u32 + 1;
        let du_increment_len = bp.bp_du_cpb_removal_delay_increment_length_minus1 as u32 + 1;

        let mut pt = Self {
            pt_cpb_removal_delay_minus1: vec![0; max_sublayer + 1],
            pt_sublayer_delays_present_flag: vec![false; max_sublayer + 1],
            pt_cpb_removal_delay_delta_enabled_flag: vec![false; max_sublayer + 1],
            pt_cpb_removal_delay_delta_idx: vec![0; max_sublayer + 1],
            ..Default::default()
        };
        pt.pt_cpb_removal_delay_minus1[max_sublayer] =
            reader.read_bits("pt_cpb_removal_delay_minus1", removal_len)? as u32;
        pt.pt_sublayer_delays_present_flag[max_sublayer] = true;

        for i in first..max_sublayer {
            pt.pt_sublayer_delays_present_flag[i] = reader.read_flag("pt_sublayer_delays_present_flag")?;
            if !pt.pt_sublayer_delays_present_flag[i] {
                continue;
            }

            if bp.bp_cpb_removal_delay_deltas_present_flag {
                pt.pt_cpb_removal_delay_delta_enabled_flag[i] =
                    reader.read_flag("pt_cpb_removal_delay_delta_enabled_flag")?;
            }
            if pt.pt_cpb_removal_delay_delta_enabled_flag[i] {
                if bp.bp_num_cpb_removal_delay_deltas_minus1 > 0 {
                    let bits = ceil_log2(bp.bp_num_cpb_removal_delay_deltas_minus1 as u64 + 1);
                    let idx = reader.read_bits("pt_cpb_removal_delay_delta_idx", bits)?;
                    range_check!("pt_cpb_removal_delay_delta_idx", idx, 0, bp.bp_num_cpb_removal_delay_deltas_minus1)?;
                    pt.pt_cpb_removal_delay_delta_idx[i] = idx as u8;
                }
            } else {
                pt.pt_cpb_removal_delay_minus1[i] = reader.read_bits("pt_cpb_removal_delay_minus1", removal_len)? as u32;
            }
        }

        pt.pt_dpb_output_delay = reader.read_bits("pt_dpb_output_delay", output_len)? as u32;

        if bp.bp_alt_cpb_params_present_flag {
            pt.pt_cpb_alt_timing_info_present_flag = reader.read_flag("pt_cpb_alt_timing_info_present_flag")?;
            if pt.pt_cpb_alt_timing_info_present_flag {
                let lens = [initial_removal_len, removal_len, output_len];
                if bp.bp_nal_hrd_params_present_flag {
                    pt.nal_alt_timing = read_alt_timing(
                        reader,
                        bp,
                        [
                            "pt_nal_cpb_alt_initial_removal_delay_delta",
                            "pt_nal_cpb_alt_initial_removal_offset_delta",
                            "pt_nal_cpb_delay_offset",
                            "pt_nal_dpb_delay_offset",
                        ],
                        lens,
                    )?;
                }
                if bp.bp_vcl_hrd_params_present_flag {
                    pt.vcl_alt_timing = read_alt_timing(
                        reader,
                        bp,
                        [
                            "pt_vcl_cpb_alt_initial_removal_delay_delta",
                            "pt_vcl_cpb_alt_initial_removal_offset_delta",
                            "pt_vcl_cpb_delay_offset",
                            "pt_vcl_dpb_delay_offset",
                        ],
                        lens,
                    )?;
                }
            }
        }

        if bp.bp_du_hrd_params_present_flag && bp.bp_du_dpb_params_in_pic_timing_sei_flag {
            let len = bp.bp_dpb_output_delay_du_length_minus1 as u32 + 1;
            pt.pt_dpb_output_du_delay = reader.read_bits("pt_dpb_output_du_delay", len)? as u32;
        }

        if bp.bp_du_hrd_params_present_flag && bp.bp_du_cpb_params_in_pic_timing_sei_flag {
            let pt_num_decoding_units_minus1 = reader.read_uev("pt_num_decoding_units_minus1")?;
            range_check!(pt_num_decoding_units_minus1, 0, u32::MAX)?;
            pt.pt_num_decoding_units_minus1 = pt_num_decoding_units_minus1 as u32;

            if pt.pt_num_decoding_units_minus1 > 0 {
                pt.pt_du_common_cpb_removal_delay_flag = reader.read_flag("pt_du_common_cpb_removal_delay_flag")?;
                if pt.pt_du_common_cpb_removal_delay_flag {
                    pt.pt_du_common_cpb_removal_delay_increment_minus1 = vec![0; max_sublayer + 1];
                    for i in first..=max_sublayer {
                        if pt.pt_sublayer_delays_present_flag[i] {
                            pt.pt_du_common_cpb_removal_delay_increment_minus1[i] =
                                reader.read_bits("pt_du_common_cpb_removal_delay_increment_minus1", du_increment_len)?
                                    as u32;
                        }
                    }
                }

                for i in 0..=pt.pt_num_decoding_units_minus1 {
                    let nalus = reader.read_uev("pt_num_nalus_in_du_minus1")?;
                    range_check!("pt_num_nalus_in_du_minus1", nalus, 0, u32::MAX)?;
                    pt.pt_num_nalus_in_du_minus1.push(nalus as u32);

                    if !pt.pt_du_common_cpb_removal_delay_flag && i < pt.pt_num_decoding_units_minus1 {
                        let mut increments = vec![0; max_sublayer + 1];
                        for j in first..=max_sublayer {
                            if pt.pt_sublayer_delays_present_flag[j] {
                                increments[j] = reader
                                    .read_bits("pt_du_cpb_removal_delay_increment_minus1", du_increment_len)?
                                    as u32;
                            }
                        }
                        pt.pt_du_cpb_removal_delay_increment_minus1.push(increments);
                    }
                }
            }
        }

        if bp.bp_additional_concatenation_info_present_flag {
            pt.pt_delay_for_concatenation_ensured_flag = reader.read_flag("pt_delay_for_concatenation_ensured_flag")?;
        }
        pt.pt_display_elemental_periods_minus1 = reader.read_bits("pt_display_elemental_periods_minus1", 8)? as u8;

        Ok(pt)
    }
}

fn read_alt_timing(
    reader: &mut RbspReader,
    bp: &BufferingPeriod,
    names: [&'static str; 4],
    [initial_removal_len, removal_len, output_len]: [u32; 3],
) -> Result<Vec<AltCpbTiming>> {
    let mut timing = vec![AltCpbTiming::default(); bp.bp_max_sublayers_minus1 as usize + 1];
    for i in bp.signalled_sublayers() {
        let sublayer = &mut timing[i];
        for _ in 0..=bp.bp_cpb_cnt_minus1 {
            sublayer
                .cpb_alt_initial_removal_delay_delta
                .push(reader.read_bits(names[0], initial_removal_len)? as u32);
            sublayer
                .cpb_alt_initial_removal_offset_delta
                .push(reader.read_bits(names[1], initial_removal_len)? as u32);
        }
        sublayer.cpb_delay_offset = reader.read_bits(names[2], removal_len)? as u32;
        sublayer.dpb_delay_offset = reader.read_bits(names[3], output_len)? as u32;
    }

    Ok(timing)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::num::NonZero;
    use std::sync::Arc;

    use super::{BufferingPeriod, PicTiming, SeiPayload, SeiRbsp};
    use crate::reader::RbspReader;
    use crate::sps::GeneralTimingHrdParameters;
    use crate::test_util::RbspBuilder;
    use crate::{NALUnitType, VvcError};

    /// NAL HRD only, one CPB, 24 bit initial delays and 16 bit removal and output delays.
    fn buffering_period(max_sublayers_minus1: u64) -> RbspBuilder {
        let mut b = RbspBuilder::new()
            .flag(true) // bp_nal_hrd_params_present_flag
            .flag(false) // bp_vcl_hrd_params_present_flag
            .bits(23, 5)
            .bits(15, 5)
            .bits(15, 5)
            .flag(false) // bp_du_hrd_params_present_flag
            .flag(true) // bp_concatenation_flag
            .flag(false) // bp_additional_concatenation_info_present_flag
            .bits(0, 16) // bp_cpb_removal_delay_delta_minus1
            .bits(max_sublayers_minus1, 3);
        if max_sublayers_minus1 > 0 {
            b = b.flag(false); // bp_cpb_removal_delay_deltas_present_flag
        }
        b = b.ue(0); // bp_cpb_cnt_minus1
        if max_sublayers_minus1 > 0 {
            b = b.flag(false); // bp_sublayer_initial_cpb_removal_delay_present_flag
        }
        b = b.bits(90000, 24).bits(0, 24);
        if max_sublayers_minus1 > 0 {
            b = b.flag(true); // bp_sublayer_dpb_output_offsets_present_flag
            for i in 0..max_sublayers_minus1 {
                b = b.ue(max_sublayers_minus1 - i);
            }
        }
        b.flag(false) // bp_alt_cpb_params_present_flag
    }

    fn hrd(cpb_cnt_minus1: u8) -> GeneralTimingHrdParameters {
        GeneralTimingHrdParameters {
            num_units_in_tick: NonZero::new(1001).unwrap(),
            time_scale: NonZero::new(60000).unwrap(),
            general_nal_hrd_params_present_flag: true,
            general_vcl_hrd_params_present_flag: false,
            general_same_pic_timing_in_all_ols_flag: true,
            general_du_hrd_params_present_flag: false,
            tick_divisor_minus2: 0,
            bit_rate_scale: 0,
            cpb_size_scale: 0,
            cpb_size_du_scale: 0,
            hrd_cpb_cnt_minus1: cpb_cnt_minus1,
        }
    }

    /// Wraps payloads into an `sei_rbsp()` with the given payload types.
    fn sei_rbsp(messages: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let mut b = RbspBuilder::new();
        for (payload_type, payload) in messages {
            b = b.bits(*payload_type as u64, 8).bits(payload.len() as u64, 8);
            for byte in payload {
                b = b.bits(*byte as u64, 8);
            }
        }
        b.trailing()
    }

    #[test]
    fn buffering_period_with_sublayers() {
        let data = buffering_period(2).zero_align().into_bytes();
        let mut reader = RbspReader::new(&data);
        let bp = BufferingPeriod::parse(&mut reader, Some(&hrd(0)), 2).unwrap();

        assert!(bp.bp_nal_hrd_params_present_flag);
        assert!(bp.bp_concatenation_flag);
        assert_eq!(bp.bp_cpb_initial_removal_delay_length_minus1, 23);
        assert_eq!(bp.bp_max_sublayers_minus1, 2);
        assert_eq!(bp.signalled_sublayers(), 2..=2);
        assert_eq!(bp.nal_initial_cpb_removal.len(), 3);
        // lower sub-layers take the values of the highest one
        for removals in &bp.nal_initial_cpb_removal {
            assert_eq!(removals.len(), 1);
            assert_eq!(removals[0].initial_cpb_removal_delay, 90000);
        }
        assert!(bp.vcl_initial_cpb_removal.is_empty());
        assert_eq!(bp.bp_dpb_output_tid_offset, [2, 1, 0]);
        assert!(reader.bits_remaining() < 8);
    }

    #[test]
    fn buffering_period_must_match_hrd() {
        let data = buffering_period(0).zero_align().into_bytes();
        assert_eq!(
            BufferingPeriod::parse(&mut RbspReader::new(&data), Some(&hrd(1)), 0)
                .unwrap_err()
                .to_string(),
            "bp_cpb_cnt_minus1 is out of range [1, 1]: 0"
        );

        let data = buffering_period(2).zero_align().into_bytes();
        assert_eq!(
            BufferingPeriod::parse(&mut RbspReader::new(&data), None, 1)
                .unwrap_err()
                .to_string(),
            "bp_max_sublayers_minus1 is out of range [0, 1]: 2"
        );
    }

    #[test]
    fn pic_timing_uses_buffering_period_lengths() {
        let bp_data = buffering_period(1).zero_align().into_bytes();
        let bp = BufferingPeriod::parse(&mut RbspReader::new(&bp_data), None, 6).unwrap();

        let data = RbspBuilder::new()
            .bits(1234, 16) // pt_cpb_removal_delay_minus1 of the highest sub-layer
            .flag(true) // pt_sublayer_delays_present_flag[0]
            .bits(617, 16) // pt_cpb_removal_delay_minus1[0]
            .bits(2, 16) // pt_dpb_output_delay
            .bits(0, 8) // pt_display_elemental_periods_minus1
            .zero_align()
            .into_bytes();
        let mut reader = RbspReader::new(&data);
        let pt = PicTiming::parse(&mut reader, &bp, 0).unwrap();
        assert_eq!(reader.bits_read(), 57);
        assert_eq!(pt.pt_cpb_removal_delay_minus1, [617, 1234]);
        assert_eq!(pt.pt_sublayer_delays_present_flag, [true, true]);
        assert_eq!(pt.pt_dpb_output_delay, 2);

        // sub-layer 0 is not signalled in a NAL unit of the highest sub-layer
        let data = RbspBuilder::new().bits(1234, 16).bits(2, 16).bits(0, 8).into_bytes();
        let pt = PicTiming::parse(&mut RbspReader::new(&data), &bp, 1).unwrap();
        assert_eq!(pt.pt_cpb_removal_delay_minus1, [0, 1234]);
        assert_eq!(pt.pt_sublayer_delays_present_flag, [false, true]);
    }

    #[test]
    fn messages_in_one_nal_unit() {
        let bp = buffering_period(0).zero_align().into_bytes();
        let pt = RbspBuilder::new().bits(7, 16).bits(3, 16).bits(1, 8).into_bytes();
        let data = sei_rbsp(&[(0, bp), (5, vec![0xAA; 17]), (1, pt)]);

        let mut reader = RbspReader::new(&data);
        let sei = SeiRbsp::parse(&mut reader, NALUnitType::PrefixSeiNut, 0, None, None).unwrap();
        assert_eq!(reader.bits_remaining(), 0);

        let types = sei.messages.iter().map(|m| (m.payload_type, m.payload_size)).collect::<Vec<_>>();
        assert_eq!(types[1..], [(5, 17), (1, 5)]);
        assert!(matches!(sei.messages[1].payload, SeiPayload::Other));
        let bp = sei.buffering_period().unwrap();
        assert_eq!(bp.nal_initial_cpb_removal[0][0].initial_cpb_removal_delay, 90000);
        let pt = sei.pic_timing().unwrap();
        assert_eq!(pt.pt_cpb_removal_delay_minus1, [7]);
        assert_eq!(pt.pt_display_elemental_periods_minus1, 1);
    }

    #[test]
    fn pic_timing_without_buffering_period() {
        let data = sei_rbsp(&[(1, vec![0, 7, 0, 3, 1])]);
        assert!(matches!(
            SeiRbsp::parse(&mut RbspReader::new(&data), NALUnitType::PrefixSeiNut, 0, None, None).unwrap_err(),
            VvcError::MissingBufferingPeriod
        ));

        // the same payload in a suffix SEI is not interpreted
        let sei = SeiRbsp::parse(&mut RbspReader::new(&data), NALUnitType::SuffixSeiNut, 0, None, None).unwrap();
        assert!(matches!(sei.messages[0].payload, SeiPayload::Other));

        let bp_data = buffering_period(0).zero_align().into_bytes();
        let bp = Arc::new(BufferingPeriod::parse(&mut RbspReader::new(&bp_data), None, 0).unwrap());
        let sei = SeiRbsp::parse(&mut RbspReader::new(&data), NALUnitType::PrefixSeiNut, 0, None, Some(&bp)).unwrap();
        assert_eq!(sei.pic_timing().unwrap().pt_dpb_output_delay, 3);
        assert!(sei.buffering_period().is_none());
    }

    #[test]
    fn payload_size_bounds() {
        // a 300 byte payload is coded as 0xFF followed by 45
        let mut data = vec![5, 0xFF, 45];
        data.extend(std::iter::repeat_n(0x11, 300));
        data.push(0x80);
        let sei = SeiRbsp::parse(&mut RbspReader::new(&data), NALUnitType::PrefixSeiNut, 0, None, None).unwrap();
        assert_eq!(sei.messages[0].payload_size, 300);

        let err = SeiRbsp::parse(&mut RbspReader::new(&[5, 4, 0, 0x80]), NALUnitType::SuffixSeiNut, 0, None, None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bitstream exhausted while reading sei_payload: requested 32 bits, 16 remaining"
        );

        // a buffering period does not fit into two bytes
        let bp = buffering_period(0).zero_align().into_bytes();
        let mut data = vec![0, 2];
        data.extend_from_slice(&bp);
        data.push(0x80);
        let err =
            SeiRbsp::parse(&mut RbspReader::new(&data), NALUnitType::PrefixSeiNut, 0, None, None).unwrap_err();
        assert!(matches!(err, VvcError::BitstreamExhausted { field: "sei_payload", remaining: 16, .. }));
    }
}
