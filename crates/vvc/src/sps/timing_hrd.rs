use std::num::NonZero;

use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::RbspReader;

/// `general_timing_hrd_parameters()`.
///
/// ISO/IEC 23090-3 - 7.3.5.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralTimingHrdParameters {
    pub num_units_in_tick: NonZero<u32>,
    pub time_scale: NonZero<u32>,
    pub general_nal_hrd_params_present_flag: bool,
    pub general_vcl_hrd_params_present_flag: bool,
    pub general_same_pic_timing_in_all_ols_flag: bool,
    pub general_du_hrd_params_present_flag: bool,
    pub tick_divisor_minus2: u8,
    pub bit_rate_scale: u8,
    pub cpb_size_scale: u8,
    pub cpb_size_du_scale: u8,
    pub hrd_cpb_cnt_minus1: u8,
}

impl GeneralTimingHrdParameters {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        let num_units_in_tick = NonZero::new(reader.read_bits("num_units_in_tick", 32)? as u32).ok_or(
            VvcError::RangeViolation {
                field: "num_units_in_tick",
                value: 0,
                min: 1,
                max: u32::MAX as i64,
            },
        )?;
        let time_scale = NonZero::new(reader.read_bits("time_scale", 32)? as u32).ok_or(VvcError::RangeViolation {
            field: "time_scale",
            value: 0,
            min: 1,
            max: u32::MAX as i64,
        })?;

        let general_nal_hrd_params_present_flag = reader.read_flag("general_nal_hrd_params_present_flag")?;
        let general_vcl_hrd_params_present_flag = reader.read_flag("general_vcl_hrd_params_present_flag")?;

        let mut general_same_pic_timing_in_all_ols_flag = false;
        let mut general_du_hrd_params_present_flag = false;
        let mut tick_divisor_minus2 = 0;
        let mut bit_rate_scale = 0;
        let mut cpb_size_scale = 0;
        let mut cpb_size_du_scale = 0;
        let mut hrd_cpb_cnt_minus1 = 0;

        if general_nal_hrd_params_present_flag || general_vcl_hrd_params_present_flag {
            general_same_pic_timing_in_all_ols_flag = reader.read_flag("general_same_pic_timing_in_all_ols_flag")?;
            general_du_hrd_params_present_flag = reader.read_flag("general_du_hrd_params_present_flag")?;
            if general_du_hrd_params_present_flag {
                tick_divisor_minus2 = reader.read_bits("tick_divisor_minus2", 8)? as u8;
            }
            bit_rate_scale = reader.read_bits("bit_rate_scale", 4)? as u8;
            cpb_size_scale = reader.read_bits("cpb_size_scale", 4)? as u8;
            if general_du_hrd_params_present_flag {
                cpb_size_du_scale = reader.read_bits("cpb_size_du_scale", 4)? as u8;
            }
            let cpb_cnt_minus1 = reader.read_uev("hrd_cpb_cnt_minus1")?;
            range_check!(cpb_cnt_minus1, 0, 31)?;
            hrd_cpb_cnt_minus1 = cpb_cnt_minus1 as u8;
        }

        Ok(Self {
            num_units_in_tick,
            time_scale,
            general_nal_hrd_params_present_flag,
            general_vcl_hrd_params_present_flag,
            general_same_pic_timing_in_all_ols_flag,
            general_du_hrd_params_present_flag,
            tick_divisor_minus2,
            bit_rate_scale,
            cpb_size_scale,
            cpb_size_du_scale,
            hrd_cpb_cnt_minus1,
        })
    }

    /// The clock tick in seconds.
    pub fn clock_tick(&self) -> f64 {
        self.num_units_in_tick.get() as f64 / self.time_scale.get() as f64
    }
}

/// One CPB specification of `sublayer_hrd_parameters()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpbSpec {
    pub bit_rate_value_minus1: u32,
    pub cpb_size_value_minus1: u32,
    pub cpb_size_du_value_minus1: u32,
    pub bit_rate_du_value_minus1: u32,
    pub cbr_flag: bool,
}

/// `sublayer_hrd_parameters()`.
///
/// ISO/IEC 23090-3 - 7.3.5.3
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SublayerHrdParameters {
    pub cpb_specs: Vec<CpbSpec>,
}

impl SublayerHrdParameters {
    fn parse(reader: &mut RbspReader, general: &GeneralTimingHrdParameters) -> Result<Self> {
        let mut cpb_specs = Vec::with_capacity(general.hrd_cpb_cnt_minus1 as usize + 1);
        for _ in 0..=general.hrd_cpb_cnt_minus1 {
            let mut spec = CpbSpec {
                bit_rate_value_minus1: read_u32_uev(reader, "bit_rate_value_minus1")?,
                cpb_size_value_minus1: read_u32_uev(reader, "cpb_size_value_minus1")?,
                ..Default::default()
            };
            if general.general_du_hrd_params_present_flag {
                spec.cpb_size_du_value_minus1 = read_u32_uev(reader, "cpb_size_du_value_minus1")?;
                spec.bit_rate_du_value_minus1 = read_u32_uev(reader, "bit_rate_du_value_minus1")?;
            }
            spec.cbr_flag = reader.read_flag("cbr_flag")?;
            cpb_specs.push(spec);
        }

        Ok(Self { cpb_specs })
    }

    /// `BitRate[j]` in bits per second.
    pub fn bit_rate(&self, j: usize, general: &GeneralTimingHrdParameters) -> Option<u64> {
        let spec = self.cpb_specs.get(j)?;
        Some((spec.bit_rate_value_minus1 as u64 + 1) << (6 + general.bit_rate_scale))
    }

    /// `CpbSize[j]` in bits.
    pub fn cpb_size(&self, j: usize, general: &GeneralTimingHrdParameters) -> Option<u64> {
        let spec = self.cpb_specs.get(j)?;
        Some((spec.cpb_size_value_minus1 as u64 + 1) << (4 + general.cpb_size_scale))
    }
}

fn read_u32_uev(reader: &mut RbspReader, name: &'static str) -> Result<u32> {
    let value = reader.read_uev(name)?;
    crate::range_check::check(name, value as i64, 0, u32::MAX as i64 - 1)?;
    Ok(value as u32)
}

/// Per sub-layer timing of `ols_timing_hrd_parameters()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SublayerTiming {
    pub fixed_pic_rate_general_flag: bool,
    pub fixed_pic_rate_within_cvs_flag: bool,
    pub elemental_duration_in_tc_minus1: u32,
    pub low_delay_hrd_flag: bool,
    pub nal_hrd: Option<SublayerHrdParameters>,
    pub vcl_hrd: Option<SublayerHrdParameters>,
}

/// `ols_timing_hrd_parameters()`.
///
/// ISO/IEC 23090-3 - 7.3.5.2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OlsTimingHrdParameters {
    /// Indexed by sub-layer, `0..=max_sub_layers`. Sub-layers below the first signalled one copy
    /// the values of the highest sub-layer.
    pub sublayers: Vec<SublayerTiming>,
}

impl OlsTimingHrdParameters {
    pub fn parse(
        reader: &mut RbspReader,
        first_sub_layer: u8,
        max_sub_layers: u8,
        general: &GeneralTimingHrdParameters,
    ) -> Result<Self> {
        let mut sublayers = vec![SublayerTiming::default(); max_sub_layers as usize + 1];
        let hrd_present = general.general_nal_hrd_params_present_flag || general.general_vcl_hrd_params_present_flag;

        for i in first_sub_layer as usize..=max_sub_layers as usize {
            let timing = &mut sublayers[i];
            timing.fixed_pic_rate_general_flag = reader.read_flag("fixed_pic_rate_general_flag")?;
            timing.fixed_pic_rate_within_cvs_flag = timing.fixed_pic_rate_general_flag
                || reader.read_flag("fixed_pic_rate_within_cvs_flag")?;

            if timing.fixed_pic_rate_within_cvs_flag {
                let elemental_duration_in_tc_minus1 = reader.read_uev("elemental_duration_in_tc_minus1")?;
                range_check!(elemental_duration_in_tc_minus1, 0, 2047)?;
                timing.elemental_duration_in_tc_minus1 = elemental_duration_in_tc_minus1 as u32;
            } else if hrd_present && general.hrd_cpb_cnt_minus1 == 0 {
                timing.low_delay_hrd_flag = reader.read_flag("low_delay_hrd_flag")?;
            }

            if general.general_nal_hrd_params_present_flag {
                timing.nal_hrd = Some(SublayerHrdParameters::parse(reader, general)?);
            }
            if general.general_vcl_hrd_params_present_flag {
                timing.vcl_hrd = Some(SublayerHrdParameters::parse(reader, general)?);
            }
        }

        let highest = sublayers[max_sub_layers as usize].clone();
        sublayers[..first_sub_layer as usize].fill(highest);

        Ok(Self { sublayers })
    }
}
