//! Video parameter set.

use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::sps::{DpbParameters, GeneralTimingHrdParameters, OlsTimingHrdParameters, ProfileTierLevel};

/// Per layer dependency info of the VPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpsLayer {
    /// `vps_layer_id[i]`, strictly increasing over the layers.
    pub vps_layer_id: u8,
    pub vps_independent_layer_flag: bool,
    pub vps_max_tid_ref_present_flag: bool,
    /// `vps_direct_ref_layer_flag[i][j]` for every lower layer `j`.
    pub vps_direct_ref_layer_flag: Vec<bool>,
    /// `vps_max_tid_il_ref_pics_plus1[i][j]`, inferred to `vps_max_sublayers_minus1 + 1`.
    pub vps_max_tid_il_ref_pics_plus1: Vec<u8>,
}

/// The picture format of a multi-layer OLS's DPB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OlsDpbFormat {
    pub vps_ols_dpb_pic_width: u32,
    pub vps_ols_dpb_pic_height: u32,
    pub vps_ols_dpb_chroma_format: u8,
    pub vps_ols_dpb_bitdepth_minus8: u8,
    pub vps_ols_dpb_params_idx: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpsTimingHrd {
    pub general: GeneralTimingHrdParameters,
    pub vps_sublayer_cpb_params_present_flag: bool,
    pub vps_hrd_max_tid: Vec<u8>,
    pub ols: Vec<OlsTimingHrdParameters>,
    /// One entry per multi-layer OLS.
    pub vps_ols_timing_hrd_idx: Vec<u32>,
}

/// The Video Parameter Set.
///
/// ISO/IEC 23090-3 - 7.3.2.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vps {
    /// The value ranges from \[1, 15\]. An SPS that does not refer to a VPS uses `0`.
    pub vps_video_parameter_set_id: u8,
    pub vps_max_layers_minus1: u8,
    pub vps_max_sublayers_minus1: u8,
    pub vps_default_ptl_dpb_hrd_max_tid_flag: bool,
    pub vps_all_independent_layers_flag: bool,
    pub layers: Vec<VpsLayer>,
    pub vps_each_layer_is_an_ols_flag: bool,
    pub vps_ols_mode_idc: u8,
    pub vps_num_output_layer_sets_minus2: u8,
    /// `vps_ols_output_layer_flag[i][j]`. Index 0 is the implicit base layer OLS and is empty.
    pub vps_ols_output_layer_flag: Vec<Vec<bool>>,
    pub vps_num_ptls_minus1: u8,
    pub vps_pt_present_flag: Vec<bool>,
    pub vps_ptl_max_tid: Vec<u8>,
    pub profile_tier_levels: Vec<ProfileTierLevel>,
    pub vps_ols_ptl_idx: Vec<u8>,
    pub vps_num_dpb_params_minus1: u32,
    pub vps_sublayer_dpb_params_present_flag: bool,
    pub vps_dpb_max_tid: Vec<u8>,
    pub dpb_parameters: Vec<DpbParameters>,
    pub ols_dpb_formats: Vec<OlsDpbFormat>,
    pub timing_hrd: Option<VpsTimingHrd>,

    // Calculated values
    num_direct_ref_layers: Vec<usize>,
    reference_layer_idx: Vec<Vec<usize>>,
    total_num_olss: usize,
    num_output_layers_in_ols: Vec<usize>,
    layer_id_in_ols: Vec<Vec<u8>>,
    multi_layer_ols_idx: Vec<Option<usize>>,
}

impl Vps {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        let vps_video_parameter_set_id = reader.read_bits("vps_video_parameter_set_id", 4)? as u8;
        range_check!(vps_video_parameter_set_id, 1, 15)?;

        let vps_max_layers_minus1 = reader.read_bits("vps_max_layers_minus1", 6)? as u8;
        let vps_max_sublayers_minus1 = reader.read_bits("vps_max_sublayers_minus1", 3)? as u8;
        range_check!(vps_max_sublayers_minus1, 0, 6)?;

        let vps_default_ptl_dpb_hrd_max_tid_flag = if vps_max_layers_minus1 > 0 && vps_max_sublayers_minus1 > 0 {
            reader.read_flag("vps_default_ptl_dpb_hrd_max_tid_flag")?
        } else {
            true
        };
        let vps_all_independent_layers_flag =
            vps_max_layers_minus1 == 0 || reader.read_flag("vps_all_independent_layers_flag")?;

        let num_layers = vps_max_layers_minus1 as usize + 1;
        let mut layers: Vec<VpsLayer> = Vec::with_capacity(num_layers);
        for i in 0..num_layers {
            let vps_layer_id = reader.read_bits("vps_layer_id", 6)?;
            let min_id = layers.last().map_or(0, |l| l.vps_layer_id as u64 + 1);
            range_check!(vps_layer_id, min_id, 55)?;

            let mut layer = VpsLayer {
                vps_layer_id: vps_layer_id as u8,
                vps_independent_layer_flag: true,
                vps_max_tid_ref_present_flag: false,
                vps_direct_ref_layer_flag: vec![false; i],
                vps_max_tid_il_ref_pics_plus1: vec![vps_max_sublayers_minus1 + 1; i],
            };

            if i > 0 && !vps_all_independent_layers_flag {
                layer.vps_independent_layer_flag = reader.read_flag("vps_independent_layer_flag")?;
                if !layer.vps_independent_layer_flag {
                    layer.vps_max_tid_ref_present_flag = reader.read_flag("vps_max_tid_ref_present_flag")?;
                    for j in 0..i {
                        layer.vps_direct_ref_layer_flag[j] = reader.read_flag("vps_direct_ref_layer_flag")?;
                        if layer.vps_max_tid_ref_present_flag && layer.vps_direct_ref_layer_flag[j] {
                            layer.vps_max_tid_il_ref_pics_plus1[j] =
                                reader.read_bits("vps_max_tid_il_ref_pics_plus1", 3)? as u8;
                        }
                    }
                }
            }

            layers.push(layer);
        }

        let mut vps_each_layer_is_an_ols_flag = vps_max_layers_minus1 == 0;
        let mut vps_ols_mode_idc = 2;
        let mut vps_num_output_layer_sets_minus2 = 0;
        let mut vps_ols_output_layer_flag = Vec::new();
        let mut vps_num_ptls_minus1 = 0;
        if vps_max_layers_minus1 > 0 {
            if vps_all_independent_layers_flag {
                vps_each_layer_is_an_ols_flag = reader.read_flag("vps_each_layer_is_an_ols_flag")?;
            }
            if !vps_each_layer_is_an_ols_flag {
                if !vps_all_independent_layers_flag {
                    vps_ols_mode_idc = reader.read_bits("vps_ols_mode_idc", 2)? as u8;
                    range_check!(vps_ols_mode_idc, 0, 2)?;
                }
                if vps_ols_mode_idc == 2 {
                    vps_num_output_layer_sets_minus2 = reader.read_bits("vps_num_output_layer_sets_minus2", 8)? as u8;
                    vps_ols_output_layer_flag.push(Vec::new());
                    for _ in 1..=vps_num_output_layer_sets_minus2 as usize + 1 {
                        vps_ols_output_layer_flag.push(
                            (0..num_layers)
                                .map(|_| reader.read_flag("vps_ols_output_layer_flag"))
                                .collect::<Result<Vec<_>>>()?,
                        );
                    }
                }
            }
            vps_num_ptls_minus1 = reader.read_bits("vps_num_ptls_minus1", 8)? as u8;
        }

        // (7-28)
        let mut dependency_flag = vec![vec![false; num_layers]; num_layers];
        for i in 0..num_layers {
            for j in 0..i {
                dependency_flag[i][j] = layers[i].vps_direct_ref_layer_flag[j]
                    || (0..i).any(|k| layers[i].vps_direct_ref_layer_flag[k] && dependency_flag[k][j]);
            }
        }
        let num_direct_ref_layers = layers
            .iter()
            .map(|l| l.vps_direct_ref_layer_flag.iter().filter(|f| **f).count())
            .collect::<Vec<_>>();
        let reference_layer_idx = dependency_flag
            .iter()
            .map(|row| (0..num_layers).filter(|j| row[*j]).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        // (7-30) olsModeIdc, 4 meaning each layer is an OLS
        let ols_mode_idc = if vps_each_layer_is_an_ols_flag { 4 } else { vps_ols_mode_idc };

        // (7-31)
        let total_num_olss = match ols_mode_idc {
            2 => vps_num_output_layer_sets_minus2 as usize + 2,
            _ => num_layers,
        };
        range_check!(vps_num_ptls_minus1, 0, total_num_olss - 1)?;

        // (7-32) and (7-33)
        let mut num_output_layers_in_ols = vec![1; total_num_olss];
        let mut layer_id_in_ols = vec![vec![layers[0].vps_layer_id]; total_num_olss];
        for i in 1..total_num_olss {
            match ols_mode_idc {
                4 => layer_id_in_ols[i] = vec![layers[i].vps_layer_id],
                0 | 1 => {
                    layer_id_in_ols[i] = layers[..=i].iter().map(|l| l.vps_layer_id).collect();
                    if ols_mode_idc == 1 {
                        num_output_layers_in_ols[i] = i + 1;
                    }
                }
                _ => {
                    let mut included = vps_ols_output_layer_flag[i].clone();
                    num_output_layers_in_ols[i] = included.iter().filter(|f| **f).count();
                    for k in 0..num_layers {
                        if vps_ols_output_layer_flag[i][k] {
                            for &r in &reference_layer_idx[k] {
                                included[r] = true;
                            }
                        }
                    }
                    layer_id_in_ols[i] = (0..num_layers)
                        .filter(|k| included[*k])
                        .map(|k| layers[k].vps_layer_id)
                        .collect();
                }
            }
        }

        let mut num_multi_layer_olss = 0usize;
        let multi_layer_ols_idx = layer_id_in_ols
            .iter()
            .map(|ids| {
                (ids.len() > 1).then(|| {
                    num_multi_layer_olss += 1;
                    num_multi_layer_olss - 1
                })
            })
            .collect::<Vec<_>>();

        let num_ptls = vps_num_ptls_minus1 as usize + 1;
        let mut vps_pt_present_flag = Vec::with_capacity(num_ptls);
        let mut vps_ptl_max_tid = Vec::with_capacity(num_ptls);
        for i in 0..num_ptls {
            vps_pt_present_flag.push(i == 0 || reader.read_flag("vps_pt_present_flag")?);
            vps_ptl_max_tid.push(if vps_default_ptl_dpb_hrd_max_tid_flag {
                vps_max_sublayers_minus1
            } else {
                let max_tid = reader.read_bits("vps_ptl_max_tid", 3)?;
                range_check!(max_tid, 0, vps_max_sublayers_minus1)?;
                max_tid as u8
            });
        }
        reader.read_zero_bits_until_aligned("vps_ptl_alignment_zero_bit")?;

        let profile_tier_levels = (0..num_ptls)
            .map(|i| ProfileTierLevel::parse(reader, vps_pt_present_flag[i], vps_ptl_max_tid[i]))
            .collect::<Result<Vec<_>>>()?;

        let mut vps_ols_ptl_idx = Vec::with_capacity(total_num_olss);
        for i in 0..total_num_olss {
            if vps_num_ptls_minus1 > 0 && num_ptls != total_num_olss {
                let idx = reader.read_bits("vps_ols_ptl_idx", 8)?;
                range_check!(idx, 0, vps_num_ptls_minus1)?;
                vps_ols_ptl_idx.push(idx as u8);
            } else if vps_num_ptls_minus1 == 0 {
                vps_ols_ptl_idx.push(0);
            } else {
                vps_ols_ptl_idx.push(i as u8);
            }
        }

        let mut vps_num_dpb_params_minus1 = 0;
        let mut vps_sublayer_dpb_params_present_flag = false;
        let mut vps_dpb_max_tid = Vec::new();
        let mut dpb_parameters = Vec::new();
        let mut ols_dpb_formats = Vec::new();
        let mut timing_hrd = None;
        if !vps_each_layer_is_an_ols_flag {
            let num_dpb_params_minus1 = reader.read_uev("vps_num_dpb_params_minus1")?;
            range_check!(num_dpb_params_minus1, 0, num_multi_layer_olss.saturating_sub(1))?;
            vps_num_dpb_params_minus1 = num_dpb_params_minus1 as u32;
            let vps_num_dpb_params = num_dpb_params_minus1 as usize + 1;

            if vps_max_sublayers_minus1 > 0 {
                vps_sublayer_dpb_params_present_flag = reader.read_flag("vps_sublayer_dpb_params_present_flag")?;
            }

            for _ in 0..vps_num_dpb_params {
                let max_tid = read_max_tid(
                    reader,
                    "vps_dpb_max_tid",
                    vps_default_ptl_dpb_hrd_max_tid_flag,
                    vps_max_sublayers_minus1,
                )?;
                vps_dpb_max_tid.push(max_tid);
                dpb_parameters.push(DpbParameters::parse(
                    reader,
                    max_tid,
                    vps_sublayer_dpb_params_present_flag,
                )?);
            }

            for i in 0..num_multi_layer_olss {
                let vps_ols_dpb_pic_width = reader.read_uev("vps_ols_dpb_pic_width")?;
                range_check!(vps_ols_dpb_pic_width, 0, u32::MAX)?;
                let vps_ols_dpb_pic_height = reader.read_uev("vps_ols_dpb_pic_height")?;
                range_check!(vps_ols_dpb_pic_height, 0, u32::MAX)?;
                let vps_ols_dpb_chroma_format = reader.read_bits("vps_ols_dpb_chroma_format", 2)? as u8;
                let vps_ols_dpb_bitdepth_minus8 = reader.read_uev("vps_ols_dpb_bitdepth_minus8")?;
                range_check!(vps_ols_dpb_bitdepth_minus8, 0, 8)?;

                let vps_ols_dpb_params_idx = if vps_num_dpb_params > 1 && vps_num_dpb_params != num_multi_layer_olss {
                    let idx = reader.read_uev("vps_ols_dpb_params_idx")?;
                    range_check!(idx, 0, vps_num_dpb_params - 1)?;
                    idx as u32
                } else if vps_num_dpb_params == 1 {
                    0
                } else {
                    i as u32
                };

                ols_dpb_formats.push(OlsDpbFormat {
                    vps_ols_dpb_pic_width: vps_ols_dpb_pic_width as u32,
                    vps_ols_dpb_pic_height: vps_ols_dpb_pic_height as u32,
                    vps_ols_dpb_chroma_format,
                    vps_ols_dpb_bitdepth_minus8: vps_ols_dpb_bitdepth_minus8 as u8,
                    vps_ols_dpb_params_idx,
                });
            }

            if reader.read_flag("vps_timing_hrd_params_present_flag")? {
                let general = GeneralTimingHrdParameters::parse(reader)?;
                let vps_sublayer_cpb_params_present_flag =
                    vps_max_sublayers_minus1 > 0 && reader.read_flag("vps_sublayer_cpb_params_present_flag")?;

                let num_ols_timing_hrd_params_minus1 = reader.read_uev("vps_num_ols_timing_hrd_params_minus1")?;
                range_check!(
                    num_ols_timing_hrd_params_minus1,
                    0,
                    num_multi_layer_olss.saturating_sub(1)
                )?;
                let num_ols_timing_hrd_params = num_ols_timing_hrd_params_minus1 as usize + 1;

                let mut vps_hrd_max_tid = Vec::with_capacity(num_ols_timing_hrd_params);
                let mut ols = Vec::with_capacity(num_ols_timing_hrd_params);
                for _ in 0..num_ols_timing_hrd_params {
                    let max_tid = read_max_tid(
                        reader,
                        "vps_hrd_max_tid",
                        vps_default_ptl_dpb_hrd_max_tid_flag,
                        vps_max_sublayers_minus1,
                    )?;
                    let first_sub_layer = if vps_sublayer_cpb_params_present_flag { 0 } else { max_tid };
                    vps_hrd_max_tid.push(max_tid);
                    ols.push(OlsTimingHrdParameters::parse(reader, first_sub_layer, max_tid, &general)?);
                }

                let vps_ols_timing_hrd_idx =
                    if num_ols_timing_hrd_params > 1 && num_ols_timing_hrd_params != num_multi_layer_olss {
                        (0..num_multi_layer_olss)
                            .map(|_| {
                                let idx = reader.read_uev("vps_ols_timing_hrd_idx")?;
                                range_check!(idx, 0, num_ols_timing_hrd_params - 1)?;
                                Ok(idx as u32)
                            })
                            .collect::<Result<Vec<_>>>()?
                    } else if num_ols_timing_hrd_params == 1 {
                        vec![0; num_multi_layer_olss]
                    } else {
                        (0..num_multi_layer_olss as u32).collect()
                    };

                timing_hrd = Some(VpsTimingHrd {
                    general,
                    vps_sublayer_cpb_params_present_flag,
                    vps_hrd_max_tid,
                    ols,
                    vps_ols_timing_hrd_idx,
                });
            }
        }

        if reader.read_flag("vps_extension_flag")? {
            reader.skip_extension_data("vps_extension_data_flag")?;
        }
        reader.read_rbsp_trailing_bits()?;

        Ok(Self {
            vps_video_parameter_set_id,
            vps_max_layers_minus1,
            vps_max_sublayers_minus1,
            vps_default_ptl_dpb_hrd_max_tid_flag,
            vps_all_independent_layers_flag,
            layers,
            vps_each_layer_is_an_ols_flag,
            vps_ols_mode_idc,
            vps_num_output_layer_sets_minus2,
            vps_ols_output_layer_flag,
            vps_num_ptls_minus1,
            vps_pt_present_flag,
            vps_ptl_max_tid,
            profile_tier_levels,
            vps_ols_ptl_idx,
            vps_num_dpb_params_minus1,
            vps_sublayer_dpb_params_present_flag,
            vps_dpb_max_tid,
            dpb_parameters,
            ols_dpb_formats,
            timing_hrd,
            num_direct_ref_layers,
            reference_layer_idx,
            total_num_olss,
            num_output_layers_in_ols,
            layer_id_in_ols,
            multi_layer_ols_idx,
        })
    }

    /// `NumDirectRefLayers[i]`.
    pub fn num_direct_ref_layers(&self, i: usize) -> usize {
        self.num_direct_ref_layers[i]
    }

    /// `ReferenceLayerIdx[i]`, every layer that layer `i` depends on directly or indirectly.
    pub fn reference_layer_idx(&self, i: usize) -> &[usize] {
        &self.reference_layer_idx[i]
    }

    /// `TotalNumOlss`.
    #[inline]
    pub const fn total_num_olss(&self) -> usize {
        self.total_num_olss
    }

    /// `NumOutputLayersInOls[i]`.
    pub fn num_output_layers_in_ols(&self, i: usize) -> usize {
        self.num_output_layers_in_ols[i]
    }

    /// `NumLayersInOls[i]`.
    pub fn num_layers_in_ols(&self, i: usize) -> usize {
        self.layer_id_in_ols[i].len()
    }

    /// `LayerIdInOls[i]`.
    pub fn layer_id_in_ols(&self, i: usize) -> &[u8] {
        &self.layer_id_in_ols[i]
    }

    /// `NumMultiLayerOlss`.
    pub fn num_multi_layer_olss(&self) -> usize {
        self.multi_layer_ols_idx.iter().flatten().count()
    }

    /// `MultiLayerOlsIdx[i]`, `None` for single layer OLSs.
    pub fn multi_layer_ols_idx(&self, i: usize) -> Option<usize> {
        self.multi_layer_ols_idx.get(i).copied().flatten()
    }

    /// `GeneralLayerIdx[nuh_layer_id]`.
    pub fn general_layer_idx(&self, nuh_layer_id: u8) -> Option<usize> {
        self.layers.iter().position(|l| l.vps_layer_id == nuh_layer_id)
    }
}

fn read_max_tid(reader: &mut RbspReader, name: &'static str, inferred: bool, max_sublayers_minus1: u8) -> Result<u8> {
    if inferred {
        return Ok(max_sublayers_minus1);
    }

    let max_tid = reader.read_bits(name, 3)?;
    crate::range_check::check(name, max_tid as i64, 0, max_sublayers_minus1 as i64)?;
    Ok(max_tid as u8)
}
