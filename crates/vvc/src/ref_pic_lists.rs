//! Reference picture list structures.
//!
//! `ref_pic_list_struct()` templates live in the SPS, and `ref_pic_lists()` in picture and slice
//! headers either selects one of them or carries its own.

use crate::error::Result;
use crate::range_check::range_check;
use crate::reader::{RbspReader, ceil_log2};
use crate::sps::Sps;

/// One entry of a reference picture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefPicEntry {
    /// A short-term reference picture. `DeltaPocValSt[i]` is relative to the previous short-term
    /// entry of the list, or to the current picture for the first one.
    ShortTerm { delta_poc_val_st: i32 },
    /// A long-term reference picture. The LSBs are `None` when they are signalled in the picture
    /// or slice header (`ltrp_in_header_flag`).
    LongTerm { rpls_poc_lsb_lt: Option<u32> },
    /// An inter-layer reference picture.
    InterLayer { ilrp_idx: u32 },
}

/// `ref_pic_list_struct(listIdx, rplsIdx)`.
///
/// ISO/IEC 23090-3 - 7.3.10
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefPicListStruct {
    pub ltrp_in_header_flag: bool,
    pub entries: Vec<RefPicEntry>,
}

/// The SPS values `ref_pic_list_struct()` depends on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RplContext {
    pub long_term_ref_pics: bool,
    pub inter_layer_prediction: bool,
    pub weighted_pred_or_bipred: bool,
    pub log2_max_pic_order_cnt_lsb: u8,
    pub num_ref_pic_lists: [usize; 2],
}

impl RefPicListStruct {
    pub(crate) fn parse(reader: &mut RbspReader, list_idx: usize, rpls_idx: usize, ctx: &RplContext) -> Result<Self> {
        let num_ref_entries = reader.read_uev("num_ref_entries")?;
        range_check!(num_ref_entries, 0, 29)?;

        let mut ltrp_in_header_flag = true;
        if ctx.long_term_ref_pics && rpls_idx < ctx.num_ref_pic_lists[list_idx] && num_ref_entries > 0 {
            ltrp_in_header_flag = reader.read_flag("ltrp_in_header_flag")?;
        }

        let mut entries = Vec::with_capacity(num_ref_entries as usize);
        for i in 0..num_ref_entries as usize {
            let inter_layer_ref_pic_flag =
                ctx.inter_layer_prediction && reader.read_flag("inter_layer_ref_pic_flag")?;
            if inter_layer_ref_pic_flag {
                let ilrp_idx = reader.read_uev("ilrp_idx")?;
                range_check!(ilrp_idx, 0, 55)?;
                entries.push(RefPicEntry::InterLayer {
                    ilrp_idx: ilrp_idx as u32,
                });
                continue;
            }

            let st_ref_pic_flag = !ctx.long_term_ref_pics || reader.read_flag("st_ref_pic_flag")?;
            if st_ref_pic_flag {
                let abs_delta_poc_st = reader.read_uev("abs_delta_poc_st")?;
                range_check!(abs_delta_poc_st, 0, (1 << 15) - 1)?;

                // (149)
                let abs_delta_poc = if ctx.weighted_pred_or_bipred && i != 0 {
                    abs_delta_poc_st as i32
                } else {
                    abs_delta_poc_st as i32 + 1
                };

                let strp_entry_sign_flag = abs_delta_poc > 0 && reader.read_flag("strp_entry_sign_flag")?;
                entries.push(RefPicEntry::ShortTerm {
                    delta_poc_val_st: if strp_entry_sign_flag { -abs_delta_poc } else { abs_delta_poc },
                });
            } else {
                let mut rpls_poc_lsb_lt = None;
                if !ltrp_in_header_flag {
                    rpls_poc_lsb_lt =
                        Some(reader.read_bits("rpls_poc_lsb_lt", ctx.log2_max_pic_order_cnt_lsb as u32)? as u32);
                }
                entries.push(RefPicEntry::LongTerm { rpls_poc_lsb_lt });
            }
        }

        Ok(Self {
            ltrp_in_header_flag,
            entries,
        })
    }

    pub fn num_ref_entries(&self) -> usize {
        self.entries.len()
    }

    /// `NumLtrpEntries`.
    pub fn num_ltrp_entries(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RefPicEntry::LongTerm { .. }))
            .count()
    }

    /// POC deltas of the short-term entries relative to the current picture.
    pub fn short_term_poc_offsets(&self) -> Vec<i32> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                RefPicEntry::ShortTerm { delta_poc_val_st } => Some(*delta_poc_val_st),
                _ => None,
            })
            .scan(0, |acc, delta| {
                *acc += delta;
                Some(*acc)
            })
            .collect()
    }
}

/// Long-term picture info signalled in `ref_pic_lists()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LongTermRefPic {
    /// `poc_lsb_lt[i][j]` when signalled in the header, otherwise the value from the structure.
    pub poc_lsb_lt: u32,
    pub delta_poc_msb_cycle_present_flag: bool,
    pub delta_poc_msb_cycle_lt: u32,
    /// `DeltaPocMsbCycleLt[i][j]` (147).
    pub delta_poc_msb_cycle: u32,
}

/// One of the two lists of `ref_pic_lists()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefPicList {
    pub rpl_sps_flag: bool,
    pub rpl_idx: usize,
    /// The selected SPS structure, or the one signalled in the header.
    pub ref_pic_list_struct: RefPicListStruct,
    pub long_term: Vec<LongTermRefPic>,
    rpls_idx: usize,
}

impl RefPicList {
    /// `RplsIdx[i]`.
    pub const fn rpls_idx(&self) -> usize {
        self.rpls_idx
    }

    pub fn num_ref_entries(&self) -> usize {
        self.ref_pic_list_struct.num_ref_entries()
    }
}

/// `ref_pic_lists()`.
///
/// ISO/IEC 23090-3 - 7.3.9
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefPicLists {
    pub lists: [RefPicList; 2],
}

impl RefPicLists {
    pub fn parse(reader: &mut RbspReader, sps: &Sps, pps_rpl1_idx_present_flag: bool) -> Result<Self> {
        let ctx = sps.rpl_context();
        let mut lists: [RefPicList; 2] = Default::default();

        for i in 0..2 {
            let num_lists = ctx.num_ref_pic_lists[i];
            let signalled = i == 0 || pps_rpl1_idx_present_flag;

            let rpl_sps_flag = if num_lists > 0 && signalled {
                reader.read_flag("rpl_sps_flag")?
            } else if num_lists == 0 {
                false
            } else {
                lists[0].rpl_sps_flag
            };

            let mut list = RefPicList {
                rpl_sps_flag,
                ..Default::default()
            };

            if rpl_sps_flag {
                if num_lists > 1 && signalled {
                    let rpl_idx = reader.read_bits("rpl_idx", ceil_log2(num_lists as u64))? as usize;
                    range_check!(rpl_idx, 0, num_lists - 1)?;
                    list.rpl_idx = rpl_idx;
                } else if i == 1 && !pps_rpl1_idx_present_flag {
                    list.rpl_idx = lists[0].rpl_idx;
                }
                list.rpls_idx = list.rpl_idx;
                list.ref_pic_list_struct = sps.ref_pic_list_structs[i]
                    .get(list.rpl_idx)
                    .cloned()
                    .ok_or(crate::VvcError::RangeViolation {
                        field: "rpl_idx",
                        value: list.rpl_idx as i64,
                        min: 0,
                        max: num_lists as i64 - 1,
                    })?;
            } else {
                list.rpls_idx = num_lists;
                list.ref_pic_list_struct = RefPicListStruct::parse(reader, i, num_lists, &ctx)?;
            }

            let lt_lsbs = list
                .ref_pic_list_struct
                .entries
                .iter()
                .filter_map(|e| match e {
                    RefPicEntry::LongTerm { rpls_poc_lsb_lt } => Some(rpls_poc_lsb_lt.unwrap_or_default()),
                    _ => None,
                })
                .collect::<Vec<_>>();

            let max_msb_cycle = 1i64 << (32 - ctx.log2_max_pic_order_cnt_lsb as u32);
            for (j, struct_lsb) in lt_lsbs.into_iter().enumerate() {
                let mut lt = LongTermRefPic {
                    poc_lsb_lt: struct_lsb,
                    ..Default::default()
                };
                if list.ref_pic_list_struct.ltrp_in_header_flag {
                    lt.poc_lsb_lt = reader.read_bits("poc_lsb_lt", ctx.log2_max_pic_order_cnt_lsb as u32)? as u32;
                }
                lt.delta_poc_msb_cycle_present_flag = reader.read_flag("delta_poc_msb_cycle_present_flag")?;
                if lt.delta_poc_msb_cycle_present_flag {
                    let delta_poc_msb_cycle_lt = reader.read_uev("delta_poc_msb_cycle_lt")?;
                    range_check!(delta_poc_msb_cycle_lt, 0, max_msb_cycle)?;
                    lt.delta_poc_msb_cycle_lt = delta_poc_msb_cycle_lt as u32;
                }

                // (147)
                lt.delta_poc_msb_cycle = match list.long_term.last() {
                    Some(previous) if j != 0 => lt.delta_poc_msb_cycle_lt + previous.delta_poc_msb_cycle,
                    _ => lt.delta_poc_msb_cycle_lt,
                };
                list.long_term.push(lt);
            }

            lists[i] = list;
        }

        Ok(Self { lists })
    }
}
