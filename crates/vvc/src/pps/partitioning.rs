//! CTB raster and tile scanning, ISO/IEC 23090-3 - 6.5.1.

use crate::error::{Result, VvcError};
use crate::range_check::range_check;
use crate::reader::RbspReader;
use crate::sps::{SubpicInfo, SubpicLayout};

/// The tile grid of a picture, in CTBs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    col_width_val: Vec<u32>,
    row_height_val: Vec<u32>,
    tile_col_bd_val: Vec<u32>,
    tile_row_bd_val: Vec<u32>,
    ctb_to_tile_col_bd: Vec<u32>,
    ctb_to_tile_col_idx: Vec<u32>,
    ctb_to_tile_row_bd: Vec<u32>,
    ctb_to_tile_row_idx: Vec<u32>,
    pic_width_in_ctbs_y: u32,
}

/// Explicit tile sizes followed by a uniform fill with the last explicit size. (6-14, 6-15)
fn tile_sizes(name: &'static str, extent: u32, explicit_minus1: &[u32]) -> Result<Vec<u32>> {
    let mut sizes = Vec::with_capacity(explicit_minus1.len());
    let mut remaining = extent as i64;
    for &size_minus1 in explicit_minus1 {
        let size = size_minus1 + 1;
        remaining -= size as i64;
        if remaining < 0 {
            return Err(VvcError::RangeViolation {
                field: name,
                value: size_minus1 as i64,
                min: 0,
                max: remaining + size as i64 - 1,
            });
        }
        sizes.push(size);
    }

    let uniform = explicit_minus1.last().map_or(extent, |s| s + 1) as i64;
    while remaining >= uniform {
        sizes.push(uniform as u32);
        remaining -= uniform;
    }
    if remaining > 0 {
        sizes.push(remaining as u32);
    }

    Ok(sizes)
}

/// Cumulative boundaries and the CTB to tile maps. (6-16 to 6-19)
fn boundaries(sizes: &[u32]) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
    let mut bd = Vec::with_capacity(sizes.len() + 1);
    bd.push(0);
    for size in sizes {
        bd.push(bd[bd.len() - 1] + size);
    }

    let extent = bd[bd.len() - 1];
    let mut ctb_to_bd = Vec::with_capacity(extent as usize + 1);
    let mut ctb_to_idx = Vec::with_capacity(extent as usize + 1);
    let mut tile = 0;
    for ctb in 0..=extent {
        if tile + 1 < bd.len() && ctb == bd[tile + 1] {
            tile += 1;
        }
        ctb_to_bd.push(bd[tile]);
        ctb_to_idx.push(tile as u32);
    }

    (bd, ctb_to_bd, ctb_to_idx)
}

impl TileLayout {
    pub(crate) fn new(
        pic_width_in_ctbs_y: u32,
        pic_height_in_ctbs_y: u32,
        column_width_minus1: &[u32],
        row_height_minus1: &[u32],
    ) -> Result<Self> {
        let col_width_val = tile_sizes("pps_tile_column_width_minus1", pic_width_in_ctbs_y, column_width_minus1)?;
        let row_height_val = tile_sizes("pps_tile_row_height_minus1", pic_height_in_ctbs_y, row_height_minus1)?;
        let (tile_col_bd_val, ctb_to_tile_col_bd, ctb_to_tile_col_idx) = boundaries(&col_width_val);
        let (tile_row_bd_val, ctb_to_tile_row_bd, ctb_to_tile_row_idx) = boundaries(&row_height_val);

        Ok(Self {
            col_width_val,
            row_height_val,
            tile_col_bd_val,
            tile_row_bd_val,
            ctb_to_tile_col_bd,
            ctb_to_tile_col_idx,
            ctb_to_tile_row_bd,
            ctb_to_tile_row_idx,
            pic_width_in_ctbs_y,
        })
    }

    /// A single tile covering the picture.
    pub(crate) fn single(pic_width_in_ctbs_y: u32, pic_height_in_ctbs_y: u32) -> Self {
        let (tile_col_bd_val, ctb_to_tile_col_bd, ctb_to_tile_col_idx) = boundaries(&[pic_width_in_ctbs_y]);
        let (tile_row_bd_val, ctb_to_tile_row_bd, ctb_to_tile_row_idx) = boundaries(&[pic_height_in_ctbs_y]);
        Self {
            col_width_val: vec![pic_width_in_ctbs_y],
            row_height_val: vec![pic_height_in_ctbs_y],
            tile_col_bd_val,
            tile_row_bd_val,
            ctb_to_tile_col_bd,
            ctb_to_tile_col_idx,
            ctb_to_tile_row_bd,
            ctb_to_tile_row_idx,
            pic_width_in_ctbs_y,
        }
    }

    /// `ColWidthVal`.
    pub fn col_width_val(&self) -> &[u32] {
        &self.col_width_val
    }

    /// `RowHeightVal`.
    pub fn row_height_val(&self) -> &[u32] {
        &self.row_height_val
    }

    /// `TileColBdVal`, with `NumTileColumns + 1` entries.
    pub fn tile_col_bd_val(&self) -> &[u32] {
        &self.tile_col_bd_val
    }

    /// `TileRowBdVal`, with `NumTileRows + 1` entries.
    pub fn tile_row_bd_val(&self) -> &[u32] {
        &self.tile_row_bd_val
    }

    /// `CtbToTileColBd[ctbAddrX]`.
    pub fn ctb_to_tile_col_bd(&self, ctb_addr_x: u32) -> u32 {
        self.ctb_to_tile_col_bd[ctb_addr_x as usize]
    }

    /// `ctbToTileColIdx[ctbAddrX]`.
    pub fn ctb_to_tile_col_idx(&self, ctb_addr_x: u32) -> u32 {
        self.ctb_to_tile_col_idx[ctb_addr_x as usize]
    }

    /// `CtbToTileRowBd[ctbAddrY]`.
    pub fn ctb_to_tile_row_bd(&self, ctb_addr_y: u32) -> u32 {
        self.ctb_to_tile_row_bd[ctb_addr_y as usize]
    }

    /// `ctbToTileRowIdx[ctbAddrY]`.
    pub fn ctb_to_tile_row_idx(&self, ctb_addr_y: u32) -> u32 {
        self.ctb_to_tile_row_idx[ctb_addr_y as usize]
    }

    pub fn num_tile_columns(&self) -> u32 {
        self.col_width_val.len() as u32
    }

    pub fn num_tile_rows(&self) -> u32 {
        self.row_height_val.len() as u32
    }

    /// `NumTilesInPic`.
    pub fn num_tiles_in_pic(&self) -> u32 {
        self.num_tile_columns() * self.num_tile_rows()
    }

    fn push_ctbs(&self, out: &mut Vec<u32>, start_x: u32, stop_x: u32, start_y: u32, stop_y: u32) {
        for ctb_y in start_y..stop_y {
            for ctb_x in start_x..stop_x {
                out.push(ctb_y * self.pic_width_in_ctbs_y + ctb_x);
            }
        }
    }

    fn push_tile(&self, out: &mut Vec<u32>, tile_x: u32, tile_y: u32) {
        self.push_ctbs(
            out,
            self.tile_col_bd_val[tile_x as usize],
            self.tile_col_bd_val[tile_x as usize + 1],
            self.tile_row_bd_val[tile_y as usize],
            self.tile_row_bd_val[tile_y as usize + 1],
        );
    }

    /// The CTB addresses of `num_tiles` consecutive tiles in tile raster order, as used by raster
    /// scan slices.
    pub fn ctb_addrs_in_tiles(&self, first_tile: u32, num_tiles: u32) -> Vec<u32> {
        let mut addrs = Vec::new();
        for tile_idx in first_tile..first_tile + num_tiles {
            self.push_tile(
                &mut addrs,
                tile_idx % self.num_tile_columns(),
                tile_idx / self.num_tile_columns(),
            );
        }
        addrs
    }

    /// `NumEntryPoints` of a slice containing `ctb_addrs`. (7-140)
    pub fn num_entry_points(&self, ctb_addrs: &[u32], entropy_coding_sync_enabled: bool) -> u32 {
        let w = self.pic_width_in_ctbs_y;
        ctb_addrs
            .windows(2)
            .filter(|pair| {
                let (prev_x, prev_y) = (pair[0] % w, pair[0] / w);
                let (x, y) = (pair[1] % w, pair[1] / w);
                self.ctb_to_tile_row_bd(y) != self.ctb_to_tile_row_bd(prev_y)
                    || self.ctb_to_tile_col_bd(x) != self.ctb_to_tile_col_bd(prev_x)
                    || (y != prev_y && entropy_coding_sync_enabled)
            })
            .count() as u32
    }

    /// `SubpicWidthInTiles`, `SubpicHeightInTiles` and `subpicHeightLessThanOneTileFlag`. (6-20)
    pub fn subpic_tiles(&self, subpic: &SubpicLayout) -> Result<(u32, u32, bool)> {
        let width = self.pic_width_in_ctbs_y;
        let height = self.tile_row_bd_val[self.tile_row_bd_val.len() - 1];
        let left = subpic.sps_subpic_ctu_top_left_x;
        let top = subpic.sps_subpic_ctu_top_left_y;
        range_check!("sps_subpic_ctu_top_left_x", left, 0, width - 1)?;
        range_check!("sps_subpic_ctu_top_left_y", top, 0, height - 1)?;
        range_check!("sps_subpic_width_minus1", subpic.sps_subpic_width_minus1, 0, width - 1 - left)?;
        range_check!("sps_subpic_height_minus1", subpic.sps_subpic_height_minus1, 0, height - 1 - top)?;
        let right = left + subpic.sps_subpic_width_minus1;
        let bottom = top + subpic.sps_subpic_height_minus1;

        let width_in_tiles = self.ctb_to_tile_col_idx(right) + 1 - self.ctb_to_tile_col_idx(left);
        let top_row = self.ctb_to_tile_row_idx(top);
        let height_in_tiles = self.ctb_to_tile_row_idx(bottom) + 1 - top_row;
        let less_than_one_tile = height_in_tiles == 1
            && self
                .row_height_val
                .get(top_row as usize)
                .is_some_and(|&height| subpic.sps_subpic_height_minus1 + 1 < height);

        Ok((width_in_tiles, height_in_tiles, less_than_one_tile))
    }
}

/// The explicitly signalled rectangular slice layout of a PPS.
///
/// Every vector has one entry per slice. Entries that are not signalled hold their inferred value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitSliceLayout {
    pub pps_slice_width_in_tiles_minus1: Vec<u32>,
    pub pps_slice_height_in_tiles_minus1: Vec<u32>,
    pub pps_num_exp_slices_in_tile: Vec<u32>,
    pub pps_exp_slice_height_in_ctus_minus1: Vec<Vec<u32>>,
    pub pps_tile_idx_delta_val: Vec<i32>,
}

/// The CTBs of every rectangular slice of a picture and the slice to subpicture mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceMap {
    slice_top_left_tile_idx: Vec<u32>,
    ctb_addr_in_slice: Vec<Vec<u32>>,
    subpic_idx_for_slice: Vec<u32>,
    subpic_level_slice_idx: Vec<u32>,
    num_slices_in_subpic: Vec<u32>,
}

impl SliceMap {
    /// One slice per subpicture. (6-21)
    pub(crate) fn from_subpics(tiles: &TileLayout, subpic_info: &SubpicInfo) -> Result<Self> {
        let mut map = Self::default();
        for subpic in &subpic_info.subpics {
            let (width_in_tiles, height_in_tiles, less_than_one_tile) = tiles.subpic_tiles(subpic)?;
            let mut ctbs = Vec::new();
            let left = subpic.sps_subpic_ctu_top_left_x;
            let top = subpic.sps_subpic_ctu_top_left_y;
            let tile_x = tiles.ctb_to_tile_col_idx(left);
            let tile_y = tiles.ctb_to_tile_row_idx(top);

            if less_than_one_tile {
                tiles.push_ctbs(
                    &mut ctbs,
                    left,
                    left + subpic.sps_subpic_width_minus1 + 1,
                    top,
                    top + subpic.sps_subpic_height_minus1 + 1,
                );
            } else {
                for j in 0..height_in_tiles {
                    for k in 0..width_in_tiles {
                        tiles.push_tile(&mut ctbs, tile_x + k, tile_y + j);
                    }
                }
            }

            map.slice_top_left_tile_idx.push(tile_y * tiles.num_tile_columns() + tile_x);
            map.ctb_addr_in_slice.push(ctbs);
        }

        map.finish(tiles, subpic_info)?;
        Ok(map)
    }

    /// Reads the explicit slice layout of a PPS and derives the CTBs of every slice. (6-22)
    ///
    /// `SliceTopLeftTileIdx` is tracked while reading since the presence of the size elements
    /// depends on it.
    pub(crate) fn parse_explicit(
        reader: &mut RbspReader,
        tiles: &TileLayout,
        subpic_info: &SubpicInfo,
        num_slices_in_pic_minus1: u32,
        tile_idx_delta_present_flag: bool,
    ) -> Result<(ExplicitSliceLayout, Self)> {
        let n = num_slices_in_pic_minus1 as usize;
        let cols = tiles.num_tile_columns();
        let rows = tiles.num_tile_rows();
        let num_tiles = tiles.num_tiles_in_pic();

        let mut layout = ExplicitSliceLayout {
            pps_slice_width_in_tiles_minus1: vec![0; n + 1],
            pps_slice_height_in_tiles_minus1: vec![0; n + 1],
            pps_num_exp_slices_in_tile: vec![0; n + 1],
            pps_exp_slice_height_in_ctus_minus1: vec![Vec::new(); n + 1],
            pps_tile_idx_delta_val: vec![0; n + 1],
        };
        let mut map = Self {
            slice_top_left_tile_idx: vec![0; n + 1],
            ctb_addr_in_slice: vec![Vec::new(); n + 1],
            ..Default::default()
        };

        let mut tile_idx = 0u32;
        let mut i = 0;
        while i <= n {
            map.slice_top_left_tile_idx[i] = tile_idx;
            let tile_x = tile_idx % cols;
            let tile_y = tile_idx / cols;

            let (mut width_in_tiles, mut height_in_tiles) = if i < n {
                if tile_x != cols - 1 {
                    let width_minus1 = reader.read_uev("pps_slice_width_in_tiles_minus1")?;
                    range_check!("pps_slice_width_in_tiles_minus1", width_minus1, 0, cols - 1 - tile_x)?;
                    layout.pps_slice_width_in_tiles_minus1[i] = width_minus1 as u32;
                }

                layout.pps_slice_height_in_tiles_minus1[i] =
                    if tile_y != rows - 1 && (tile_idx_delta_present_flag || tile_x == 0) {
                        let height_minus1 = reader.read_uev("pps_slice_height_in_tiles_minus1")?;
                        range_check!("pps_slice_height_in_tiles_minus1", height_minus1, 0, rows - 1 - tile_y)?;
                        height_minus1 as u32
                    } else if tile_y == rows - 1 {
                        0
                    } else {
                        let inferred = i.checked_sub(1).map_or(0, |p| layout.pps_slice_height_in_tiles_minus1[p]);
                        range_check!("pps_slice_height_in_tiles_minus1", inferred, 0, rows - 1 - tile_y)?;
                        inferred
                    };

                (
                    layout.pps_slice_width_in_tiles_minus1[i] + 1,
                    layout.pps_slice_height_in_tiles_minus1[i] + 1,
                )
            } else {
                (cols - tile_x, rows - tile_y)
            };

            if width_in_tiles == 1 && height_in_tiles == 1 {
                let row_height = tiles.row_height_val[tile_y as usize];
                let mut heights = Vec::new();
                if i < n && row_height > 1 {
                    let num_exp = reader.read_uev("pps_num_exp_slices_in_tile")?;
                    range_check!("pps_num_exp_slices_in_tile", num_exp, 0, row_height - 1)?;
                    layout.pps_num_exp_slices_in_tile[i] = num_exp as u32;
                    for _ in 0..num_exp {
                        let height_minus1 = reader.read_uev("pps_exp_slice_height_in_ctus_minus1")?;
                        range_check!("pps_exp_slice_height_in_ctus_minus1", height_minus1, 0, row_height - 1)?;
                        layout.pps_exp_slice_height_in_ctus_minus1[i].push(height_minus1 as u32);
                    }
                    heights = tile_sizes(
                        "pps_exp_slice_height_in_ctus_minus1",
                        row_height,
                        &layout.pps_exp_slice_height_in_ctus_minus1[i],
                    )?;
                }
                if heights.is_empty() {
                    heights.push(row_height);
                }

                let num_slices_in_tile = heights.len();
                range_check!("NumSlicesInTile", num_slices_in_tile, 1, n + 1 - i)?;

                let col_start = tiles.tile_col_bd_val[tile_x as usize];
                let col_stop = tiles.tile_col_bd_val[tile_x as usize + 1];
                let mut ctb_y = tiles.tile_row_bd_val[tile_y as usize];
                for (j, height) in heights.into_iter().enumerate() {
                    map.slice_top_left_tile_idx[i + j] = tile_idx;
                    tiles.push_ctbs(&mut map.ctb_addr_in_slice[i + j], col_start, col_stop, ctb_y, ctb_y + height);
                    ctb_y += height;
                }

                i += num_slices_in_tile - 1;
                width_in_tiles = 1;
                height_in_tiles = 1;
            } else {
                for j in 0..height_in_tiles {
                    for k in 0..width_in_tiles {
                        tiles.push_tile(&mut map.ctb_addr_in_slice[i], tile_x + k, tile_y + j);
                    }
                }
            }

            if i < n {
                if tile_idx_delta_present_flag {
                    let delta = reader.read_sev("pps_tile_idx_delta_val")?;
                    range_check!("pps_tile_idx_delta_val", delta, -(num_tiles as i64 - 1), num_tiles - 1)?;
                    layout.pps_tile_idx_delta_val[i] = delta as i32;
                    let next = tile_idx as i64 + delta;
                    range_check!("SliceTopLeftTileIdx", next, 0, num_tiles - 1)?;
                    tile_idx = next as u32;
                } else {
                    tile_idx += width_in_tiles;
                    if tile_idx % cols == 0 {
                        tile_idx += (height_in_tiles - 1) * cols;
                    }
                    range_check!("SliceTopLeftTileIdx", tile_idx, 0, num_tiles - 1)?;
                }
            }

            i += 1;
        }

        map.finish(tiles, subpic_info)?;
        Ok((layout, map))
    }

    /// Checks that every CTB belongs to exactly one slice and derives the subpicture of every
    /// slice. (6-23)
    fn finish(&mut self, tiles: &TileLayout, subpic_info: &SubpicInfo) -> Result<()> {
        let w = tiles.pic_width_in_ctbs_y;
        let pic_size = (w * tiles.tile_row_bd_val[tiles.tile_row_bd_val.len() - 1]) as usize;
        let mut owners = vec![0u32; pic_size];
        for addr in self.ctb_addr_in_slice.iter().flatten() {
            match owners.get_mut(*addr as usize) {
                Some(count) => *count += 1,
                None => {
                    return Err(VvcError::RangeViolation {
                        field: "CtbAddrInSlice",
                        value: *addr as i64,
                        min: 0,
                        max: pic_size as i64 - 1,
                    });
                }
            }
        }
        if let Some((addr, count)) = owners.iter().enumerate().find(|(_, c)| **c != 1) {
            tracing::debug!(ctb_addr = addr, "CTB is not covered by exactly one slice");
            return Err(VvcError::RangeViolation {
                field: "CtbAddrInSlice",
                value: *count as i64,
                min: 1,
                max: 1,
            });
        }

        let num_slices = self.ctb_addr_in_slice.len();
        self.subpic_idx_for_slice = vec![0; num_slices];
        self.subpic_level_slice_idx = vec![0; num_slices];
        self.num_slices_in_subpic = vec![0; subpic_info.subpics.len()];
        for (i, subpic) in subpic_info.subpics.iter().enumerate() {
            let left = subpic.sps_subpic_ctu_top_left_x;
            let top = subpic.sps_subpic_ctu_top_left_y;
            let right = left + subpic.sps_subpic_width_minus1 + 1;
            let bottom = top + subpic.sps_subpic_height_minus1 + 1;
            for (j, ctbs) in self.ctb_addr_in_slice.iter().enumerate() {
                let Some(first) = ctbs.first() else {
                    continue;
                };
                let (x, y) = (first % w, first / w);
                if (left..right).contains(&x) && (top..bottom).contains(&y) {
                    self.subpic_idx_for_slice[j] = i as u32;
                    self.subpic_level_slice_idx[j] = self.num_slices_in_subpic[i];
                    self.num_slices_in_subpic[i] += 1;
                }
            }
        }

        Ok(())
    }

    /// `NumSlicesInPic`.
    pub fn num_slices(&self) -> usize {
        self.ctb_addr_in_slice.len()
    }

    /// `CtbAddrInSlice[i]`.
    pub fn ctb_addr_in_slice(&self, i: usize) -> Option<&[u32]> {
        self.ctb_addr_in_slice.get(i).map(Vec::as_slice)
    }

    /// `NumCtusInSlice[i]`.
    pub fn num_ctus_in_slice(&self, i: usize) -> usize {
        self.ctb_addr_in_slice.get(i).map_or(0, Vec::len)
    }

    /// `SliceTopLeftTileIdx[i]`.
    pub fn slice_top_left_tile_idx(&self, i: usize) -> Option<u32> {
        self.slice_top_left_tile_idx.get(i).copied()
    }

    /// `NumSlicesInSubpic[i]`.
    pub fn num_slices_in_subpic(&self, i: usize) -> u32 {
        self.num_slices_in_subpic.get(i).copied().unwrap_or(0)
    }

    /// `SubpicIdxForSlice[i]`.
    pub fn subpic_idx_for_slice(&self, i: usize) -> Option<u32> {
        self.subpic_idx_for_slice.get(i).copied()
    }

    /// `SubpicLevelSliceIdx[i]`.
    pub fn subpic_level_slice_idx(&self, i: usize) -> Option<u32> {
        self.subpic_level_slice_idx.get(i).copied()
    }

    /// The picture level slice index of slice `sh_slice_address` in subpicture `subpic_idx`.
    pub fn pic_level_slice_idx(&self, subpic_idx: u32, sh_slice_address: u32) -> Option<usize> {
        (0..self.num_slices()).find(|&j| {
            self.subpic_idx_for_slice[j] == subpic_idx && self.subpic_level_slice_idx[j] == sh_slice_address
        })
    }
}
