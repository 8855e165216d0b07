use crate::error::Result;
use crate::reader::RbspReader;

/// Quadtree and multi-type tree limits of one partitioning tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeConstraints {
    pub log2_diff_min_qt_min_cb: u8,
    pub max_mtt_hierarchy_depth: u8,
    pub log2_diff_max_bt_min_qt: u8,
    pub log2_diff_max_tt_min_qt: u8,
}

/// Syntax element names of one tree, in bitstream order.
pub(crate) type TreeNames = [&'static str; 4];

impl TreeConstraints {
    /// Reads the four elements of one tree, checking them against the CTB and minimum CB sizes.
    pub(crate) fn parse(reader: &mut RbspReader, names: TreeNames, ctb_log2_size_y: u8, min_cb_log2_size_y: u8) -> Result<Self> {
        let max_qt = ctb_log2_size_y.min(6);

        let log2_diff_min_qt_min_cb = reader.read_uev(names[0])?;
        crate::range_check::check(names[0], log2_diff_min_qt_min_cb as i64, 0, (max_qt - min_cb_log2_size_y) as i64)?;
        let min_qt_log2_size = log2_diff_min_qt_min_cb as u8 + min_cb_log2_size_y;

        let max_mtt_hierarchy_depth = reader.read_uev(names[1])?;
        crate::range_check::check(
            names[1],
            max_mtt_hierarchy_depth as i64,
            0,
            2 * (ctb_log2_size_y - min_cb_log2_size_y) as i64,
        )?;

        let mut tree = Self {
            log2_diff_min_qt_min_cb: log2_diff_min_qt_min_cb as u8,
            max_mtt_hierarchy_depth: max_mtt_hierarchy_depth as u8,
            ..Default::default()
        };

        if tree.max_mtt_hierarchy_depth != 0 {
            let bt = reader.read_uev(names[2])?;
            crate::range_check::check(names[2], bt as i64, 0, ctb_log2_size_y as i64 - min_qt_log2_size as i64)?;
            let tt = reader.read_uev(names[3])?;
            crate::range_check::check(names[3], tt as i64, 0, max_qt as i64 - min_qt_log2_size as i64)?;
            tree.log2_diff_max_bt_min_qt = bt as u8;
            tree.log2_diff_max_tt_min_qt = tt as u8;
        }

        Ok(tree)
    }

    /// `MinQtLog2Size*` for this tree.
    pub const fn min_qt_log2_size(&self, min_cb_log2_size_y: u8) -> u8 {
        self.log2_diff_min_qt_min_cb + min_cb_log2_size_y
    }
}

/// The block partitioning limits signalled in the SPS and optionally overridden in the picture
/// header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionConstraints {
    pub intra_luma: TreeConstraints,
    /// Only signalled when the dual tree is enabled.
    pub intra_chroma: TreeConstraints,
    pub inter: TreeConstraints,
}

pub(crate) const SPS_INTRA_LUMA: TreeNames = [
    "sps_log2_diff_min_qt_min_cb_intra_slice_luma",
    "sps_max_mtt_hierarchy_depth_intra_slice_luma",
    "sps_log2_diff_max_bt_min_qt_intra_slice_luma",
    "sps_log2_diff_max_tt_min_qt_intra_slice_luma",
];
pub(crate) const SPS_INTRA_CHROMA: TreeNames = [
    "sps_log2_diff_min_qt_min_cb_intra_slice_chroma",
    "sps_max_mtt_hierarchy_depth_intra_slice_chroma",
    "sps_log2_diff_max_bt_min_qt_intra_slice_chroma",
    "sps_log2_diff_max_tt_min_qt_intra_slice_chroma",
];
pub(crate) const SPS_INTER: TreeNames = [
    "sps_log2_diff_min_qt_min_cb_inter_slice",
    "sps_max_mtt_hierarchy_depth_inter_slice",
    "sps_log2_diff_max_bt_min_qt_inter_slice",
    "sps_log2_diff_max_tt_min_qt_inter_slice",
];
pub(crate) const PH_INTRA_LUMA: TreeNames = [
    "ph_log2_diff_min_qt_min_cb_intra_slice_luma",
    "ph_max_mtt_hierarchy_depth_intra_slice_luma",
    "ph_log2_diff_max_bt_min_qt_intra_slice_luma",
    "ph_log2_diff_max_tt_min_qt_intra_slice_luma",
];
pub(crate) const PH_INTRA_CHROMA: TreeNames = [
    "ph_log2_diff_min_qt_min_cb_intra_slice_chroma",
    "ph_max_mtt_hierarchy_depth_intra_slice_chroma",
    "ph_log2_diff_max_bt_min_qt_intra_slice_chroma",
    "ph_log2_diff_max_tt_min_qt_intra_slice_chroma",
];
pub(crate) const PH_INTER: TreeNames = [
    "ph_log2_diff_min_qt_min_cb_inter_slice",
    "ph_max_mtt_hierarchy_depth_inter_slice",
    "ph_log2_diff_max_bt_min_qt_inter_slice",
    "ph_log2_diff_max_tt_min_qt_inter_slice",
];

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::{SPS_INTER, TreeConstraints};
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn bt_and_tt_only_with_mtt_depth() {
        let data = RbspBuilder::new().ue(1).ue(0).ue(1).ue(3).ue(2).ue(1).trailing();
        let mut reader = RbspReader::new(&data);

        let first = TreeConstraints::parse(&mut reader, SPS_INTER, 7, 2).unwrap();
        assert_eq!(first.max_mtt_hierarchy_depth, 0);
        assert_eq!(first.log2_diff_max_bt_min_qt, 0);
        assert_eq!(first.min_qt_log2_size(2), 3);

        let second = TreeConstraints::parse(&mut reader, SPS_INTER, 7, 2).unwrap();
        assert_eq!(second.max_mtt_hierarchy_depth, 3);
        assert_eq!(second.log2_diff_max_bt_min_qt, 2);
        assert_eq!(second.log2_diff_max_tt_min_qt, 1);
    }

    #[test]
    fn min_qt_limited_by_ctb_size() {
        let data = RbspBuilder::new().ue(3).trailing();
        let err = TreeConstraints::parse(&mut RbspReader::new(&data), SPS_INTER, 5, 3).unwrap_err();
        assert_eq!(err.to_string(), "sps_log2_diff_min_qt_min_cb_inter_slice is out of range [0, 2]: 3");
    }
}
