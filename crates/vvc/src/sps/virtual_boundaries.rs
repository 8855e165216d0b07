use crate::error::Result;
use crate::reader::RbspReader;

/// Vertical and horizontal virtual boundaries, signalled in the SPS or the picture header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualBoundaries {
    pub virtual_boundary_pos_x_minus1: Vec<u32>,
    pub virtual_boundary_pos_y_minus1: Vec<u32>,
}

pub(crate) const SPS_NAMES: [&str; 4] = [
    "sps_num_ver_virtual_boundaries",
    "sps_virtual_boundary_pos_x_minus1",
    "sps_num_hor_virtual_boundaries",
    "sps_virtual_boundary_pos_y_minus1",
];

pub(crate) const PH_NAMES: [&str; 4] = [
    "ph_num_ver_virtual_boundaries",
    "ph_virtual_boundary_pos_x_minus1",
    "ph_num_hor_virtual_boundaries",
    "ph_virtual_boundary_pos_y_minus1",
];

impl VirtualBoundaries {
    pub(crate) fn parse(reader: &mut RbspReader, names: [&'static str; 4], width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            virtual_boundary_pos_x_minus1: read_positions(reader, names[0], names[1], width)?,
            virtual_boundary_pos_y_minus1: read_positions(reader, names[2], names[3], height)?,
        })
    }

    /// `VirtualBoundaryPosX[i]` in luma samples.
    pub fn pos_x(&self) -> impl Iterator<Item = u32> + '_ {
        self.virtual_boundary_pos_x_minus1.iter().map(|p| (p + 1) * 8)
    }

    /// `VirtualBoundaryPosY[i]` in luma samples.
    pub fn pos_y(&self) -> impl Iterator<Item = u32> + '_ {
        self.virtual_boundary_pos_y_minus1.iter().map(|p| (p + 1) * 8)
    }
}

fn read_positions(
    reader: &mut RbspReader,
    count_name: &'static str,
    pos_name: &'static str,
    extent: u32,
) -> Result<Vec<u32>> {
    let count = reader.read_uev(count_name)?;
    crate::range_check::check(count_name, count as i64, 0, if extent <= 8 { 0 } else { 3 })?;

    (0..count)
        .map(|_| {
            let pos = reader.read_uev(pos_name)?;
            crate::range_check::check(pos_name, pos as i64, 0, extent.div_ceil(8) as i64 - 2)?;
            Ok(pos as u32)
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::{PH_NAMES, VirtualBoundaries};
    use crate::reader::RbspReader;
    use crate::test_util::RbspBuilder;

    #[test]
    fn positions_in_luma_samples() {
        let data = RbspBuilder::new().ue(2).ue(15).ue(31).ue(1).ue(7).trailing();
        let boundaries = VirtualBoundaries::parse(&mut RbspReader::new(&data), PH_NAMES, 512, 256).unwrap();
        assert_eq!(boundaries.pos_x().collect::<Vec<_>>(), [128, 256]);
        assert_eq!(boundaries.pos_y().collect::<Vec<_>>(), [64]);
    }

    #[test]
    fn too_many_boundaries() {
        let data = RbspBuilder::new().ue(4).trailing();
        let err = VirtualBoundaries::parse(&mut RbspReader::new(&data), PH_NAMES, 512, 256).unwrap_err();
        assert_eq!(err.to_string(), "ph_num_ver_virtual_boundaries is out of range [0, 3]: 4");
    }
}
