//! Flat-buffer boundary for hosts passing jagged per-group lists
//!
//! The host hands over one flat coordinate buffer plus parallel
//! per-group count and start-offset arrays. Records are `stride`
//! integers wide; only the leading (x, y) pair is read here, trailing
//! fields belong to the host. Inside the engine the jagged lists become
//! owned [`SourceGroup`] / [`DestinationBuffers`] sequences; the
//! flattened form exists only at this boundary.

use glam::UVec2;

use crate::audibility::{DestinationBuffers, SourceGroup};
use crate::core::error::Error;
use crate::core::Result;

/// One jagged cell-list family in the host's flattened form.
#[derive(Clone, Copy, Debug)]
pub struct RawCellLists<'a> {
    /// Flat records, `stride` integers each, leading pair is (x, y).
    pub cells: &'a [u32],
    /// Records per group.
    pub counts: &'a [u32],
    /// Element offset of each group's first record in `cells`.
    pub starts: &'a [u32],
    /// Integers per record, at least 2.
    pub stride: usize,
}

/// Decode jagged per-group cell lists, validating every offset against
/// the coordinate buffer.
pub fn parse_cell_lists(raw: RawCellLists<'_>) -> Result<Vec<Vec<UVec2>>> {
    if raw.stride < 2 {
        return Err(Error::MalformedBuffers(format!(
            "record stride {} too small for a coordinate pair",
            raw.stride
        )));
    }
    if raw.counts.len() != raw.starts.len() {
        return Err(Error::MalformedBuffers(format!(
            "{} group counts but {} group offsets",
            raw.counts.len(),
            raw.starts.len()
        )));
    }
    let mut lists = Vec::with_capacity(raw.counts.len());
    for (group, (&count, &start)) in raw.counts.iter().zip(raw.starts).enumerate() {
        let mut list = Vec::with_capacity(count as usize);
        let mut idx = start as usize;
        for _ in 0..count {
            let pair = raw.cells.get(idx..idx + 2).ok_or_else(|| {
                Error::MalformedBuffers(format!("group {group} runs past the coordinate buffer"))
            })?;
            list.push(UVec2::new(pair[0], pair[1]));
            idx += raw.stride;
        }
        lists.push(list);
    }
    Ok(lists)
}

/// Assemble source groups from the host layout; group ids are
/// positional.
pub fn source_groups_from_raw(raw: RawCellLists<'_>) -> Result<Vec<SourceGroup>> {
    Ok(parse_cell_lists(raw)?
        .into_iter()
        .enumerate()
        .map(|(id, cells)| SourceGroup {
            id: id as u32,
            cells,
        })
        .collect())
}

/// Assemble per-group destination buffers from the interior and exterior
/// host layouts. Both must describe the same number of groups.
pub fn destination_buffers_from_raw(
    interior: RawCellLists<'_>,
    exterior: RawCellLists<'_>,
) -> Result<Vec<DestinationBuffers>> {
    let interior = parse_cell_lists(interior)?;
    let exterior = parse_cell_lists(exterior)?;
    if interior.len() != exterior.len() {
        return Err(Error::MalformedBuffers(format!(
            "{} interior buffer groups but {} exterior",
            interior.len(),
            exterior.len()
        )));
    }
    Ok(interior
        .into_iter()
        .zip(exterior)
        .map(|(interior, exterior)| DestinationBuffers { interior, exterior })
        .collect())
}
