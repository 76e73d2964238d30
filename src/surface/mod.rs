use crate::config::SurfaceRegion;
use crate::heightmap::HeightMap;

/// Pick the region a height sample falls into: the first entry whose
/// threshold the sample meets or exceeds. Requires the table sorted
/// descending by threshold, which config validation enforces. A sample
/// below every threshold is unclassified.
pub fn classify(regions: &[SurfaceRegion], height: f32) -> Option<&SurfaceRegion> {
    regions.iter().find(|region| height >= region.height)
}

/// The most frequent classification across a chunk's samples, driving the
/// single material/physical layer assigned to the whole chunk. Ties break
/// toward the region first encountered in row-major scan order.
pub fn dominant_region<'a>(
    regions: &'a [SurfaceRegion],
    heights: &HeightMap,
) -> Option<&'a SurfaceRegion> {
    // (region index, count) in first-encountered order.
    let mut tallies: Vec<(usize, usize)> = Vec::new();
    for sample in &heights.samples {
        let Some(index) = regions.iter().position(|region| *sample >= region.height) else {
            continue;
        };
        match tallies.iter_mut().find(|(tallied, _)| *tallied == index) {
            Some((_, count)) => *count += 1,
            None => tallies.push((index, 1)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (index, count) in tallies {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((index, count));
        }
    }
    best.map(|(index, _)| &regions[index])
}
