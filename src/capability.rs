// This is free and unencumbered software released into the public domain.

//! Pure query surface over what the selected camera can do. Rebuilt on every
//! bind generation: hardware may report different sizes after a mode or
//! position change.

use crate::types::PixelSize;
use std::collections::HashMap;

/// Fixed aspect-ratio bucket table. Sizes outside every bucket are dropped.
pub fn aspect_bucket(aspect: f32) -> Option<&'static str> {
    if aspect == 1.0 {
        Some("1:1")
    } else if (1.2..=1.222_222_2).contains(&aspect) {
        Some("6:5")
    } else if (1.3..=1.333_333_4).contains(&aspect) {
        Some("4:3")
    } else if (1.77..=1.777_777_8).contains(&aspect) {
        Some("16:9")
    } else if aspect == 1.5 {
        Some("3:2")
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct Capabilities {
    /// Bumped alongside the binder generation the cache was built for.
    generation: u64,
    ready: bool,
    camera_count: usize,
    has_flash: bool,
    sizes_by_ratio: HashMap<&'static str, Vec<PixelSize>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the cache from the sizes reported by the freshly bound camera.
    pub fn rebuild(
        &mut self,
        generation: u64,
        camera_count: usize,
        has_flash: bool,
        sizes: &[PixelSize],
    ) {
        self.generation = generation;
        self.ready = true;
        self.camera_count = camera_count;
        self.has_flash = has_flash;
        self.sizes_by_ratio.clear();

        for &size in sizes {
            if let Some(bucket) = aspect_bucket(size.aspect()) {
                self.sizes_by_ratio.entry(bucket).or_default().push(size);
            }
        }
        for list in self.sizes_by_ratio.values_mut() {
            list.sort_by(|a, b| b.area().cmp(&a.area()));
            list.dedup();
        }
    }

    /// Drop everything; queried values are stale once the pipeline unbinds.
    pub fn invalidate(&mut self) {
        self.ready = false;
        self.has_flash = false;
        self.sizes_by_ratio.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Defined to be 0 before the first ready event, not an error.
    pub fn camera_count(&self) -> usize {
        if self.ready { self.camera_count } else { 0 }
    }

    /// Flash availability of the currently selected camera.
    pub fn has_flash(&self) -> bool {
        self.ready && self.has_flash
    }

    /// Torch availability tracks the flash unit.
    pub fn has_torch(&self) -> bool {
        self.has_flash()
    }

    /// `"WxH"` strings for the given ratio bucket, largest area first.
    pub fn available_picture_sizes(&self, ratio: &str) -> Vec<String> {
        self.sizes_by_ratio
            .get(ratio)
            .map(|sizes| sizes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }

    /// Largest size cached for the ratio, used as the default picture size.
    pub fn largest_for_ratio(&self, ratio: &str) -> Option<PixelSize> {
        self.sizes_by_ratio.get(ratio).and_then(|v| v.first()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_match_fixed_table() {
        assert_eq!(aspect_bucket(1.0), Some("1:1"));
        assert_eq!(aspect_bucket(1.2), Some("6:5"));
        assert_eq!(aspect_bucket(4.0 / 3.0), Some("4:3"));
        assert_eq!(aspect_bucket(16.0 / 9.0), Some("16:9"));
        assert_eq!(aspect_bucket(1.5), Some("3:2"));
        assert_eq!(aspect_bucket(2.35), None);
        assert_eq!(aspect_bucket(1.25), None);
    }

    #[test]
    fn sizes_sorted_largest_first_and_filtered() {
        let mut caps = Capabilities::new();
        caps.rebuild(
            1,
            2,
            true,
            &[
                PixelSize::new(640, 480),
                PixelSize::new(4032, 3024),
                PixelSize::new(1280, 720),
                PixelSize::new(1920, 1080),
                PixelSize::new(2000, 851), // outside every bucket
            ],
        );

        assert_eq!(caps.available_picture_sizes("4:3"), vec!["4032x3024", "640x480"]);
        assert_eq!(caps.available_picture_sizes("16:9"), vec!["1920x1080", "1280x720"]);
        assert!(caps.available_picture_sizes("3:2").is_empty());
    }

    #[test]
    fn camera_count_is_zero_before_ready() {
        let mut caps = Capabilities::new();
        assert_eq!(caps.camera_count(), 0);
        caps.rebuild(1, 3, false, &[]);
        assert_eq!(caps.camera_count(), 3);
        caps.invalidate();
        assert_eq!(caps.camera_count(), 0);
    }
}
