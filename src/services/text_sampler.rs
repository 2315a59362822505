//! Bounded, non-overlapping sampling of long reference texts.
//!
//! Lengths and positions are counted in `char`s, never bytes, so a window can
//! not split a multi-byte character. Windows are concatenated in the order
//! they were drawn, with no separator between them.

use std::ops::Range;

use rand::Rng;

pub const MIN_SAMPLE_LENGTH: usize = 500;
pub const MAX_SAMPLE_LENGTH: usize = 50_000;
pub const LARGE_SECTION_SIZE: usize = 1000;
pub const SMALL_SECTION_SIZE: usize = 500;
pub const LARGE_SECTION_THRESHOLD: usize = 3000;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerSettings {
    pub min_length: usize,
    pub max_length: usize,
    pub large_section_size: usize,
    pub small_section_size: usize,
    /// Targets at or above this length use `large_section_size` windows.
    pub large_section_threshold: usize,
    pub max_placement_attempts: usize,
    /// Required distance, in chars, between any two randomly placed windows.
    pub min_gap: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            min_length: MIN_SAMPLE_LENGTH,
            max_length: MAX_SAMPLE_LENGTH,
            large_section_size: LARGE_SECTION_SIZE,
            small_section_size: SMALL_SECTION_SIZE,
            large_section_threshold: LARGE_SECTION_THRESHOLD,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            min_gap: 0,
        }
    }
}

/// Result of one sampling call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledContent {
    pub text: String,
    /// Char ranges of the extract in draw order. Empty for the identity case.
    pub windows: Vec<Range<usize>>,
    /// True when random placement gave up and the deterministic fill ran.
    pub used_fallback: bool,
}

impl SampledContent {
    fn identity(extract: &str) -> Self {
        Self {
            text: extract.to_string(),
            windows: Vec::new(),
            used_fallback: false,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextSampler {
    settings: SamplerSettings,
}

impl TextSampler {
    pub fn new(settings: SamplerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn clamp_length(&self, requested_length: usize) -> usize {
        requested_length.clamp(self.settings.min_length, self.settings.max_length)
    }

    fn section_size(&self, target: usize) -> usize {
        if target >= self.settings.large_section_threshold {
            self.settings.large_section_size
        } else {
            self.settings.small_section_size
        }
    }

    /// Samples `extract` down to roughly `requested_length` chars.
    ///
    /// The random source is an explicit argument so concurrent requests never
    /// share generator state.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        extract: &str,
        requested_length: usize,
        rng: &mut R,
    ) -> SampledContent {
        let target = self.clamp_length(requested_length);
        let chars: Vec<char> = extract.chars().collect();
        let len = chars.len();

        if target >= len {
            return SampledContent::identity(extract);
        }

        let section_size = self.section_size(target).max(1);
        let mut used: Vec<Range<usize>> = Vec::new();
        let mut windows: Vec<Range<usize>> = Vec::new();
        let mut total = 0;
        let mut used_fallback = false;

        while total < target {
            let wanted = section_size.min(target - total);

            match self.place_window(&used, len, wanted, rng) {
                Some(window) => {
                    total += window.len();
                    insert_sorted(&mut used, window.clone());
                    windows.push(window);
                }
                None => {
                    log::debug!(
                        "No free window of {} chars after {} attempts, using deterministic fill",
                        wanted,
                        self.settings.max_placement_attempts
                    );
                    used_fallback = true;
                    windows.extend(fallback_fill(&used, len, target - total));
                    break;
                }
            }
        }

        let text = windows
            .iter()
            .flat_map(|window| chars[window.clone()].iter())
            .collect();

        SampledContent {
            text,
            windows,
            used_fallback,
        }
    }

    fn place_window<R: Rng + ?Sized>(
        &self,
        used: &[Range<usize>],
        len: usize,
        wanted: usize,
        rng: &mut R,
    ) -> Option<Range<usize>> {
        if wanted == 0 || wanted > len {
            return None;
        }

        let max_start = len - wanted;
        for _ in 0..self.settings.max_placement_attempts {
            let start = rng.gen_range(0..=max_start);
            let candidate = start..start + wanted;
            if !used
                .iter()
                .any(|taken| intersects(taken, &candidate, self.settings.min_gap))
            {
                return Some(candidate);
            }
        }

        None
    }
}

/// Samples with the calling thread's generator.
pub fn sample(extract: &str, requested_length: usize) -> String {
    TextSampler::default()
        .sample(extract, requested_length, &mut rand::thread_rng())
        .text
}

fn intersects(a: &Range<usize>, b: &Range<usize>, gap: usize) -> bool {
    a.start < b.end.saturating_add(gap) && b.start < a.end.saturating_add(gap)
}

fn insert_sorted(used: &mut Vec<Range<usize>>, window: Range<usize>) {
    let at = used.partition_point(|r| r.start < window.start);
    used.insert(at, window);
}

/// Free runs of `0..len` not covered by `used`, in ascending position.
fn free_gaps(used: &[Range<usize>], len: usize) -> Vec<Range<usize>> {
    let mut sorted = used.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut gaps = Vec::new();
    let mut cursor = 0;
    for taken in sorted {
        if taken.start > cursor {
            gaps.push(cursor..taken.start.min(len));
        }
        cursor = cursor.max(taken.end);
    }
    if cursor < len {
        gaps.push(cursor..len);
    }
    gaps
}

/// Deterministic fill over never-used text, largest gaps first.
///
/// Ties between equally sized gaps go to the earlier position. Each gap is
/// consumed from its start. The output depends only on `used`, `len` and
/// `needed`.
pub fn fallback_fill(used: &[Range<usize>], len: usize, needed: usize) -> Vec<Range<usize>> {
    let mut gaps = free_gaps(used, len);
    gaps.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

    let mut remaining = needed;
    let mut filled = Vec::new();
    for gap in gaps {
        if remaining == 0 {
            break;
        }
        let take = gap.len().min(remaining);
        if take == 0 {
            continue;
        }
        filled.push(gap.start..gap.start + take);
        remaining -= take;
    }
    filled
}
