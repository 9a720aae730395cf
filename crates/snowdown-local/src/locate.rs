//! Title/boundary heuristic over flattened schedule text.
//!
//! A description is the text between an event title and the closest plausible
//! boundary after it: another known title, a sentinel phrase that opens the
//! record's administrative trailer, or an inclusive terminator phrase.
//! All matching is case-insensitive.

use crate::textprep::{self, FoldedText};
use serde::Serialize;
use snowdown_core::LocatorConfig;

/// Byte range `[start, end)` into the original flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// The event's location appears shortly after this title occurrence.
    pub near_location: bool,
}

impl Segment {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[derive(Debug, Clone)]
pub struct Locator {
    cfg: LocatorConfig,
    titles: Vec<String>,
    sentinels: Vec<String>,
    terminators: Vec<String>,
}

impl Locator {
    /// `known_titles` are every event title in the catalog; the target title
    /// is skipped automatically when looking for the next one.
    pub fn new<I, S>(cfg: LocatorConfig, known_titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fold_all = |v: &[String]| {
            v.iter()
                .map(|s| textprep::fold(s.trim()))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        };
        let mut titles: Vec<String> = known_titles
            .into_iter()
            .map(|t| textprep::fold(t.as_ref().trim()))
            .filter(|t| !t.is_empty())
            .collect();
        titles.sort();
        titles.dedup();
        let sentinels = fold_all(cfg.sentinels.as_slice());
        let terminators = fold_all(cfg.terminators.as_slice());
        Self {
            cfg,
            titles,
            sentinels,
            terminators,
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.cfg
    }

    /// Convenience wrapper that folds `text` on every call.
    pub fn locate(&self, text: &str, title: &str, location: &str) -> Vec<Segment> {
        self.locate_in(&FoldedText::new(text), title, location)
    }

    /// Candidate segments for `title`, in document order.
    ///
    /// Every occurrence of the title is tried until one whose location signal
    /// is positive has been consumed; occurrences without an end boundary
    /// contribute nothing.
    pub fn locate_in(&self, ft: &FoldedText, title: &str, location: &str) -> Vec<Segment> {
        let needle = textprep::fold(title.trim());
        if needle.is_empty() {
            return Vec::new();
        }
        let loc = textprep::fold(&textprep::norm_ws(location));

        let mut out = Vec::new();
        let mut from = 0usize;
        while let Some(idx) = ft.find_from(&needle, from) {
            let start = idx + needle.len();
            let near = !loc.is_empty()
                && ft
                    .find_from(&loc, idx)
                    .is_some_and(|l| ft.char_distance(idx, l) < self.cfg.location_window);

            if let Some(end) = self.end_boundary(ft, start, &needle) {
                let seg = Segment {
                    start: ft.to_original(start),
                    end: ft.to_original(end),
                    near_location: near,
                };
                if seg.end > seg.start {
                    out.push(seg);
                }
            }
            if near {
                break;
            }
            from = start;
        }
        out
    }

    /// The near-location candidate if there is one, else the first candidate.
    pub fn best(&self, ft: &FoldedText, title: &str, location: &str) -> Option<Segment> {
        let segs = self.locate_in(ft, title, location);
        segs.iter()
            .find(|s| s.near_location)
            .or_else(|| segs.first())
            .copied()
    }

    /// Smallest valid end offset (folded) for a description starting at `start`.
    fn end_boundary(&self, ft: &FoldedText, start: usize, own_title: &str) -> Option<usize> {
        let mut candidates: Vec<usize> = Vec::new();

        let scan_from = ft.advance_chars(start, self.cfg.title_skip);
        for other in self.titles.iter().filter(|t| t.as_str() != own_title) {
            // A mention too close to the start may be prose; keep looking past it.
            let mut from = scan_from;
            while let Some(pos) = ft.find_from(other, from) {
                let d = ft.char_distance(start, pos);
                if d > self.cfg.max_title_distance {
                    break;
                }
                if d >= self.cfg.min_segment_len {
                    candidates.push(pos);
                    break;
                }
                from = pos + other.len();
            }
        }

        for s in &self.sentinels {
            if let Some(pos) = ft.find_from(s, start) {
                candidates.push(pos);
            }
        }

        for t in &self.terminators {
            if let Some(pos) = ft.find_from(t, start) {
                let mut end = pos + t.len();
                if matches!(ft.as_str()[end..].chars().next(), Some('!' | '.')) {
                    end += 1;
                }
                candidates.push(end);
            }
        }

        candidates.into_iter().filter(|&e| e > start).min()
    }
}
