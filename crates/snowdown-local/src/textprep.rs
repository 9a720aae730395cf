//! Small, deterministic text normalization helpers shared by the locator and
//! the cleaner.

/// Collapse every whitespace run to a single space and trim both ends.
pub fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&#39;", '\''),
    ("&#039;", '\''),
    ("&apos;", '\''),
    ("&quot;", '"'),
    ("&lt;", '<'),
    ("&gt;", '>'),
];

/// Decode the handful of entities that show up in entity-encoded schedule text.
///
/// Single pass, so `&amp;lt;` decodes to `&lt;` and not to `<`.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(ent, _)| tail.starts_with(ent)) {
            Some((ent, ch)) => {
                out.push(*ch);
                rest = &tail[ent.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Case-folded needle, comparable against [`FoldedText`].
pub fn fold(s: &str) -> String {
    s.to_uppercase()
}

/// Uppercased view of a text that remembers where each byte came from.
///
/// Uppercasing can change byte lengths (`ß` becomes `SS`), so offsets found in
/// the folded string are mapped back through `origin` before slicing the
/// original text.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    /// `origin[i]` is the original byte offset for folded byte `i`; one extra
    /// trailing entry maps the end of the folded text to the end of the original.
    origin: Vec<usize>,
}

impl FoldedText {
    pub fn new(original: &str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len() + 1);
        for (i, ch) in original.char_indices() {
            for up in ch.to_uppercase() {
                let before = folded.len();
                folded.push(up);
                origin.extend(std::iter::repeat(i).take(folded.len() - before));
            }
        }
        origin.push(original.len());
        Self { folded, origin }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Map a folded byte offset back to the original text.
    pub fn to_original(&self, folded_offset: usize) -> usize {
        self.origin[folded_offset.min(self.folded.len())]
    }

    fn ceil_boundary(&self, mut at: usize) -> usize {
        while at < self.folded.len() && !self.folded.is_char_boundary(at) {
            at += 1;
        }
        at.min(self.folded.len())
    }

    /// First occurrence of an already-folded `needle` at or after `from`.
    pub fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        let from = self.ceil_boundary(from);
        self.folded[from..].find(needle).map(|i| i + from)
    }

    /// Byte offset reached by stepping `n` characters forward from `from`.
    pub fn advance_chars(&self, from: usize, n: usize) -> usize {
        let from = self.ceil_boundary(from);
        self.folded[from..]
            .char_indices()
            .nth(n)
            .map(|(i, _)| from + i)
            .unwrap_or(self.folded.len())
    }

    /// Number of characters in `[a, b)`.
    pub fn char_distance(&self, a: usize, b: usize) -> usize {
        if b <= a {
            return 0;
        }
        let a = self.ceil_boundary(a);
        let b = self.ceil_boundary(b);
        self.folded[a..b].chars().count()
    }
}
