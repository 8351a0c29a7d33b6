//! Streaming literal replacement. Markers split across chunk boundaries are still found.

use super::context::Chunk;
use super::stage::Transform;

/// Marker the stage looks for by default: the SVG namespace declaration on the root.
pub const SVG_NAMESPACE_MARKER: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

/// Default replacement: same declaration, plus no fill so strokes stay outlines.
pub const SVG_NAMESPACE_NO_FILL: &str = r#"xmlns="http://www.w3.org/2000/svg" fill="none""#;

/// Marker and replacement pair. Build stages from it with [`Substitute::from_rule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub marker: String,
    pub replacement: String,
}

impl Default for SubstitutionRule {
    fn default() -> Self {
        Self {
            marker: SVG_NAMESPACE_MARKER.to_string(),
            replacement: SVG_NAMESPACE_NO_FILL.to_string(),
        }
    }
}

/// Replaces every occurrence of `marker` with `replacement`. No match is a no-op.
pub struct Substitute {
    marker: Vec<u8>,
    replacement: Vec<u8>,
    /// Tail of the previous chunk that might be the start of a marker.
    carry: Vec<u8>,
}

impl Substitute {
    pub fn new(marker: &str, replacement: &str) -> anyhow::Result<Self> {
        if marker.is_empty() {
            anyhow::bail!("substitution marker must not be empty");
        }
        Ok(Self {
            marker: marker.as_bytes().to_vec(),
            replacement: replacement.as_bytes().to_vec(),
            carry: Vec::new(),
        })
    }

    pub fn from_rule(rule: &SubstitutionRule) -> anyhow::Result<Self> {
        Self::new(&rule.marker, &rule.replacement)
    }

    fn find(&self, haystack: &[u8]) -> Option<usize> {
        haystack
            .windows(self.marker.len())
            .position(|w| w == self.marker.as_slice())
    }
}

impl Transform for Substitute {
    fn name(&self) -> &str {
        "substitute"
    }

    fn transform(&mut self, chunk: Chunk) -> Result<Vec<Chunk>, String> {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(&chunk);

        let mut out = Vec::with_capacity(buf.len());
        let mut pos = 0;
        while let Some(found) = self.find(&buf[pos..]) {
            out.extend_from_slice(&buf[pos..pos + found]);
            out.extend_from_slice(&self.replacement);
            pos += found + self.marker.len();
        }
        // Hold back anything that could still grow into a marker with the next chunk.
        let keep_from = pos.max(buf.len().saturating_sub(self.marker.len() - 1));
        out.extend_from_slice(&buf[pos..keep_from]);
        self.carry = buf[keep_from..].to_vec();
        Ok(vec![out])
    }

    fn finish(&mut self) -> Result<Vec<Chunk>, String> {
        Ok(vec![std::mem::take(&mut self.carry)])
    }
}
