//! Trailing-noise normalization.
//!
//! Upstream formatters sometimes emit the symbol and its punctuation as
//! separate tokens, so a period or RLM can end up next to a fragment that was
//! produced by an earlier pass (or by a previous run) rather than next to the
//! original variant. This pass strips such noise from the text directly after
//! every fragment and repeats until a pass changes nothing.
//!
//! Noise is one or more repetitions of optional whitespace (or `&nbsp;`)
//! followed by a period or an RLM in any of its spellings:
//!
//! ```text
//! <frag>. 100          -> <frag> 100
//! <frag> .\u{200F}     -> <frag>
//! <frag>  5            -> <frag>  5     (whitespace alone is not noise)
//! ```

use super::substitute::Segment;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NormalizeStats {
    pub passes: usize,
    pub trimmed: usize,
}

/// Run the noise pass over `segments` to a fixpoint.
pub(crate) fn normalize(segments: &mut Vec<Segment>) -> NormalizeStats {
    let mut stats = NormalizeStats::default();

    loop {
        coalesce_text(segments);
        stats.passes += 1;

        let mut changed = false;
        for idx in 1..segments.len() {
            if !matches!(segments[idx - 1], Segment::Fragment { .. }) {
                continue;
            }
            if let Segment::Text(text) = &mut segments[idx] {
                let cut = leading_noise_len(text);
                if cut > 0 {
                    text.drain(..cut);
                    stats.trimmed += cut;
                    changed = true;
                }
            }
        }

        if !changed {
            return stats;
        }
    }
}

/// Byte length of the noise run at the start of `text`.
pub(crate) fn leading_noise_len(text: &str) -> usize {
    regex!(r"^(?:(?:\s|&nbsp;)*(?:\.|\x{200F}|&rlm;|&#[xX]200[fF];|&#8207;))+").find(text).map_or(0, |m| m.end())
}

/// Merge neighbouring text segments and drop empty ones, so a fragment is
/// always directly followed by all of the text that trails it.
fn coalesce_text(segments: &mut Vec<Segment>) {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments.drain(..) {
        if let Segment::Text(text) = &segment {
            if text.is_empty() {
                continue;
            }
            if let Some(Segment::Text(prev)) = merged.last_mut() {
                prev.push_str(text);
                continue;
            }
        }
        merged.push(segment);
    }
    *segments = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag() -> Segment {
        Segment::Fragment { currency: 0, repaired: false }
    }

    #[test]
    fn noise_run_lengths() {
        assert_eq!(leading_noise_len("."), 1);
        assert_eq!(leading_noise_len(" . ."), 4);
        assert_eq!(leading_noise_len("&nbsp;."), 7);
        assert_eq!(leading_noise_len(".\u{200F}"), 1 + '\u{200F}'.len_utf8());
        assert_eq!(leading_noise_len("&rlm; 100"), 5);
        assert_eq!(leading_noise_len(" 100"), 0);
        assert_eq!(leading_noise_len(""), 0);
    }

    #[test]
    fn strips_noise_split_across_text_segments() {
        let mut segments =
            vec![Segment::Text("100 ".into()), frag(), Segment::Text(".".into()), Segment::Text("\u{200F}".into())];
        let stats = normalize(&mut segments);

        assert_eq!(segments, vec![Segment::Text("100 ".into()), frag()]);
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.trimmed, 1 + '\u{200F}'.len_utf8());
    }

    #[test]
    fn keeps_plain_whitespace_and_markup() {
        let mut segments = vec![frag(), Segment::Text(" 5".into()), Segment::Markup("</b>".into())];
        let stats = normalize(&mut segments);

        assert_eq!(segments, vec![frag(), Segment::Text(" 5".into()), Segment::Markup("</b>".into())]);
        assert_eq!(stats.passes, 1);
    }
}
