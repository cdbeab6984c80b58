/*!
 * Writing translated text back into formatting runs.
 *
 * Two policies exist:
 * - `Direct`: every run is translated on its own and keeps its own text
 * - `Proportional`: the paragraph is translated as a whole and the result is
 *   sliced across the runs in proportion to their original lengths
 */

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::document::Run;

/// How translated text is mapped onto a paragraph's runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// Translate each run independently
    #[default]
    Direct,
    /// Translate the paragraph once, then slice by original run length
    Proportional,
}

impl std::fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proportional => write!(f, "proportional"),
        }
    }
}

impl std::str::FromStr for DistributionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "run" | "per-run" => Ok(Self::Direct),
            "proportional" | "paragraph" => Ok(Self::Proportional),
            _ => Err(anyhow!("Invalid distribution mode: {}", s)),
        }
    }
}

/// Character share of `translated_len` for every run
///
/// Each share is `round(translated_len * run_len / total_len)`. A shortfall
/// left by rounding goes to the earliest runs, an excess is taken back from
/// the last ones, so the shares always sum to `translated_len`. When the
/// original runs are all empty the text is split evenly.
pub fn proportional_lengths(run_lengths: &[usize], translated_len: usize) -> Vec<usize> {
    let count = run_lengths.len();
    if count == 0 {
        return Vec::new();
    }

    let original_total: usize = run_lengths.iter().sum();
    if original_total == 0 {
        let base = translated_len / count;
        let extra = translated_len % count;
        return (0..count)
            .map(|i| base + usize::from(i < extra))
            .collect();
    }

    let mut lengths: Vec<usize> = run_lengths
        .iter()
        .map(|&len| (2 * translated_len * len + original_total) / (2 * original_total))
        .collect();

    let mut assigned: usize = lengths.iter().sum();

    // Runs that had text come first when handing out the remainder
    let mut receivers: Vec<usize> = (0..count).filter(|&i| run_lengths[i] > 0).collect();
    receivers.extend((0..count).filter(|&i| run_lengths[i] == 0));

    'grow: while assigned < translated_len {
        for &i in &receivers {
            lengths[i] += 1;
            assigned += 1;
            if assigned == translated_len {
                break 'grow;
            }
        }
    }

    'shrink: while assigned > translated_len {
        for i in (0..count).rev() {
            if lengths[i] > 0 {
                lengths[i] -= 1;
                assigned -= 1;
                if assigned == translated_len {
                    break 'shrink;
                }
            }
        }
    }

    lengths
}

/// Slice `translated` into consecutive pieces sized by `proportional_lengths`
///
/// The concatenation of the returned pieces is exactly `translated`.
pub fn split_proportionally(translated: &str, run_lengths: &[usize]) -> Vec<String> {
    let lengths = proportional_lengths(run_lengths, translated.chars().count());

    let mut pieces = Vec::with_capacity(lengths.len());
    let mut rest = translated;
    for len in lengths {
        let end = rest
            .char_indices()
            .nth(len)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        pieces.push(rest[..end].to_string());
        rest = &rest[end..];
    }

    pieces
}

/// Overwrite run texts with proportional slices of `translated`
pub fn distribute_proportionally(runs: &mut [Run], translated: &str) {
    let run_lengths: Vec<usize> = runs.iter().map(|r| r.text.chars().count()).collect();
    let pieces = split_proportionally(translated, &run_lengths);

    for (run, piece) in runs.iter_mut().zip(pieces) {
        run.text = piece;
    }
}

/// Give a translated run the leading and trailing whitespace of its original
///
/// Engines trim their output; without this, `"Hello" + " world"` would come
/// back as `"Hola" + "mundo"`.
pub fn with_original_padding(original: &str, translated: &str) -> String {
    let core = original.trim();
    if core.is_empty() {
        return original.to_string();
    }

    let leading = &original[..original.len() - original.trim_start().len()];
    let trailing = &original[original.trim_end().len()..];
    format!("{}{}{}", leading, translated.trim(), trailing)
}
