/*!
 * Translation of a single paragraph in place.
 */

use log::trace;

use crate::document::Paragraph;
use crate::errors::ProviderError;
use crate::providers::Provider;

use super::chunking::split_into_chunks;
use super::distribution::{DistributionMode, distribute_proportionally, with_original_padding};

/// What happened to a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphOutcome {
    /// Nothing to translate, runs untouched
    Blank,
    /// Runs rewritten using `requests` engine calls
    Translated { requests: usize },
}

/// Chunks, translates and redistributes one paragraph
///
/// Every translation for the paragraph is obtained before any run is
/// modified, so an engine failure leaves the paragraph exactly as it was.
#[derive(Debug)]
pub struct ParagraphTranslator<'a, P: Provider + ?Sized> {
    provider: &'a P,
    max_chunk_chars: usize,
    mode: DistributionMode,
}

impl<'a, P: Provider + ?Sized> ParagraphTranslator<'a, P> {
    pub fn new(provider: &'a P, max_chunk_chars: usize, mode: DistributionMode) -> Self {
        Self {
            provider,
            max_chunk_chars: max_chunk_chars.max(1),
            mode,
        }
    }

    /// Translate free text chunk by chunk, joining the results with spaces
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(String, usize), ProviderError> {
        let chunks = split_into_chunks(text, self.max_chunk_chars);
        let mut translated = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            trace!("Translating chunk: {:?}", chunk);
            translated.push(
                self.provider
                    .translate(chunk, source_language, target_language)
                    .await?,
            );
        }

        Ok((translated.join(" "), chunks.len()))
    }

    pub async fn translate(
        &self,
        paragraph: &mut Paragraph,
        source_language: &str,
        target_language: &str,
    ) -> Result<ParagraphOutcome, ProviderError> {
        if paragraph.is_blank() {
            return Ok(ParagraphOutcome::Blank);
        }

        let mut requests = 0;

        match self.mode {
            DistributionMode::Direct => {
                let mut replacements = Vec::new();
                for (index, run) in paragraph.runs.iter().enumerate() {
                    if run.text.trim().is_empty() {
                        continue;
                    }
                    let (translated, calls) = self
                        .translate_text(&run.text, source_language, target_language)
                        .await?;
                    requests += calls;
                    replacements.push((index, with_original_padding(&run.text, &translated)));
                }

                for (index, text) in replacements {
                    paragraph.runs[index].text = text;
                }
            }
            DistributionMode::Proportional => {
                let (translated, calls) = self
                    .translate_text(&paragraph.text(), source_language, target_language)
                    .await?;
                requests += calls;
                distribute_proportionally(&mut paragraph.runs, &translated);
            }
        }

        Ok(ParagraphOutcome::Translated { requests })
    }
}
