use crate::application::ports::{TranslationError, Translator};
use crate::domain::{Segment, TranscriptionResult, Translation};

/// Translates the full text and then every segment in order.
pub async fn translate_result(
    translator: &dyn Translator,
    result: &TranscriptionResult,
    target_language: &str,
) -> Result<Translation, TranslationError> {
    let source_language = result.language.as_str();

    let text = translator
        .translate(&result.text, source_language, target_language)
        .await?;

    let mut segments = Vec::with_capacity(result.segments.len());
    for segment in &result.segments {
        let translated = translator
            .translate(&segment.text, source_language, target_language)
            .await?;
        segments.push(Segment {
            text: translated,
            words: Vec::new(),
            ..segment.clone()
        });
    }

    Ok(Translation {
        source_language: source_language.to_string(),
        target_language: target_language.to_string(),
        text,
        segments,
    })
}
