//! Translation of OCR output for non-English readers.
//!
//! The actual translation service is an external collaborator behind the
//! [`Translator`] trait. [`CachedTranslator`] adds the bounded LRU cache,
//! the English/blank passthrough, the medical glossary and fail-open
//! behaviour (a failed call returns the original text).

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use lru::LruCache;
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of cached translations.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Target languages offered to users: (code, display name).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("or", "Odia"),
    ("ml", "Malayalam"),
];

const SOURCE_LANGUAGE: &str = "en";

/// Fixed renderings for terms where machine translation is unreliable.
const MEDICAL_GLOSSARY: &[(&str, [(&str, &str); 4])] = &[
    (
        "prescription",
        [("hi", "नुस्खा"), ("bn", "প্রেসক্রিপশন"), ("or", "ପ୍ରେସକ୍ରିପସନ୍"), ("ml", "കുറിപ്പടി")],
    ),
    (
        "medicine",
        [("hi", "दवा"), ("bn", "ওষুধ"), ("or", "ଔଷଧ"), ("ml", "മരുന്ന്")],
    ),
    (
        "dosage",
        [("hi", "खुराक"), ("bn", "ডোজ"), ("or", "ମାତ୍ରା"), ("ml", "അളവ്")],
    ),
    (
        "doctor",
        [("hi", "डॉक्टर"), ("bn", "ডাক্তার"), ("or", "ଡାକ୍ତର"), ("ml", "ഡോക്ടർ")],
    ),
    (
        "hospital",
        [("hi", "अस्पताल"), ("bn", "হাসপাতাল"), ("or", "ଡାକ୍ତରଖାନା"), ("ml", "ആശുപത്രി")],
    ),
];

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Unsupported target language: {0}")]
    Unsupported(String),

    #[error("Translation backend failed: {0}")]
    Backend(String),
}

/// A translation service.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        (**self).translate(text, target_language)
    }
}

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Glossary rendering of `term` (case-insensitive) in `target_language`.
pub fn glossary_term(term: &str, target_language: &str) -> Option<&'static str> {
    let key = term.trim().to_lowercase();
    MEDICAL_GLOSSARY
        .iter()
        .find(|(t, _)| *t == key)
        .and_then(|(_, renderings)| {
            renderings
                .iter()
                .find(|(lang, _)| *lang == target_language)
                .map(|(_, text)| *text)
        })
}

/// Identity translator, used when no translation service is configured.
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, text: &str, _target_language: &str) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

/// LRU-cached, fail-open wrapper around a [`Translator`].
pub struct CachedTranslator<T: Translator> {
    backend: T,
    cache: Mutex<LruCache<(String, String), String>>,
}

impl<T: Translator> CachedTranslator<T> {
    pub fn new(backend: T) -> Self {
        Self::with_capacity(backend, DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn with_capacity(backend: T, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            backend,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Translate, surfacing backend and language errors.
    ///
    /// Blank text and English targets are returned unchanged without
    /// touching the backend or the cache.
    pub fn try_translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() || target_language == SOURCE_LANGUAGE {
            return Ok(text.to_string());
        }
        if !is_supported_language(target_language) {
            return Err(TranslationError::Unsupported(target_language.to_string()));
        }

        let key = (text.to_string(), target_language.to_string());
        if let Some(hit) = self.lock_cache().get(&key) {
            debug!(target_language, "Translation cache hit");
            return Ok(hit.clone());
        }

        // Lock is not held across the backend call.
        let translated = self.backend.translate(text, target_language)?;
        self.lock_cache().put(key, translated.clone());
        Ok(translated)
    }

    /// Translate, returning the original text on any failure.
    pub fn translate(&self, text: &str, target_language: &str) -> String {
        match self.try_translate(text, target_language) {
            Ok(translated) => translated,
            Err(e) => {
                warn!(target_language, error = %e, "Translation failed, keeping original text");
                text.to_string()
            }
        }
    }

    pub fn batch_translate<S: AsRef<str>>(&self, texts: &[S], target_language: &str) -> Vec<String> {
        texts
            .iter()
            .map(|t| self.translate(t.as_ref(), target_language))
            .collect()
    }

    /// Translate individual terms, preferring the medical glossary.
    /// Returns `(term, translation)` pairs in input order.
    pub fn translate_medical_terms<S: AsRef<str>>(
        &self,
        terms: &[S],
        target_language: &str,
    ) -> Vec<(String, String)> {
        terms
            .iter()
            .map(|term| {
                let term = term.as_ref();
                let translated = match glossary_term(term, target_language) {
                    Some(fixed) => fixed.to_string(),
                    None => self.translate(term, target_language),
                };
                (term.to_string(), translated)
            })
            .collect()
    }

    pub fn cached_entries(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, LruCache<(String, String), String>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
